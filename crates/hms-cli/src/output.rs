//! Terminal output for tables, rows and drift reports

use comfy_table::{Cell, ContentArrangement, Table};
use hms_core::{Row, Value};
use hms_services::{CatalogEntry, DriftReport, TableDefinition, TableSummary};
use serde_json::Value as JsonValue;

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .set_content_arrangement(ContentArrangement::Dynamic)
        .load_preset(comfy_table::presets::UTF8_FULL)
        .apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    table
}

pub fn format_tables(tables: &[TableSummary]) -> String {
    if tables.is_empty() {
        return "No tables defined.".to_string();
    }

    let mut table = new_table();
    table.set_header(["Name", "Identifier", "Columns", "Primary", "Description", "Created"]);
    for summary in tables {
        table.add_row([
            Cell::new(&summary.name),
            Cell::new(&summary.sanitized_name),
            Cell::new(summary.column_count),
            Cell::new(summary.primary_column.as_deref().unwrap_or("-")),
            Cell::new(&summary.description),
            Cell::new(summary.created_at.format("%Y-%m-%d %H:%M")),
        ]);
    }
    table.to_string()
}

pub fn format_definition(entry: &CatalogEntry) -> String {
    let mut table = new_table();
    table.set_header(["Column", "Identifier", "Type", "Default", "Primary"]);
    for column in &entry.definition.columns {
        table.add_row([
            Cell::new(&column.name),
            Cell::new(column.sanitized_name().unwrap_or_default()),
            Cell::new(column.column_type),
            Cell::new(column.default_value.as_deref().unwrap_or("")),
            Cell::new(if column.is_primary { "yes" } else { "" }),
        ]);
    }

    let mut out = format!("{} ({})\n", entry.definition.name, entry.sanitized_name);
    if !entry.definition.description.is_empty() {
        out.push_str(&entry.definition.description);
        out.push('\n');
    }
    out.push_str(&table.to_string());
    out
}

/// Rows as a table. Column headers come from the definition so that an
/// empty table still shows its shape.
pub fn format_rows(definition: &TableDefinition, rows: &[Row]) -> String {
    let mut headers = vec!["id".to_string()];
    headers.extend(definition.column_names());

    let mut table = new_table();
    table.set_header(headers.iter().map(Cell::new));
    for row in rows {
        table.add_row(headers.iter().map(|name| {
            Cell::new(match row.get_by_name(name) {
                Some(Value::Null) | None => String::new(),
                Some(value) => value.to_string(),
            })
        }));
    }

    let mut out = table.to_string();
    out.push_str(&format!("\n{} row(s)", rows.len()));
    out
}

pub fn rows_json(rows: &[Row]) -> JsonValue {
    JsonValue::Array(rows.iter().map(Row::to_json).collect())
}

pub fn format_drift(report: &DriftReport) -> String {
    if report.is_consistent() {
        return "Catalog and live schema agree.".to_string();
    }

    let mut out = String::new();
    if !report.missing_relations.is_empty() {
        out.push_str("In the catalog but missing from the live schema:\n");
        for name in &report.missing_relations {
            out.push_str(&format!("  - {}\n", name));
        }
    }
    if !report.uncataloged_relations.is_empty() {
        out.push_str("In the live schema but not in the catalog:\n");
        for relation in &report.uncataloged_relations {
            let columns = relation
                .definition
                .as_ref()
                .map(|d| d.column_names().join(", "))
                .unwrap_or_else(|| "columns unknown".to_string());
            out.push_str(&format!("  - {} ({})\n", relation.name, columns));
        }
    }
    out
}
