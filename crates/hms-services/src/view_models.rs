use chrono::{DateTime, Utc};
use hms_table_designer::TableDefinition;
use serde::Serialize;

use crate::catalog::CatalogEntry;

/// Catalog entry summary for listings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableSummary {
    pub name: String,
    pub sanitized_name: String,
    pub description: String,
    pub column_count: usize,
    /// Name of the primary column, if one is declared
    pub primary_column: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&CatalogEntry> for TableSummary {
    fn from(entry: &CatalogEntry) -> Self {
        Self {
            name: entry.definition.name.clone(),
            sanitized_name: entry.sanitized_name.clone(),
            description: entry.definition.description.clone(),
            column_count: entry.definition.columns.len(),
            primary_column: entry
                .definition
                .primary_column()
                .map(|column| column.name.clone()),
            created_at: entry.created_at,
        }
    }
}

/// A live relation with no catalog entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UncatalogedRelation {
    pub name: String,
    pub row_count: Option<i64>,
    /// Definition rebuilt from the live schema, when introspection succeeds
    pub definition: Option<TableDefinition>,
}

/// Differences between the catalog and the live schema
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DriftReport {
    /// Catalog entries whose relation is gone
    pub missing_relations: Vec<String>,
    /// Relations the catalog does not know about
    pub uncataloged_relations: Vec<UncatalogedRelation>,
}

impl DriftReport {
    pub fn is_consistent(&self) -> bool {
        self.missing_relations.is_empty() && self.uncataloged_relations.is_empty()
    }
}
