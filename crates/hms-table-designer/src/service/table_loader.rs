//! Table loader for rebuilding definitions from a live schema
//!
//! Used to describe relations that exist in the store but are missing from
//! the catalog.

use hms_core::{ColumnInfo, Connection};

use crate::models::{Column, ColumnType, ROW_ID_COLUMN, TableDefinition};

/// Table loader for converting live tables to a `TableDefinition`
///
/// This is a stateless utility.
pub struct TableLoader;

impl TableLoader {
    /// Load an existing table's structure
    ///
    /// The store-assigned `id` column is skipped. The first NOT NULL column is
    /// taken as the primary column, matching how managed tables are created.
    ///
    /// # Errors
    /// Returns an error if introspection is not supported, the table does not
    /// exist, or the backend call fails.
    pub async fn load_definition(
        connection: &dyn Connection,
        table_name: &str,
    ) -> anyhow::Result<TableDefinition> {
        let schema_introspection = connection.as_schema_introspection().ok_or_else(|| {
            anyhow::anyhow!("Schema introspection not supported for this connection")
        })?;

        let columns = schema_introspection
            .get_columns(table_name)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to load table '{}': {}", table_name, e))?;

        if columns.is_empty() {
            anyhow::bail!("Table '{}' does not exist", table_name);
        }

        tracing::debug!(table = %table_name, column_count = columns.len(), "loaded live columns");
        Ok(Self::definition_from_columns(table_name, &columns))
    }

    /// Build a definition from introspected columns
    pub fn definition_from_columns(table_name: &str, columns: &[ColumnInfo]) -> TableDefinition {
        let mut primary_taken = false;
        let columns = columns
            .iter()
            .filter(|info| info.name != ROW_ID_COLUMN)
            .map(|info| {
                let is_primary = !info.nullable && !primary_taken;
                primary_taken |= is_primary;
                Column {
                    name: info.name.clone(),
                    column_type: ColumnType::from_declared_type(&info.data_type),
                    default_value: info.default_value.as_deref().map(unquote_literal),
                    is_primary,
                }
            })
            .collect();

        TableDefinition {
            name: table_name.to_string(),
            description: String::new(),
            columns,
        }
    }
}

/// Turn a stored SQL default (`'O''Brien'`, `12`) back into its raw text
fn unquote_literal(literal: &str) -> String {
    let trimmed = literal.trim();
    match trimmed
        .strip_prefix('\'')
        .and_then(|rest| rest.strip_suffix('\''))
    {
        Some(inner) => inner.replace("''", "'"),
        None => trimmed.to_string(),
    }
}
