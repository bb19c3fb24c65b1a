//! Catalog of managed table definitions
//!
//! The catalog is an ordinary relation in the backend. Each row holds one
//! definition: display name, derived identifier, description and the column
//! list as JSON.

use chrono::{DateTime, Utc};
use hms_core::{Row, Value};
use hms_table_designer::{Column, TableDefinition, sanitize};
use serde::Serialize;
use std::sync::Arc;

use crate::backend::Backend;
use crate::error::{ServiceError, ServiceResult, Step};

/// Relation name used for the catalog when none is configured
pub const DEFAULT_CATALOG_TABLE: &str = "tables";

const CATALOG_COLUMNS: &str =
    r#""id", "name", "sanitized_name", "description", "columns", "created_at""#;

/// One persisted table definition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogEntry {
    /// Catalog row id, gives insertion order
    pub id: i64,
    pub sanitized_name: String,
    pub definition: TableDefinition,
    pub created_at: DateTime<Utc>,
}

/// Reads and writes the catalog relation
pub struct CatalogStore {
    backend: Arc<Backend>,
    table: String,
    quoted: String,
}

impl CatalogStore {
    /// Create a store over `table`, which must be a valid identifier
    pub fn new(backend: Arc<Backend>, table: &str) -> ServiceResult<Self> {
        let quoted = backend.generator().quote(table)?;
        Ok(Self {
            backend,
            table: table.to_string(),
            quoted,
        })
    }

    /// Name of the catalog relation, reserved for managed tables
    pub fn table_name(&self) -> &str {
        &self.table
    }

    /// Create the catalog relation if it does not exist yet
    #[tracing::instrument(skip(self), fields(catalog = %self.table))]
    pub async fn ensure_schema(&self) -> ServiceResult<()> {
        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {} (\n  \
             \"id\" INTEGER PRIMARY KEY AUTOINCREMENT,\n  \
             \"name\" TEXT NOT NULL,\n  \
             \"sanitized_name\" TEXT NOT NULL UNIQUE,\n  \
             \"description\" TEXT NOT NULL DEFAULT '',\n  \
             \"columns\" TEXT NOT NULL,\n  \
             \"created_at\" TEXT NOT NULL\n)",
            self.quoted
        );
        self.backend
            .execute("open_catalog", Step::Catalog, &sql, &[])
            .await?;
        Ok(())
    }

    /// All entries in insertion order
    pub async fn list(&self, operation: &'static str) -> ServiceResult<Vec<CatalogEntry>> {
        let sql = format!(
            "SELECT {} FROM {} ORDER BY \"id\"",
            CATALOG_COLUMNS, self.quoted
        );
        let result = self
            .backend
            .query(operation, Step::Catalog, &sql, &[])
            .await?;

        result
            .rows
            .iter()
            .map(|row| entry_from_row(operation, row))
            .collect()
    }

    /// Look up one entry by sanitized name
    pub async fn get(
        &self,
        operation: &'static str,
        sanitized_name: &str,
    ) -> ServiceResult<Option<CatalogEntry>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE \"sanitized_name\" = ?",
            CATALOG_COLUMNS, self.quoted
        );
        let result = self
            .backend
            .query(operation, Step::Catalog, &sql, &[Value::from(sanitized_name)])
            .await?;

        result
            .rows
            .first()
            .map(|row| entry_from_row(operation, row))
            .transpose()
    }

    /// Persist a new entry. The definition must already be validated.
    pub async fn insert(
        &self,
        operation: &'static str,
        definition: &TableDefinition,
    ) -> ServiceResult<CatalogEntry> {
        let sanitized_name = definition.sanitized_name()?;
        let created_at = Utc::now();
        let sql = format!(
            "INSERT INTO {} (\"name\", \"sanitized_name\", \"description\", \"columns\", \"created_at\") \
             VALUES (?, ?, ?, ?, ?)",
            self.quoted
        );
        let params = [
            Value::from(definition.name.as_str()),
            Value::from(sanitized_name.as_str()),
            Value::from(definition.description.as_str()),
            Value::String(encode_columns(operation, &definition.columns)?),
            Value::String(created_at.to_rfc3339()),
        ];

        let result = self
            .backend
            .execute(operation, Step::Catalog, &sql, &params)
            .await?;
        let id = result.last_insert_id.ok_or_else(|| ServiceError::Catalog {
            operation,
            message: "backend did not report the new catalog row id".into(),
        })?;

        Ok(CatalogEntry {
            id,
            sanitized_name,
            definition: definition.clone(),
            created_at,
        })
    }

    /// Replace the stored column list of an entry
    pub async fn update_columns(
        &self,
        operation: &'static str,
        sanitized_name: &str,
        columns: &[Column],
    ) -> ServiceResult<()> {
        let sql = format!(
            "UPDATE {} SET \"columns\" = ? WHERE \"sanitized_name\" = ?",
            self.quoted
        );
        let params = [
            Value::String(encode_columns(operation, columns)?),
            Value::from(sanitized_name),
        ];
        let result = self
            .backend
            .execute(operation, Step::Catalog, &sql, &params)
            .await?;
        if result.affected_rows != 1 {
            return Err(ServiceError::Catalog {
                operation,
                message: format!(
                    "expected to update one entry for '{}', updated {}",
                    sanitized_name, result.affected_rows
                ),
            });
        }
        Ok(())
    }

    /// Remove an entry, returning whether one was removed
    pub async fn delete(&self, operation: &'static str, sanitized_name: &str) -> ServiceResult<bool> {
        let sql = format!("DELETE FROM {} WHERE \"sanitized_name\" = ?", self.quoted);
        let result = self
            .backend
            .execute(operation, Step::Catalog, &sql, &[Value::from(sanitized_name)])
            .await?;
        Ok(result.affected_rows > 0)
    }
}

fn encode_columns(operation: &'static str, columns: &[Column]) -> ServiceResult<String> {
    serde_json::to_string(columns).map_err(|e| ServiceError::Catalog {
        operation,
        message: format!("failed to encode column list: {}", e),
    })
}

fn entry_from_row(operation: &'static str, row: &Row) -> ServiceResult<CatalogEntry> {
    let corrupt = |message: String| ServiceError::Catalog { operation, message };
    let text = |column: &str| {
        row.get_by_name(column)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| corrupt(format!("catalog row is missing '{}'", column)))
    };

    let name = text("name")?;
    let stored = text("sanitized_name")?;
    let derived = sanitize(&name).map_err(|e| corrupt(e.to_string()))?;
    if derived != stored {
        return Err(corrupt(format!(
            "stored identifier '{}' does not match '{}' derived from '{}'",
            stored, derived, name
        )));
    }

    let columns: Vec<Column> = serde_json::from_str(&text("columns")?)
        .map_err(|e| corrupt(format!("column list for '{}' is not valid: {}", stored, e)))?;
    let created_at = DateTime::parse_from_rfc3339(&text("created_at")?)
        .map_err(|e| corrupt(format!("created_at for '{}' is not valid: {}", stored, e)))?
        .with_timezone(&Utc);
    let id = row
        .get_by_name("id")
        .and_then(Value::as_i64)
        .ok_or_else(|| corrupt("catalog row is missing 'id'".into()))?;
    let description = row
        .get_by_name("description")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    Ok(CatalogEntry {
        id,
        sanitized_name: stored,
        definition: TableDefinition {
            name,
            description,
            columns,
        },
        created_at,
    })
}
