//! Schema introspection traits and types

use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Live-schema introspection interface
#[async_trait]
pub trait SchemaIntrospection: Send + Sync {
    /// List all user tables
    async fn list_tables(&self) -> Result<Vec<TableInfo>>;

    /// Get columns for a table
    async fn get_columns(&self, table: &str) -> Result<Vec<ColumnInfo>>;

    /// Check whether a relation with exactly this name exists.
    ///
    /// The default scans `list_tables`; drivers should override it with a
    /// single bound-parameter probe.
    async fn table_exists(&self, table: &str) -> Result<bool> {
        Ok(self.list_tables().await?.iter().any(|t| t.name == table))
    }
}

/// Table information (basic)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableInfo {
    pub name: String,
    pub row_count: Option<i64>,
}

/// Column information
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    pub ordinal: usize,
    pub data_type: String,
    pub nullable: bool,
    pub default_value: Option<String>,
    pub is_primary_key: bool,
    pub is_auto_increment: bool,
}
