//! Validation errors for table definitions

use thiserror::Error;

/// Validation failure for a table definition, raised before any backend call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DesignError {
    #[error("Invalid identifier '{name}': {reason}")]
    InvalidIdentifier { name: String, reason: String },

    #[error("Invalid column '{column}': {reason}")]
    InvalidColumn { column: String, reason: String },

    #[error("Only one primary column is allowed, found: {}", columns.join(", "))]
    MultiplePrimaryKeys { columns: Vec<String> },

    #[error("Invalid table definition: {0}")]
    InvalidDefinition(String),
}

impl DesignError {
    /// Create a column error
    pub fn column(column: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidColumn {
            column: column.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for definition validation
pub type DesignResult<T> = std::result::Result<T, DesignError>;
