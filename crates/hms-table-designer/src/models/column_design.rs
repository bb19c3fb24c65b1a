//! Column model

use hms_core::Value;
use serde::{Deserialize, Serialize};

use super::{ColumnType, DesignError};
use crate::identifier::sanitize;

/// Name of the store-assigned row identifier present in every managed table
pub const ROW_ID_COLUMN: &str = "id";

/// An operator-defined column.
///
/// Serialized in the catalog as `{ "name", "type", "defaultValue", "isPrimary" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    /// Column display name
    pub name: String,
    /// Logical type
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    /// Default applied when a row is inserted without this column
    #[serde(default)]
    pub default_value: Option<String>,
    /// Natural key of the table, enforced as NOT NULL UNIQUE
    #[serde(default)]
    pub is_primary: bool,
}

impl Column {
    /// Create a column with a name and type
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            default_value: None,
            is_primary: false,
        }
    }

    /// Builder: set default value
    pub fn default(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Builder: mark as the primary column
    pub fn primary(mut self) -> Self {
        self.is_primary = true;
        self
    }

    /// Storage identifier for this column
    pub fn sanitized_name(&self) -> Result<String, DesignError> {
        let sanitized = sanitize(&self.name).map_err(|e| match e {
            DesignError::InvalidIdentifier { reason, .. } => {
                DesignError::column(self.name.clone(), reason)
            }
            other => other,
        })?;

        if sanitized == ROW_ID_COLUMN {
            return Err(DesignError::column(
                self.name.clone(),
                "'id' is assigned by the store and cannot be declared",
            ));
        }
        Ok(sanitized)
    }

    /// Parsed default, or None when no default is declared
    pub fn default_as_value(&self) -> Result<Option<Value>, DesignError> {
        let Some(raw) = &self.default_value else {
            return Ok(None);
        };
        self.column_type.parse_text(raw).map(Some).ok_or_else(|| {
            DesignError::column(
                self.name.clone(),
                format!("default '{}' is not a valid {}", raw, self.column_type),
            )
        })
    }

    /// Check name and default
    pub fn validate(&self) -> Result<(), DesignError> {
        if self.name.trim().is_empty() {
            return Err(DesignError::column(self.name.clone(), "column name is required"));
        }
        self.sanitized_name()?;
        self.default_as_value()?;
        Ok(())
    }
}
