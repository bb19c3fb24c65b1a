//! Table definition model

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::{Column, DesignError};
use crate::identifier::sanitize;

/// Most columns an operator may define for one table
pub const MAX_COLUMNS: usize = 20;

/// An operator-designed table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDefinition {
    /// Display name ("Patient Records")
    pub name: String,
    /// Free-text description shown in listings
    #[serde(default)]
    pub description: String,
    /// Columns in display order, excluding the store-assigned id
    pub columns: Vec<Column>,
}

impl TableDefinition {
    /// Create a new definition with a display name and no columns
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            columns: Vec::new(),
        }
    }

    /// Builder: set description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Builder: add a column
    pub fn with_column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    /// Storage identifier, always derived from the display name
    pub fn sanitized_name(&self) -> Result<String, DesignError> {
        sanitize(&self.name)
    }

    /// Check the whole definition, reporting the first problem found.
    ///
    /// Order: table name, column count, each column, duplicate column names,
    /// primary column count.
    pub fn validate(&self) -> Result<(), DesignError> {
        if self.name.trim().is_empty() {
            return Err(DesignError::InvalidDefinition("table name is required".into()));
        }
        self.sanitized_name()?;

        if self.columns.is_empty() {
            return Err(DesignError::InvalidDefinition(
                "at least one column is required".into(),
            ));
        }
        if self.columns.len() > MAX_COLUMNS {
            return Err(DesignError::InvalidDefinition(format!(
                "{} columns defined, the limit is {}",
                self.columns.len(),
                MAX_COLUMNS
            )));
        }

        let mut seen = HashSet::new();
        for column in &self.columns {
            column.validate()?;
            let sanitized = column.sanitized_name()?;
            if !seen.insert(sanitized.clone()) {
                return Err(DesignError::column(
                    column.name.clone(),
                    format!("duplicate column name '{}'", sanitized),
                ));
            }
        }

        let primary: Vec<String> = self
            .columns
            .iter()
            .filter(|c| c.is_primary)
            .map(|c| c.name.clone())
            .collect();
        if primary.len() > 1 {
            return Err(DesignError::MultiplePrimaryKeys { columns: primary });
        }

        Ok(())
    }

    /// The primary column, if one is declared
    pub fn primary_column(&self) -> Option<&Column> {
        self.columns.iter().find(|c| c.is_primary)
    }

    /// Find a column by display or sanitized name
    pub fn column(&self, name: &str) -> Option<&Column> {
        let wanted = sanitize(name).ok();
        self.columns.iter().find(|c| {
            c.name == name || (wanted.is_some() && c.sanitized_name().ok() == wanted)
        })
    }

    /// Position of a column found the same way as [`TableDefinition::column`]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let found = self.column(name)?;
        self.columns.iter().position(|c| std::ptr::eq(c, found))
    }

    /// Sanitized column names in display order
    pub fn column_names(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter_map(|c| c.sanitized_name().ok())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ColumnType;

    fn patients() -> TableDefinition {
        TableDefinition::new("Patient Records")
            .with_description("Admitted patients")
            .with_column(Column::new("Full Name", ColumnType::Text).primary())
            .with_column(Column::new("Admitted", ColumnType::Date))
            .with_column(Column::new("Bed", ColumnType::Integer).default("1"))
    }

    #[test]
    fn test_valid_definition() {
        let def = patients();
        assert!(def.validate().is_ok());
        assert_eq!(def.sanitized_name().unwrap(), "patient_records");
        assert_eq!(def.column_names(), vec!["full_name", "admitted", "bed"]);
        assert_eq!(def.primary_column().map(|c| c.name.as_str()), Some("Full Name"));
    }

    #[test]
    fn test_two_primary_columns() {
        let def = patients().with_column(Column::new("MRN", ColumnType::Text).primary());
        assert_eq!(
            def.validate(),
            Err(DesignError::MultiplePrimaryKeys {
                columns: vec!["Full Name".into(), "MRN".into()]
            })
        );
    }

    #[test]
    fn test_column_count_limits() {
        let empty = TableDefinition::new("Wards");
        assert!(matches!(empty.validate(), Err(DesignError::InvalidDefinition(_))));

        let mut wide = TableDefinition::new("Wards");
        for i in 0..=MAX_COLUMNS {
            wide = wide.with_column(Column::new(format!("c{i}"), ColumnType::Text));
        }
        assert!(matches!(wide.validate(), Err(DesignError::InvalidDefinition(_))));
        wide.columns.pop();
        assert!(wide.validate().is_ok());
    }

    #[test]
    fn test_duplicate_after_sanitizing() {
        let def = TableDefinition::new("Wards")
            .with_column(Column::new("Bed Count", ColumnType::Integer))
            .with_column(Column::new("bed  count", ColumnType::Integer));
        assert!(matches!(def.validate(), Err(DesignError::InvalidColumn { .. })));
    }

    #[test]
    fn test_bad_table_name() {
        let def = TableDefinition::new("   ").with_column(Column::new("a", ColumnType::Text));
        assert!(matches!(def.validate(), Err(DesignError::InvalidDefinition(_))));

        let def = TableDefinition::new("Beds!").with_column(Column::new("a", ColumnType::Text));
        assert!(matches!(def.validate(), Err(DesignError::InvalidIdentifier { .. })));
    }

    #[test]
    fn test_column_lookup_by_either_name() {
        let def = patients();
        assert_eq!(def.column("full_name").map(|c| c.name.as_str()), Some("Full Name"));
        assert_eq!(def.column("Full Name").map(|c| c.name.as_str()), Some("Full Name"));
        assert_eq!(def.column_index("bed"), Some(2));
        assert!(def.column("ward").is_none());
    }
}
