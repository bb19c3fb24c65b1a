//! DDL generation for table definitions
//!
//! Generates CREATE TABLE, DROP TABLE and column-level ALTER TABLE statements.
//! Identifier quoting, type names and auto-increment syntax come from the
//! driver's `DialectInfo` rather than being hardcoded here.

use hms_core::{AutoIncrementStyle, DataTypeCategory, DialectInfo};

use crate::identifier::validate_identifier;
use crate::models::{Column, ColumnType, DesignError, ROW_ID_COLUMN, TableDefinition};

/// DDL Generator for creating SQL statements from table definitions
///
/// Every identifier is checked against the allowlist and the dialect's
/// keywords before it is quoted. Default values are parsed as the column type
/// and re-rendered, never copied verbatim into a statement.
#[derive(Debug, Clone)]
pub struct DdlGenerator {
    dialect: DialectInfo,
}

impl DdlGenerator {
    pub fn new(dialect: DialectInfo) -> Self {
        Self { dialect }
    }

    pub fn dialect(&self) -> &DialectInfo {
        &self.dialect
    }

    /// Validate and quote an identifier for use in any statement
    pub fn quote(&self, identifier: &str) -> Result<String, DesignError> {
        validate_identifier(identifier)?;
        if self.dialect.is_keyword(identifier) {
            return Err(DesignError::InvalidIdentifier {
                name: identifier.to_string(),
                reason: format!("'{}' is a {} keyword", identifier, self.dialect.display_name),
            });
        }
        Ok(self.dialect.quote_identifier(identifier))
    }

    /// Generate CREATE TABLE statement
    pub fn create_table(&self, definition: &TableDefinition) -> Result<String, DesignError> {
        definition.validate()?;
        let table = self.quote(&definition.sanitized_name()?)?;

        let mut column_defs = vec![self.row_id_definition()];
        for column in &definition.columns {
            column_defs.push(self.column_definition(column)?);
        }

        Ok(format!(
            "CREATE TABLE {} (\n  {}\n)",
            table,
            column_defs.join(",\n  ")
        ))
    }

    /// Generate DROP TABLE statement.
    ///
    /// No `IF EXISTS`: a missing relation must surface as a backend error.
    pub fn drop_table(&self, sanitized_name: &str) -> Result<String, DesignError> {
        Ok(format!("DROP TABLE {}", self.quote(sanitized_name)?))
    }

    /// Generate ALTER TABLE ... ADD COLUMN
    pub fn add_column(&self, sanitized_name: &str, column: &Column) -> Result<String, DesignError> {
        column.validate()?;
        Ok(format!(
            "ALTER TABLE {} ADD COLUMN {}",
            self.quote(sanitized_name)?,
            self.column_definition(column)?
        ))
    }

    /// Generate ALTER TABLE ... DROP COLUMN
    pub fn drop_column(&self, sanitized_name: &str, column: &str) -> Result<String, DesignError> {
        Ok(format!(
            "ALTER TABLE {} DROP COLUMN {}",
            self.quote(sanitized_name)?,
            self.quote(column)?
        ))
    }

    /// Generate ALTER TABLE ... RENAME COLUMN
    pub fn rename_column(
        &self,
        sanitized_name: &str,
        from: &str,
        to: &str,
    ) -> Result<String, DesignError> {
        Ok(format!(
            "ALTER TABLE {} RENAME COLUMN {} TO {}",
            self.quote(sanitized_name)?,
            self.quote(from)?,
            self.quote(to)?
        ))
    }

    /// Definition of the store-assigned row id, first in every managed table
    fn row_id_definition(&self) -> String {
        let ty = self
            .dialect
            .type_name(DataTypeCategory::Integer)
            .unwrap_or("INTEGER");
        let q = self.dialect.quote_identifier(ROW_ID_COLUMN);

        match &self.dialect.auto_increment {
            Some(ai) if ai.style == AutoIncrementStyle::TypeName => {
                format!("{} {} PRIMARY KEY", q, ai.keyword)
            }
            Some(ai) => format!("{} {} PRIMARY KEY {}", q, ty, ai.keyword),
            None => format!("{} {} PRIMARY KEY", q, ty),
        }
    }

    fn column_definition(&self, column: &Column) -> Result<String, DesignError> {
        let name = self.quote(&column.sanitized_name()?)?;
        let mut def = format!("{} {}", name, self.sql_type(column.column_type));

        if column.is_primary {
            def.push_str(" NOT NULL UNIQUE");
        }

        if let Some(literal) = self.default_literal(column)? {
            def.push_str(" DEFAULT ");
            def.push_str(&literal);
        }

        Ok(def)
    }

    fn sql_type(&self, column_type: ColumnType) -> &str {
        self.dialect
            .type_name(column_type.category())
            .unwrap_or(column_type.fallback_sql_type())
    }

    /// Render a declared default as a literal of the column's type
    fn default_literal(&self, column: &Column) -> Result<Option<String>, DesignError> {
        let Some(value) = column.default_as_value()? else {
            return Ok(None);
        };

        let literal = match (column.column_type, value) {
            (ColumnType::Integer, hms_core::Value::Int64(n)) => n.to_string(),
            (ColumnType::Date, hms_core::Value::Date(d)) => {
                self.dialect.quote_string(&d.format("%Y-%m-%d").to_string())
            }
            (ColumnType::Text, hms_core::Value::String(s)) => self.dialect.quote_string(&s),
            (_, other) => {
                return Err(DesignError::column(
                    column.name.clone(),
                    format!("default '{}' cannot be rendered", other),
                ));
            }
        };
        Ok(Some(literal))
    }
}
