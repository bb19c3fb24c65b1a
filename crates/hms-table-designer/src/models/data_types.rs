//! Column type information

use chrono::NaiveDate;
use hms_core::{DataTypeCategory, Value};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::DesignError;

/// Logical type of an operator-defined column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Text,
    #[serde(alias = "number")]
    Integer,
    Date,
}

impl ColumnType {
    pub const ALL: [ColumnType; 3] = [ColumnType::Text, ColumnType::Integer, ColumnType::Date];

    /// Lower-case name as shown to operators and stored in the catalog
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Text => "text",
            ColumnType::Integer => "integer",
            ColumnType::Date => "date",
        }
    }

    /// Dialect category used to look up the DDL type name
    pub fn category(&self) -> DataTypeCategory {
        match self {
            ColumnType::Text => DataTypeCategory::String,
            ColumnType::Integer => DataTypeCategory::Integer,
            ColumnType::Date => DataTypeCategory::Date,
        }
    }

    /// DDL type name used when the dialect does not list one for the category
    pub fn fallback_sql_type(&self) -> &'static str {
        match self {
            ColumnType::Text => "TEXT",
            ColumnType::Integer => "INTEGER",
            ColumnType::Date => "DATE",
        }
    }

    /// Guess the logical type from a declared backend type
    pub fn from_declared_type(declared: &str) -> Self {
        let upper = declared.to_ascii_uppercase();
        if upper.contains("INT") {
            ColumnType::Integer
        } else if upper.contains("DATE") {
            ColumnType::Date
        } else {
            ColumnType::Text
        }
    }

    /// Parse raw text (a form field or a stored default) as this type
    pub fn parse_text(&self, raw: &str) -> Option<Value> {
        match self {
            ColumnType::Text => Some(Value::String(raw.to_string())),
            ColumnType::Integer => raw.trim().parse::<i64>().ok().map(Value::Int64),
            ColumnType::Date => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                .ok()
                .map(Value::Date),
        }
    }

    /// Coerce a supplied value into this type. NULL is always accepted.
    pub fn coerce(&self, value: &Value) -> Option<Value> {
        match (self, value) {
            (_, Value::Null) => Some(Value::Null),
            (ColumnType::Text, Value::String(_)) => Some(value.clone()),
            (ColumnType::Text, Value::Int64(_) | Value::Float64(_) | Value::Date(_)) => {
                Some(Value::String(value.to_string()))
            }
            (ColumnType::Integer, Value::Int64(_)) => Some(value.clone()),
            (ColumnType::Date, Value::Date(_)) => Some(value.clone()),
            (ColumnType::Integer | ColumnType::Date, Value::String(s)) => self.parse_text(s),
            _ => None,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnType {
    type Err = DesignError;

    /// Accepts `text`, `integer`, `date`, and `number` as a synonym for integer.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(ColumnType::Text),
            "integer" | "number" => Ok(ColumnType::Integer),
            "date" => Ok(ColumnType::Date),
            other => Err(DesignError::column(
                "",
                format!("unknown column type '{}', expected text, integer, number or date", other),
            )),
        }
    }
}
