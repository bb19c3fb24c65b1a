//! SQL Dialect Metadata
//!
//! This module defines types that drivers provide to describe their SQL dialect:
//! reserved keywords, the DDL names of the logical column types, identifier and
//! string quoting, and auto-increment syntax.
//!
//! Drivers provide all metadata; DDL generation consumes it without
//! hardcoding per-driver logic.

use std::borrow::Cow;

/// Information about a SQL data type
#[derive(Debug, Clone)]
pub struct DataTypeInfo {
    /// Type name as used in DDL (e.g., "TEXT", "INTEGER")
    pub name: Cow<'static, str>,
    /// Category for grouping
    pub category: DataTypeCategory,
}

impl DataTypeInfo {
    pub const fn new(name: &'static str, category: DataTypeCategory) -> Self {
        Self {
            name: Cow::Borrowed(name),
            category,
        }
    }
}

/// Categories of SQL data types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataTypeCategory {
    /// Integer types (INTEGER, BIGINT, etc.)
    Integer,
    /// Floating point (REAL, DOUBLE, etc.)
    Float,
    /// Character/String (VARCHAR, TEXT, etc.)
    String,
    /// Binary data (BLOB, BYTEA, etc.)
    Binary,
    /// Date only
    Date,
    /// Other database-specific
    Other,
}

/// Auto-increment configuration
#[derive(Debug, Clone)]
pub struct AutoIncrementInfo {
    /// Keyword used (e.g., "AUTOINCREMENT", "AUTO_INCREMENT")
    pub keyword: Cow<'static, str>,
    /// Syntax style
    pub style: AutoIncrementStyle,
}

/// How auto-increment is specified
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoIncrementStyle {
    /// Keyword after column definition (SQLite AUTOINCREMENT, MySQL AUTO_INCREMENT)
    Suffix,
    /// Special type name (PostgreSQL SERIAL, BIGSERIAL)
    TypeName,
}

/// Complete dialect information provided by a driver
#[derive(Debug, Clone)]
pub struct DialectInfo {
    /// Dialect identifier (e.g., "sqlite")
    pub id: Cow<'static, str>,
    /// Display name
    pub display_name: Cow<'static, str>,
    /// Reserved keywords that may not be used as bare identifiers
    pub keywords: Vec<Cow<'static, str>>,
    /// Supported data types, first entry of a category is the preferred one
    pub data_types: Vec<DataTypeInfo>,
    /// Auto-increment configuration
    pub auto_increment: Option<AutoIncrementInfo>,
    /// Identifier quote character (e.g., '"' for SQL standard, '`' for MySQL)
    pub identifier_quote: char,
    /// String literal quote (usually '\'')
    pub string_quote: char,
}

impl Default for DialectInfo {
    fn default() -> Self {
        Self {
            id: Cow::Borrowed("generic"),
            display_name: Cow::Borrowed("SQL"),
            keywords: Vec::new(),
            data_types: vec![
                DataTypeInfo::new("INTEGER", DataTypeCategory::Integer),
                DataTypeInfo::new("TEXT", DataTypeCategory::String),
                DataTypeInfo::new("DATE", DataTypeCategory::Date),
            ],
            auto_increment: None,
            identifier_quote: '"',
            string_quote: '\'',
        }
    }
}

impl DialectInfo {
    /// Check whether a word is one of the dialect's keywords (case-insensitive)
    pub fn is_keyword(&self, word: &str) -> bool {
        self.keywords
            .iter()
            .any(|k| k.eq_ignore_ascii_case(word))
    }

    /// Preferred DDL type name for a category
    pub fn type_name(&self, category: DataTypeCategory) -> Option<&str> {
        self.data_types
            .iter()
            .find(|t| t.category == category)
            .map(|t| t.name.as_ref())
    }

    /// Quote an identifier, doubling any embedded quote characters
    pub fn quote_identifier(&self, name: &str) -> String {
        let q = self.identifier_quote;
        let escaped = name.replace(q, &format!("{q}{q}"));
        format!("{q}{escaped}{q}")
    }

    /// Render a string literal, doubling any embedded quote characters
    pub fn quote_string(&self, value: &str) -> String {
        let q = self.string_quote;
        let escaped = value.replace(q, &format!("{q}{q}"));
        format!("{q}{escaped}{q}")
    }
}
