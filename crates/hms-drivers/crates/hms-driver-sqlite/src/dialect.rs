//! SQLite dialect information

use hms_core::{
    AutoIncrementInfo, AutoIncrementStyle, DataTypeCategory, DataTypeInfo, DialectInfo,
};
use std::borrow::Cow;

/// Build the SQLite dialect info
pub fn sqlite_dialect() -> DialectInfo {
    DialectInfo {
        id: Cow::Borrowed("sqlite"),
        display_name: Cow::Borrowed("SQLite"),
        keywords: sqlite_keywords(),
        data_types: sqlite_data_types(),
        auto_increment: Some(AutoIncrementInfo {
            keyword: Cow::Borrowed("AUTOINCREMENT"),
            style: AutoIncrementStyle::Suffix,
        }),
        identifier_quote: '"',
        string_quote: '\'',
    }
}

/// Words that may not be used as bare identifiers
const SQLITE_KEYWORDS: &[&str] = &[
    "SELECT", "FROM", "WHERE", "ORDER", "GROUP", "HAVING", "LIMIT", "OFFSET",
    "DISTINCT", "INSERT", "UPDATE", "DELETE", "REPLACE", "INTO", "SET", "CREATE",
    "ALTER", "DROP", "TABLE", "INDEX", "VIEW", "TRIGGER", "COLUMN", "CONSTRAINT",
    "PRIMARY", "FOREIGN", "REFERENCES", "UNIQUE", "CHECK", "DEFAULT", "BEGIN", "COMMIT",
    "ROLLBACK", "SAVEPOINT", "TRANSACTION", "JOIN", "ON", "USING", "AS", "UNION",
    "EXCEPT", "INTERSECT", "WITH", "VALUES", "RETURNING", "AND", "OR", "NOT", "IN",
    "LIKE", "GLOB", "BETWEEN", "IS", "NULL", "EXISTS", "CASE", "WHEN", "THEN", "ELSE",
    "END", "PRAGMA", "ATTACH", "DETACH", "VACUUM", "ANALYZE", "REINDEX",
    "AUTOINCREMENT", "ROWID",
];

fn sqlite_keywords() -> Vec<Cow<'static, str>> {
    SQLITE_KEYWORDS.iter().copied().map(Cow::Borrowed).collect()
}

fn sqlite_data_types() -> Vec<DataTypeInfo> {
    vec![
        DataTypeInfo::new("INTEGER", DataTypeCategory::Integer),
        DataTypeInfo::new("REAL", DataTypeCategory::Float),
        DataTypeInfo::new("TEXT", DataTypeCategory::String),
        DataTypeInfo::new("BLOB", DataTypeCategory::Binary),
        // Stored as ISO-8601 text; the declared type keeps the intent visible
        DataTypeInfo::new("DATE", DataTypeCategory::Date),
    ]
}
