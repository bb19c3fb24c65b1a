//! Identifier sanitizing
//!
//! Display names typed by operators ("Patient Records") become storage
//! identifiers (`patient_records`). Every identifier that reaches a statement
//! goes through [`sanitize`] or [`validate_identifier`] first.

use crate::models::DesignError;

/// Longest identifier accepted
pub const MAX_IDENTIFIER_LEN: usize = 63;

/// Prefix reserved by SQLite for its internal tables
const INTERNAL_PREFIX: &str = "sqlite_";

/// Words that are never accepted as identifiers, independent of the backend
const RESERVED_WORDS: &[&str] = &[
    "abort", "add", "all", "alter", "and", "as", "asc", "autoincrement", "begin", "between", "by",
    "case", "check", "collate", "column", "commit", "constraint", "create", "cross", "default",
    "delete", "desc", "distinct", "drop", "else", "end", "escape", "except", "exists", "foreign",
    "from", "full", "glob", "group", "having", "in", "index", "inner", "insert", "intersect",
    "into", "is", "isnull", "join", "key", "left", "like", "limit", "natural", "not", "notnull",
    "null", "offset", "on", "or", "order", "outer", "pragma", "primary", "references", "returning",
    "right", "rollback", "rowid", "select", "set", "table", "then", "to", "transaction", "trigger",
    "union", "unique", "update", "using", "vacuum", "values", "view", "when", "where", "with",
];

/// Derive the storage identifier for a display name.
///
/// Trims, lower-cases and collapses each run of whitespace into a single `_`.
/// The result is validated with [`validate_identifier`]; errors name the
/// original display name. Applying `sanitize` to its own output returns the
/// same identifier.
pub fn sanitize(display_name: &str) -> Result<String, DesignError> {
    let sanitized = display_name
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_");

    check(&sanitized).map_err(|reason| DesignError::InvalidIdentifier {
        name: display_name.to_string(),
        reason,
    })?;

    Ok(sanitized)
}

/// Check an identifier that should already be in sanitized form.
pub fn validate_identifier(identifier: &str) -> Result<(), DesignError> {
    check(identifier).map_err(|reason| DesignError::InvalidIdentifier {
        name: identifier.to_string(),
        reason,
    })
}

/// Whether `word` is on the built-in reserved list (case-insensitive)
pub fn is_reserved_word(word: &str) -> bool {
    let lower = word.to_ascii_lowercase();
    RESERVED_WORDS.contains(&lower.as_str())
}

fn check(identifier: &str) -> Result<(), String> {
    let first_char = identifier
        .chars()
        .next()
        .ok_or_else(|| "name is empty".to_string())?;

    if identifier.len() > MAX_IDENTIFIER_LEN {
        return Err(format!(
            "name is {} characters long, the limit is {}",
            identifier.len(),
            MAX_IDENTIFIER_LEN
        ));
    }

    if let Some(bad) = identifier
        .chars()
        .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_'))
    {
        return Err(format!(
            "character '{}' is not allowed, use letters, digits, spaces or underscores",
            bad
        ));
    }

    if first_char.is_ascii_digit() {
        return Err("name must not start with a digit".to_string());
    }

    if identifier.starts_with(INTERNAL_PREFIX) {
        return Err(format!("names starting with '{}' are reserved", INTERNAL_PREFIX));
    }

    if is_reserved_word(identifier) {
        return Err(format!("'{}' is a reserved SQL word", identifier));
    }

    Ok(())
}
