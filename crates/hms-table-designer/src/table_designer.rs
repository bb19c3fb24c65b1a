//! Table definitions for the HMS administration engine
//!
//! Operators describe tables by display name, description and a small set of
//! typed columns. This crate turns those descriptions into safe identifiers
//! and schema-mutating statements.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use hms_table_designer::{Column, ColumnType, DdlGenerator, TableDefinition};
//!
//! let definition = TableDefinition::new("Patient Records")
//!     .with_column(Column::new("Full Name", ColumnType::Text).primary())
//!     .with_column(Column::new("Admitted", ColumnType::Date));
//!
//! let ddl = DdlGenerator::new(dialect).create_table(&definition)?;
//! ```

pub mod identifier;
pub mod models;
pub mod service;

pub use identifier::{MAX_IDENTIFIER_LEN, is_reserved_word, sanitize, validate_identifier};
pub use models::{
    Column, ColumnType, DesignError, DesignResult, MAX_COLUMNS, ROW_ID_COLUMN, TableDefinition,
};
pub use service::{DdlGenerator, TableLoader};
