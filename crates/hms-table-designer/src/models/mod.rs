//! Models for table definitions
//!
//! Core data structures for representing an operator-designed table and its
//! typed columns.

mod column_design;
mod data_types;
mod table_design;
mod validation;

pub use column_design::{Column, ROW_ID_COLUMN};
pub use data_types::ColumnType;
pub use table_design::{MAX_COLUMNS, TableDefinition};
pub use validation::{DesignError, DesignResult};
