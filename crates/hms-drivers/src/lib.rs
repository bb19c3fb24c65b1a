//! HMS Drivers - backend implementations
//!
//! This crate re-exports the concrete backends behind the traits defined in
//! `hms-core` and offers a registry to look them up by name.

#[cfg(feature = "sqlite")]
pub use hms_driver_sqlite as sqlite;

mod registry;

pub use registry::{DriverRegistry, get_dialect_info};

/// Re-export commonly used types from hms-core
pub use hms_core::{
    ColumnMeta, Connection, ConnectionConfig, DatabaseDriver, DialectInfo, HmsError, QueryResult,
    Result, Row, SchemaIntrospection, StatementResult, Transaction, Value,
};
