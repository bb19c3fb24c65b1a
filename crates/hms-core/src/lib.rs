//! HMS Core - Backend abstractions for the hospital admin engine
//!
//! This crate provides the fundamental traits and types that the rest of the
//! workspace depends on. It defines:
//!
//! - `DatabaseDriver` - Trait for backend driver implementations
//! - `Connection` - Trait for backend connections
//! - `SchemaIntrospection` - Trait for live-schema inspection
//! - `DialectInfo` - SQL dialect metadata (keywords, quoting, auto-increment)
//! - Common types like `Value`, `Row`, `QueryResult`, etc.

mod connection;
mod dialect;
mod driver;
mod error;
mod schema;
mod types;

pub use connection::*;
pub use dialect::*;
pub use driver::*;
pub use error::*;
pub use schema::*;
pub use types::*;
