//! Service layer for table definitions
//!
//! Provides DDL generation and loading definitions back from a live schema.

mod ddl_generator;
mod table_loader;

pub use ddl_generator::DdlGenerator;
pub use table_loader::TableLoader;
