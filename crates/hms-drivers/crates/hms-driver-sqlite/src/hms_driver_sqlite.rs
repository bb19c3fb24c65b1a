//! SQLite backend implementation

mod connection;
mod dialect;
mod driver;

pub use connection::{SqliteConnection, SqliteTransaction};
pub use dialect::sqlite_dialect;
pub use driver::SqliteDriver;
