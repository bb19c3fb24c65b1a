//! HMS Services Layer
//!
//! This crate provides the administration engine that sits between a front
//! end (the `hms-admin` CLI, or any other caller) and the backend.
//!
//! # Architecture
//!
//! ```text
//! Caller (hms-cli)
//!     ↓
//! AdminSession (workflow state machine)
//!     ↓
//! AdminService ← catalog + schema executor + row repository
//!     ↓
//! Domain Layer (hms-table-designer)
//!     ↓
//! Infrastructure Layer (hms-core, hms-drivers)
//! ```
//!
//! # Services
//!
//! - [`AdminService`] - Table lifecycle, kept in step with the catalog
//! - [`RowService`] - Generic CRUD on managed tables
//! - [`CatalogStore`] - Persisted table definitions
//! - [`SchemaExecutor`] - DDL execution against the live schema
//! - [`AdminSession`] - Operator workflow with explicit states
//!
//! # Design Principles
//!
//! 1. **Validate first** - Definition errors never reach the backend
//! 2. **Bounded calls** - Every backend call runs under a timeout
//! 3. **No silent drift** - Catalog and live schema disagreements are reported
//! 4. **Re-fetch after writes** - Displayed rows always come from the backend

mod admin_service;
mod backend;
mod catalog;
mod config;
mod error;
mod row_service;
mod schema_executor;
mod view_models;
mod workflow;

pub use admin_service::{AdminOptions, AdminService};
pub use backend::{Backend, DEFAULT_TIMEOUT};
pub use catalog::{CatalogEntry, CatalogStore, DEFAULT_CATALOG_TABLE};
pub use config::{AdminConfig, BackendSettings, CatalogSettings, LoggingSettings};
pub use error::{ErrorKind, ServiceError, ServiceResult, Step};
pub use row_service::{RowService, RowValues};
pub use schema_executor::SchemaExecutor;
pub use view_models::{DriftReport, TableSummary, UncatalogedRelation};
pub use workflow::{AdminSession, AdminState};

// Re-export definition types so callers need only this crate
pub use hms_table_designer::{Column, ColumnType, DesignError, TableDefinition, sanitize};
