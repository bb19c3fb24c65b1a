use hms_table_designer::DesignError;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Which part of an operation touched the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Schema statements and live-schema probes
    Ddl,
    /// Reads and writes of the catalog relation
    Catalog,
    /// Row reads and writes on a managed table
    Row,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Step::Ddl => "ddl",
            Step::Catalog => "catalog",
            Step::Row => "row",
        })
    }
}

/// Stable classification of a [`ServiceError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidIdentifier,
    InvalidColumn,
    MultiplePrimaryKeys,
    TableAlreadyExists,
    SchemaExecution,
    CatalogDesync,
    RowNotFound,
    DuplicateKey,
    BackendTimeout,
    BackendUnavailable,
    InvalidDefinition,
    InvalidValue,
    TableNotFound,
    Catalog,
    RowOperation,
    InvalidTransition,
}

/// Engine errors with messages an operator can act on
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Design(#[from] DesignError),

    #[error("Invalid value for column '{column}': {reason}")]
    InvalidValue { column: String, reason: String },

    #[error("Table '{name}' already exists")]
    TableAlreadyExists { name: String },

    #[error("Table '{name}' not found")]
    TableNotFound { name: String },

    #[error("{operation} failed during ddl: {message}")]
    SchemaExecution {
        operation: &'static str,
        message: String,
    },

    #[error("{operation} left table '{table}' out of step with the catalog: {detail}")]
    CatalogDesync {
        operation: &'static str,
        table: String,
        detail: String,
    },

    #[error("{operation} failed during catalog: {message}")]
    Catalog {
        operation: &'static str,
        message: String,
    },

    #[error("Row {id} not found in '{table}'")]
    RowNotFound { table: String, id: i64 },

    #[error("Row id {id} matched {matched} rows in '{table}', changes rolled back")]
    DuplicateKey { table: String, id: i64, matched: u64 },

    #[error("{operation} failed during row: {message}")]
    RowOperation {
        operation: &'static str,
        message: String,
    },

    #[error("{operation} timed out during {step} after {}ms", timeout.as_millis())]
    BackendTimeout {
        operation: &'static str,
        step: Step,
        timeout: Duration,
    },

    #[error("{operation} failed during {step}, backend unavailable: {message}")]
    BackendUnavailable {
        operation: &'static str,
        step: Step,
        message: String,
    },

    #[error("Cannot {action} while {state}")]
    InvalidTransition { action: &'static str, state: String },
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::Design(e) => match e {
                DesignError::InvalidIdentifier { .. } => ErrorKind::InvalidIdentifier,
                DesignError::InvalidColumn { .. } => ErrorKind::InvalidColumn,
                DesignError::MultiplePrimaryKeys { .. } => ErrorKind::MultiplePrimaryKeys,
                DesignError::InvalidDefinition(_) => ErrorKind::InvalidDefinition,
            },
            ServiceError::InvalidValue { .. } => ErrorKind::InvalidValue,
            ServiceError::TableAlreadyExists { .. } => ErrorKind::TableAlreadyExists,
            ServiceError::TableNotFound { .. } => ErrorKind::TableNotFound,
            ServiceError::SchemaExecution { .. } => ErrorKind::SchemaExecution,
            ServiceError::CatalogDesync { .. } => ErrorKind::CatalogDesync,
            ServiceError::Catalog { .. } => ErrorKind::Catalog,
            ServiceError::RowNotFound { .. } => ErrorKind::RowNotFound,
            ServiceError::DuplicateKey { .. } => ErrorKind::DuplicateKey,
            ServiceError::RowOperation { .. } => ErrorKind::RowOperation,
            ServiceError::BackendTimeout { .. } => ErrorKind::BackendTimeout,
            ServiceError::BackendUnavailable { .. } => ErrorKind::BackendUnavailable,
            ServiceError::InvalidTransition { .. } => ErrorKind::InvalidTransition,
        }
    }

    /// Errors raised before any backend call was made
    pub fn is_validation(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::InvalidIdentifier
                | ErrorKind::InvalidColumn
                | ErrorKind::MultiplePrimaryKeys
                | ErrorKind::InvalidDefinition
                | ErrorKind::InvalidValue
        )
    }

    pub(crate) fn desync(
        operation: &'static str,
        table: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        ServiceError::CatalogDesync {
            operation,
            table: table.into(),
            detail: detail.into(),
        }
    }
}
