//! Bounded access to the backend
//!
//! Every backend call made by the engine goes through [`Backend::guard`],
//! which applies the per-call timeout and maps driver errors onto the
//! service taxonomy with the originating operation and step attached.

use hms_core::{
    Connection, DialectInfo, HmsError, QueryResult, StatementResult, TableInfo, Transaction, Value,
};
use hms_table_designer::DdlGenerator;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{ServiceError, ServiceResult, Step};

/// Per-call budget used when none is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// A connection plus the dialect and timeout every call is made with
pub struct Backend {
    connection: Arc<dyn Connection>,
    generator: DdlGenerator,
    timeout: Duration,
}

impl Backend {
    pub fn new(connection: Arc<dyn Connection>, dialect: DialectInfo, timeout: Duration) -> Self {
        Self {
            connection,
            generator: DdlGenerator::new(dialect),
            timeout,
        }
    }

    pub fn connection(&self) -> &Arc<dyn Connection> {
        &self.connection
    }

    pub fn generator(&self) -> &DdlGenerator {
        &self.generator
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run one backend call under the configured timeout
    pub async fn guard<T, F>(&self, operation: &'static str, step: Step, call: F) -> ServiceResult<T>
    where
        F: Future<Output = hms_core::Result<T>>,
    {
        if self.connection.is_closed() {
            return Err(ServiceError::BackendUnavailable {
                operation,
                step,
                message: "connection is closed".into(),
            });
        }

        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result.map_err(|e| map_backend_error(operation, step, self.timeout, e)),
            Err(_) => {
                tracing::warn!(operation, %step, timeout_ms = self.timeout.as_millis() as u64, "backend call timed out");
                Err(ServiceError::BackendTimeout {
                    operation,
                    step,
                    timeout: self.timeout,
                })
            }
        }
    }

    pub async fn execute(
        &self,
        operation: &'static str,
        step: Step,
        sql: &str,
        params: &[Value],
    ) -> ServiceResult<StatementResult> {
        tracing::debug!(operation, %step, sql = %sql, "executing statement");
        self.guard(operation, step, self.connection.execute(sql, params))
            .await
    }

    pub async fn query(
        &self,
        operation: &'static str,
        step: Step,
        sql: &str,
        params: &[Value],
    ) -> ServiceResult<QueryResult> {
        tracing::debug!(operation, %step, sql = %sql, "running query");
        self.guard(operation, step, self.connection.query(sql, params))
            .await
    }

    pub async fn begin(
        &self,
        operation: &'static str,
        step: Step,
    ) -> ServiceResult<Box<dyn Transaction>> {
        self.guard(operation, step, self.connection.begin_transaction())
            .await
    }

    /// Live-schema probe for one relation
    pub async fn relation_exists(&self, operation: &'static str, name: &str) -> ServiceResult<bool> {
        let introspection = self.introspection(operation)?;
        self.guard(operation, Step::Ddl, introspection.table_exists(name))
            .await
    }

    /// All relations in the live schema
    pub async fn list_relations(&self, operation: &'static str) -> ServiceResult<Vec<TableInfo>> {
        let introspection = self.introspection(operation)?;
        self.guard(operation, Step::Ddl, introspection.list_tables())
            .await
    }

    fn introspection(
        &self,
        operation: &'static str,
    ) -> ServiceResult<&dyn hms_core::SchemaIntrospection> {
        self.connection
            .as_schema_introspection()
            .ok_or_else(|| ServiceError::SchemaExecution {
                operation,
                message: format!(
                    "schema introspection is not supported by the {} driver",
                    self.connection.driver_name()
                ),
            })
    }
}

/// Wrap a driver error with the operation and step it came from
pub(crate) fn map_backend_error(
    operation: &'static str,
    step: Step,
    timeout: Duration,
    err: HmsError,
) -> ServiceError {
    if err.is_unavailable() {
        tracing::error!(operation, %step, error = %err, "backend unavailable");
        return ServiceError::BackendUnavailable {
            operation,
            step,
            message: err.to_string(),
        };
    }

    let message = err.to_string();
    match (err, step) {
        (HmsError::Timeout(_), _) => ServiceError::BackendTimeout {
            operation,
            step,
            timeout,
        },
        (_, Step::Ddl) => ServiceError::SchemaExecution { operation, message },
        (_, Step::Catalog) => ServiceError::Catalog { operation, message },
        (_, Step::Row) => ServiceError::RowOperation { operation, message },
    }
}
