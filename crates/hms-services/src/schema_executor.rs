//! Schema executor
//!
//! Turns definitions into DDL through the dialect-aware generator and runs
//! it. Validation and quoting happen before anything is sent.

use hms_table_designer::{Column, TableDefinition};
use std::sync::Arc;

use crate::backend::Backend;
use crate::error::{ServiceResult, Step};

/// Executes schema changes against the live store
pub struct SchemaExecutor {
    backend: Arc<Backend>,
}

impl SchemaExecutor {
    pub fn new(backend: Arc<Backend>) -> Self {
        Self { backend }
    }

    /// The CREATE TABLE statement that `create_relation` would run
    pub fn preview_create(&self, definition: &TableDefinition) -> ServiceResult<String> {
        Ok(self.backend.generator().create_table(definition)?)
    }

    /// Create the relation for a definition
    #[tracing::instrument(skip(self, definition), fields(table = %definition.name))]
    pub async fn create_relation(
        &self,
        operation: &'static str,
        definition: &TableDefinition,
    ) -> ServiceResult<()> {
        let ddl = self.preview_create(definition)?;
        self.run(operation, &ddl).await
    }

    /// Drop a relation by sanitized name
    #[tracing::instrument(skip(self))]
    pub async fn drop_relation(&self, operation: &'static str, sanitized_name: &str) -> ServiceResult<()> {
        let ddl = self.backend.generator().drop_table(sanitized_name)?;
        self.run(operation, &ddl).await
    }

    #[tracing::instrument(skip(self, column), fields(column = %column.name))]
    pub async fn add_column(
        &self,
        operation: &'static str,
        sanitized_name: &str,
        column: &Column,
    ) -> ServiceResult<()> {
        let ddl = self.backend.generator().add_column(sanitized_name, column)?;
        self.run(operation, &ddl).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn drop_column(
        &self,
        operation: &'static str,
        sanitized_name: &str,
        column: &str,
    ) -> ServiceResult<()> {
        let ddl = self.backend.generator().drop_column(sanitized_name, column)?;
        self.run(operation, &ddl).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn rename_column(
        &self,
        operation: &'static str,
        sanitized_name: &str,
        from: &str,
        to: &str,
    ) -> ServiceResult<()> {
        let ddl = self
            .backend
            .generator()
            .rename_column(sanitized_name, from, to)?;
        self.run(operation, &ddl).await
    }

    /// Whether the live schema has a relation with this exact name
    pub async fn relation_exists(&self, operation: &'static str, sanitized_name: &str) -> ServiceResult<bool> {
        self.backend.relation_exists(operation, sanitized_name).await
    }

    async fn run(&self, operation: &'static str, ddl: &str) -> ServiceResult<()> {
        self.backend
            .execute(operation, Step::Ddl, ddl, &[])
            .await
            .inspect_err(|e| tracing::warn!(operation, error = %e, "DDL rejected"))?;
        Ok(())
    }
}
