//! Row operations service
//!
//! Generic CRUD against managed tables. Every table carries a store-assigned
//! `id`; updates and deletes must match exactly one row by that id.

use hms_core::{Row, StatementResult, Transaction, Value};
use hms_table_designer::{DesignError, ROW_ID_COLUMN, TableDefinition};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::backend::Backend;
use crate::error::{ServiceError, ServiceResult, Step};

/// Values for one row keyed by column name (display or sanitized)
pub type RowValues = BTreeMap<String, Value>;

/// Service for row-level operations on managed tables
pub struct RowService {
    backend: Arc<Backend>,
}

impl RowService {
    pub fn new(backend: Arc<Backend>) -> Self {
        Self { backend }
    }

    /// All rows ordered by id. An empty table yields an empty vector.
    #[tracing::instrument(skip(self, definition), fields(table = %definition.name))]
    pub async fn list_rows(&self, definition: &TableDefinition) -> ServiceResult<Vec<Row>> {
        let generator = self.backend.generator();
        let sql = format!(
            "SELECT * FROM {} ORDER BY {}",
            generator.quote(&definition.sanitized_name()?)?,
            generator.quote(ROW_ID_COLUMN)?
        );
        let result = self
            .backend
            .query("list_rows", Step::Row, &sql, &[])
            .await?;
        tracing::debug!(row_count = result.rows.len(), "rows loaded");
        Ok(result.rows)
    }

    /// Insert a row and return its store-assigned id.
    ///
    /// Columns left out of `values` take their declared default, or NULL when
    /// none is declared.
    #[tracing::instrument(skip(self, definition, values), fields(table = %definition.name))]
    pub async fn insert_row(
        &self,
        definition: &TableDefinition,
        values: &RowValues,
    ) -> ServiceResult<i64> {
        let mut supplied = self.resolve(definition, values)?;
        let generator = self.backend.generator();

        let mut columns = Vec::with_capacity(definition.columns.len());
        let mut params = Vec::with_capacity(definition.columns.len());
        for column in &definition.columns {
            let name = column.sanitized_name()?;
            let value = match supplied.remove(&name) {
                Some(value) => value,
                None => column.default_as_value()?.unwrap_or(Value::Null),
            };
            if column.is_primary && value.is_null() {
                return Err(ServiceError::InvalidValue {
                    column: column.name.clone(),
                    reason: "the primary column requires a value".into(),
                });
            }
            columns.push(generator.quote(&name)?);
            params.push(value);
        }

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            generator.quote(&definition.sanitized_name()?)?,
            columns.join(", "),
            vec!["?"; params.len()].join(", ")
        );

        let result = self
            .backend
            .execute("insert_row", Step::Row, &sql, &params)
            .await?;
        let id = result
            .last_insert_id
            .ok_or_else(|| ServiceError::RowOperation {
                operation: "insert_row",
                message: "backend did not report the new row id".into(),
            })?;

        tracing::info!(row_id = id, "row inserted");
        Ok(id)
    }

    /// Update the supplied columns of the row with this id
    #[tracing::instrument(skip(self, definition, values), fields(table = %definition.name))]
    pub async fn update_row(
        &self,
        definition: &TableDefinition,
        id: i64,
        values: &RowValues,
    ) -> ServiceResult<()> {
        if values.is_empty() {
            return Err(ServiceError::InvalidValue {
                column: ROW_ID_COLUMN.into(),
                reason: "an update needs at least one column value".into(),
            });
        }
        let supplied = self.resolve(definition, values)?;
        let generator = self.backend.generator();

        let mut assignments = Vec::with_capacity(supplied.len());
        let mut params = Vec::with_capacity(supplied.len() + 1);
        for (name, value) in supplied {
            assignments.push(format!("{} = ?", generator.quote(&name)?));
            params.push(value);
        }
        params.push(Value::Int64(id));

        let table = definition.sanitized_name()?;
        let sql = format!(
            "UPDATE {} SET {} WHERE {} = ?",
            generator.quote(&table)?,
            assignments.join(", "),
            generator.quote(ROW_ID_COLUMN)?
        );

        self.execute_matching_one("update_row", &table, id, &sql, &params)
            .await?;
        tracing::info!(row_id = id, "row updated");
        Ok(())
    }

    /// Delete the row with this id
    #[tracing::instrument(skip(self, definition), fields(table = %definition.name))]
    pub async fn delete_row(&self, definition: &TableDefinition, id: i64) -> ServiceResult<()> {
        let generator = self.backend.generator();
        let table = definition.sanitized_name()?;
        let sql = format!(
            "DELETE FROM {} WHERE {} = ?",
            generator.quote(&table)?,
            generator.quote(ROW_ID_COLUMN)?
        );

        self.execute_matching_one("delete_row", &table, id, &sql, &[Value::Int64(id)])
            .await?;
        tracing::info!(row_id = id, "row deleted");
        Ok(())
    }

    /// Run a statement in a transaction and commit only if it touched one row
    async fn execute_matching_one(
        &self,
        operation: &'static str,
        table: &str,
        id: i64,
        sql: &str,
        params: &[Value],
    ) -> ServiceResult<()> {
        let tx = self.backend.begin(operation, Step::Row).await?;

        let outcome: ServiceResult<StatementResult> = self
            .backend
            .guard(operation, Step::Row, tx.execute(sql, params))
            .await;

        let failure = match outcome {
            Ok(result) if result.affected_rows == 1 => {
                return self
                    .backend
                    .guard(operation, Step::Row, tx.commit())
                    .await;
            }
            Ok(result) if result.affected_rows == 0 => ServiceError::RowNotFound {
                table: table.to_string(),
                id,
            },
            Ok(result) => {
                tracing::error!(row_id = id, matched = result.affected_rows, "row id matched more than one row");
                ServiceError::DuplicateKey {
                    table: table.to_string(),
                    id,
                    matched: result.affected_rows,
                }
            }
            Err(e) => e,
        };

        self.rollback(operation, tx).await;
        Err(failure)
    }

    async fn rollback(&self, operation: &'static str, tx: Box<dyn Transaction>) {
        if let Err(e) = self
            .backend
            .guard(operation, Step::Row, tx.rollback())
            .await
        {
            tracing::error!(operation, error = %e, "rollback failed");
        }
    }

    /// Map supplied keys onto declared columns and coerce each value
    fn resolve(
        &self,
        definition: &TableDefinition,
        values: &RowValues,
    ) -> ServiceResult<BTreeMap<String, Value>> {
        let mut resolved = BTreeMap::new();
        for (key, value) in values {
            if key.trim().eq_ignore_ascii_case(ROW_ID_COLUMN) {
                return Err(DesignError::column(
                    key.clone(),
                    "'id' is assigned by the store and cannot be written",
                )
                .into());
            }

            let column = definition.column(key).ok_or_else(|| {
                DesignError::column(
                    key.clone(),
                    format!("not a column of '{}'", definition.name),
                )
            })?;
            let name = column.sanitized_name()?;

            let coerced =
                column
                    .column_type
                    .coerce(value)
                    .ok_or_else(|| ServiceError::InvalidValue {
                        column: column.name.clone(),
                        reason: format!("'{}' is not a valid {}", value, column.column_type),
                    })?;
            if column.is_primary && coerced.is_null() {
                return Err(ServiceError::InvalidValue {
                    column: column.name.clone(),
                    reason: "the primary column requires a value".into(),
                });
            }

            if resolved.insert(name.clone(), coerced).is_some() {
                return Err(DesignError::column(
                    key.clone(),
                    format!("'{}' was supplied more than once", name),
                )
                .into());
            }
        }
        Ok(resolved)
    }
}
