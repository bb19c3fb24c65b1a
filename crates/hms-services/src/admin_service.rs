//! Administration service
//!
//! Table lifecycle operations that keep the catalog and the live schema in
//! step. Creation and deletion are two-phase (DDL, then catalog) and every
//! disagreement between the two is reported as `CatalogDesync` instead of
//! being papered over.

use hms_core::{Connection, DialectInfo, Row};
use hms_table_designer::{Column, DesignError, TableDefinition, TableLoader, sanitize};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use crate::backend::{Backend, DEFAULT_TIMEOUT};
use crate::catalog::{CatalogEntry, CatalogStore, DEFAULT_CATALOG_TABLE};
use crate::error::{ServiceError, ServiceResult};
use crate::row_service::{RowService, RowValues};
use crate::schema_executor::SchemaExecutor;
use crate::view_models::{DriftReport, UncatalogedRelation};

/// Settings for an [`AdminService`]
#[derive(Debug, Clone)]
pub struct AdminOptions {
    /// Relation holding the catalog; reserved for managed tables
    pub catalog_table: String,
    /// Budget for each backend call
    pub timeout: Duration,
}

impl Default for AdminOptions {
    fn default() -> Self {
        Self {
            catalog_table: DEFAULT_CATALOG_TABLE.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Service for managed table administration
///
/// Handles:
/// - Creating and deleting tables together with their catalog entries
/// - Column-set edits on existing tables
/// - Drift checks between catalog and live schema
/// - Row operations addressed by table name
pub struct AdminService {
    backend: Arc<Backend>,
    catalog: CatalogStore,
    schema: SchemaExecutor,
    rows: RowService,
}

impl AdminService {
    /// Open the service over a connection, creating the catalog relation if needed
    #[tracing::instrument(skip(connection, dialect, options), fields(driver = %connection.driver_name()))]
    pub async fn open(
        connection: Arc<dyn Connection>,
        dialect: DialectInfo,
        options: AdminOptions,
    ) -> ServiceResult<Self> {
        let backend = Arc::new(Backend::new(connection, dialect, options.timeout));
        let catalog = CatalogStore::new(backend.clone(), &options.catalog_table)?;
        catalog.ensure_schema().await?;

        tracing::info!(
            catalog = %options.catalog_table,
            timeout_ms = options.timeout.as_millis() as u64,
            "admin service ready"
        );

        Ok(Self {
            schema: SchemaExecutor::new(backend.clone()),
            rows: RowService::new(backend.clone()),
            backend,
            catalog,
        })
    }

    pub fn backend(&self) -> &Arc<Backend> {
        &self.backend
    }

    pub fn catalog(&self) -> &CatalogStore {
        &self.catalog
    }

    pub fn rows(&self) -> &RowService {
        &self.rows
    }

    /// Catalog entries in insertion order
    #[tracing::instrument(skip(self))]
    pub async fn list_tables(&self) -> ServiceResult<Vec<CatalogEntry>> {
        self.catalog.list("list_tables").await
    }

    /// Look up a managed table by display or sanitized name
    #[tracing::instrument(skip(self))]
    pub async fn get_table(&self, name: &str) -> ServiceResult<CatalogEntry> {
        self.entry("get_table", name).await
    }

    /// The CREATE TABLE statement `create_table` would run for this definition
    pub fn preview_create_table(&self, definition: &TableDefinition) -> ServiceResult<String> {
        definition.validate()?;
        let sanitized = definition.sanitized_name()?;
        self.ensure_not_catalog(&definition.name, &sanitized)?;
        self.schema.preview_create(definition)
    }

    /// Create a managed table: validate, check catalog and live schema, run
    /// DDL, then record the definition in the catalog.
    #[tracing::instrument(skip(self, definition), fields(table = %definition.name))]
    pub async fn create_table(&self, definition: &TableDefinition) -> ServiceResult<CatalogEntry> {
        const OP: &str = "create_table";

        // Rejects dialect keywords too, so nothing below runs for a bad definition
        self.preview_create_table(definition)?;
        let sanitized = definition.sanitized_name()?;

        if self.catalog.get(OP, &sanitized).await?.is_some() {
            return Err(ServiceError::TableAlreadyExists {
                name: definition.name.clone(),
            });
        }
        if self.schema.relation_exists(OP, &sanitized).await? {
            tracing::warn!(table = %sanitized, "relation exists without a catalog entry");
            return Err(ServiceError::desync(
                OP,
                sanitized,
                "a relation with this name exists in the live schema but has no catalog entry",
            ));
        }

        self.schema.create_relation(OP, definition).await?;

        match self.catalog.insert(OP, definition).await {
            Ok(entry) => {
                tracing::info!(table = %entry.sanitized_name, columns = definition.columns.len(), "table created");
                Ok(entry)
            }
            Err(e) => {
                tracing::error!(table = %sanitized, error = %e, "relation created but catalog entry not written");
                Err(ServiceError::desync(
                    OP,
                    sanitized,
                    format!("relation was created but the catalog entry was not written: {}", e),
                ))
            }
        }
    }

    /// Drop a managed table and remove its catalog entry
    #[tracing::instrument(skip(self))]
    pub async fn delete_table(&self, name: &str) -> ServiceResult<()> {
        const OP: &str = "delete_table";

        let sanitized = sanitize(name)?;
        self.ensure_not_catalog(name, &sanitized)?;

        let entry = self.catalog.get(OP, &sanitized).await?;
        let live = self.schema.relation_exists(OP, &sanitized).await?;
        match (entry.is_some(), live) {
            (false, false) => {
                return Err(ServiceError::TableNotFound {
                    name: name.to_string(),
                });
            }
            (false, true) => {
                tracing::warn!(table = %sanitized, "relation exists without a catalog entry");
                return Err(ServiceError::desync(
                    OP,
                    sanitized,
                    "the relation exists but has no catalog entry",
                ));
            }
            (true, false) => {
                tracing::warn!(table = %sanitized, "catalog entry without a relation");
                return Err(ServiceError::desync(
                    OP,
                    sanitized,
                    "the catalog entry exists but the relation is missing from the live schema",
                ));
            }
            (true, true) => {}
        }

        self.schema.drop_relation(OP, &sanitized).await?;

        match self.catalog.delete(OP, &sanitized).await {
            Ok(true) => {
                tracing::info!(table = %sanitized, "table deleted");
                Ok(())
            }
            Ok(false) => Err(ServiceError::desync(
                OP,
                sanitized,
                "relation was dropped but its catalog entry had already been removed",
            )),
            Err(e) => {
                tracing::error!(table = %sanitized, error = %e, "relation dropped but catalog entry not removed");
                Err(ServiceError::desync(
                    OP,
                    sanitized,
                    format!("relation was dropped but the catalog entry was not removed: {}", e),
                ))
            }
        }
    }

    /// Add a non-primary column to a managed table
    #[tracing::instrument(skip(self, column), fields(column = %column.name))]
    pub async fn add_column(&self, table: &str, column: &Column) -> ServiceResult<CatalogEntry> {
        const OP: &str = "add_column";

        column.validate()?;
        if column.is_primary {
            return Err(DesignError::column(
                column.name.clone(),
                "a primary column cannot be added to an existing table",
            )
            .into());
        }

        let entry = self.managed(OP, table).await?;
        let mut updated = entry.definition.clone();
        updated.columns.push(column.clone());
        updated.validate()?;

        self.schema
            .add_column(OP, &entry.sanitized_name, column)
            .await?;
        self.commit_columns(OP, entry, updated.columns).await
    }

    /// Drop a column from a managed table
    #[tracing::instrument(skip(self))]
    pub async fn drop_column(&self, table: &str, column: &str) -> ServiceResult<CatalogEntry> {
        const OP: &str = "drop_column";

        let entry = self.managed(OP, table).await?;
        let index = column_position(&entry, column)?;
        let target = &entry.definition.columns[index];

        if target.is_primary {
            return Err(DesignError::column(
                target.name.clone(),
                "the primary column cannot be dropped",
            )
            .into());
        }
        if entry.definition.columns.len() == 1 {
            return Err(DesignError::InvalidDefinition(format!(
                "'{}' is the only column of '{}'",
                target.name, entry.definition.name
            ))
            .into());
        }

        let sanitized_column = target.sanitized_name()?;
        self.schema
            .drop_column(OP, &entry.sanitized_name, &sanitized_column)
            .await?;

        let mut columns = entry.definition.columns.clone();
        columns.remove(index);
        self.commit_columns(OP, entry, columns).await
    }

    /// Rename a column of a managed table
    ///
    /// When only the display name changes (same sanitized identifier) no DDL
    /// is issued and just the catalog is updated.
    #[tracing::instrument(skip(self))]
    pub async fn rename_column(
        &self,
        table: &str,
        from: &str,
        to: &str,
    ) -> ServiceResult<CatalogEntry> {
        const OP: &str = "rename_column";

        let entry = self.managed(OP, table).await?;
        let index = column_position(&entry, from)?;

        let mut updated = entry.definition.clone();
        let old_name = updated.columns[index].sanitized_name()?;
        updated.columns[index].name = to.to_string();
        updated.validate()?;
        let new_name = updated.columns[index].sanitized_name()?;

        if old_name != new_name {
            self.schema
                .rename_column(OP, &entry.sanitized_name, &old_name, &new_name)
                .await?;
        }
        self.commit_columns(OP, entry, updated.columns).await
    }

    /// Compare the catalog with the live schema
    #[tracing::instrument(skip(self))]
    pub async fn check_consistency(&self) -> ServiceResult<DriftReport> {
        const OP: &str = "check_consistency";

        let entries = self.catalog.list(OP).await?;
        let relations = self.backend.list_relations(OP).await?;

        // Identifiers compare case-insensitively in the store
        let live: HashSet<String> = relations.iter().map(|r| r.name.to_lowercase()).collect();
        let known: HashSet<&str> = entries.iter().map(|e| e.sanitized_name.as_str()).collect();

        let mut report = DriftReport {
            missing_relations: entries
                .iter()
                .filter(|e| !live.contains(e.sanitized_name.as_str()))
                .map(|e| e.sanitized_name.clone())
                .collect(),
            uncataloged_relations: Vec::new(),
        };

        for relation in &relations {
            let folded = relation.name.to_lowercase();
            if folded == self.catalog.table_name() || known.contains(folded.as_str()) {
                continue;
            }
            report.uncataloged_relations.push(UncatalogedRelation {
                name: relation.name.clone(),
                row_count: relation.row_count,
                definition: self.describe_relation(&relation.name).await,
            });
        }

        if report.is_consistent() {
            tracing::debug!(tables = entries.len(), "catalog matches live schema");
        } else {
            tracing::warn!(
                missing = report.missing_relations.len(),
                uncataloged = report.uncataloged_relations.len(),
                "catalog drift detected"
            );
        }
        Ok(report)
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_rows(&self, table: &str) -> ServiceResult<Vec<Row>> {
        let entry = self.managed("list_rows", table).await?;
        self.rows.list_rows(&entry.definition).await
    }

    #[tracing::instrument(skip(self, values))]
    pub async fn insert_row(&self, table: &str, values: &RowValues) -> ServiceResult<i64> {
        let entry = self.managed("insert_row", table).await?;
        self.rows.insert_row(&entry.definition, values).await
    }

    #[tracing::instrument(skip(self, values))]
    pub async fn update_row(&self, table: &str, id: i64, values: &RowValues) -> ServiceResult<()> {
        let entry = self.managed("update_row", table).await?;
        self.rows.update_row(&entry.definition, id, values).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_row(&self, table: &str, id: i64) -> ServiceResult<()> {
        let entry = self.managed("delete_row", table).await?;
        self.rows.delete_row(&entry.definition, id).await
    }

    /// Catalog entry for a name, or `TableNotFound`
    async fn entry(&self, operation: &'static str, name: &str) -> ServiceResult<CatalogEntry> {
        let sanitized = sanitize(name)?;
        self.catalog
            .get(operation, &sanitized)
            .await?
            .ok_or_else(|| ServiceError::TableNotFound {
                name: name.to_string(),
            })
    }

    /// Catalog entry whose relation is also present in the live schema
    pub(crate) async fn managed(&self, operation: &'static str, name: &str) -> ServiceResult<CatalogEntry> {
        let entry = self.entry(operation, name).await?;
        if !self
            .schema
            .relation_exists(operation, &entry.sanitized_name)
            .await?
        {
            tracing::warn!(table = %entry.sanitized_name, "catalog entry without a relation");
            return Err(ServiceError::desync(
                operation,
                entry.sanitized_name,
                "the catalog entry exists but the relation is missing from the live schema",
            ));
        }
        Ok(entry)
    }

    /// Record a column list after its DDL has been applied
    async fn commit_columns(
        &self,
        operation: &'static str,
        mut entry: CatalogEntry,
        columns: Vec<Column>,
    ) -> ServiceResult<CatalogEntry> {
        if let Err(e) = self
            .catalog
            .update_columns(operation, &entry.sanitized_name, &columns)
            .await
        {
            tracing::error!(table = %entry.sanitized_name, error = %e, "schema changed but catalog not updated");
            return Err(ServiceError::desync(
                operation,
                entry.sanitized_name,
                format!("the schema was changed but the catalog column list was not updated: {}", e),
            ));
        }

        entry.definition.columns = columns;
        tracing::info!(table = %entry.sanitized_name, columns = entry.definition.columns.len(), "columns updated");
        Ok(entry)
    }

    /// Best-effort definition for a relation outside the catalog
    async fn describe_relation(&self, name: &str) -> Option<TableDefinition> {
        let load = TableLoader::load_definition(self.backend.connection().as_ref(), name);
        match tokio::time::timeout(self.backend.timeout(), load).await {
            Ok(Ok(definition)) => Some(definition),
            Ok(Err(e)) => {
                tracing::warn!(table = %name, error = %e, "could not describe uncataloged relation");
                None
            }
            Err(_) => {
                tracing::warn!(table = %name, "describing uncataloged relation timed out");
                None
            }
        }
    }

    fn ensure_not_catalog(&self, name: &str, sanitized: &str) -> ServiceResult<()> {
        if sanitized == self.catalog.table_name() {
            return Err(DesignError::InvalidIdentifier {
                name: name.to_string(),
                reason: format!("'{}' is reserved for the table catalog", sanitized),
            }
            .into());
        }
        Ok(())
    }
}

fn column_position(entry: &CatalogEntry, column: &str) -> ServiceResult<usize> {
    entry.definition.column_index(column).ok_or_else(|| {
        DesignError::column(
            column.to_string(),
            format!("not a column of '{}'", entry.definition.name),
        )
        .into()
    })
}
