//! Administration workflow
//!
//! An [`AdminSession`] owns everything an operator has on screen: the table
//! list, the selected table, its loaded rows and the open form, if any.
//! Actions are only accepted in the states where they make sense; anything
//! else is an `InvalidTransition` and touches nothing. Once a mutation has
//! been committed it is reported as done even if the follow-up reload fails.
//!
//! ```text
//! Browsing --select_table--> TableSelected
//! Browsing --begin_create_table--> CreatingTable --submit/cancel--> Browsing
//! TableSelected --begin_insert_row--> InsertingRow --submit/cancel--> TableSelected
//! TableSelected --begin_edit_row--> EditingRow --submit/cancel--> TableSelected
//! TableSelected --remove_row--> TableSelected
//! TableSelected --request_delete_table--> ConfirmingDelete --confirm--> Browsing
//! ConfirmingDelete --cancel--> TableSelected
//! ```

use hms_core::Row;
use hms_table_designer::TableDefinition;
use std::fmt;
use std::sync::Arc;

use crate::admin_service::AdminService;
use crate::catalog::CatalogEntry;
use crate::error::{ServiceError, ServiceResult};
use crate::row_service::RowValues;
use crate::view_models::TableSummary;

/// Where the operator is in the workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminState {
    /// No table selected
    Browsing,
    /// A table is selected and its rows are loaded
    TableSelected,
    /// The create-table form is open
    CreatingTable,
    /// The new-row form is open
    InsertingRow,
    /// The edit form for one row is open
    EditingRow { row_id: i64 },
    /// Waiting for the operator to confirm dropping the selected table
    ConfirmingDelete,
}

impl AdminState {
    /// Whether a form or confirmation is open
    pub fn is_modal(&self) -> bool {
        !matches!(self, AdminState::Browsing | AdminState::TableSelected)
    }
}

impl fmt::Display for AdminState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdminState::Browsing => f.write_str("browsing"),
            AdminState::TableSelected => f.write_str("a table is selected"),
            AdminState::CreatingTable => f.write_str("creating a table"),
            AdminState::InsertingRow => f.write_str("inserting a row"),
            AdminState::EditingRow { row_id } => write!(f, "editing row {}", row_id),
            AdminState::ConfirmingDelete => f.write_str("confirming a table delete"),
        }
    }
}

/// One operator's session over an [`AdminService`]
pub struct AdminSession {
    service: Arc<AdminService>,
    state: AdminState,
    tables: Vec<TableSummary>,
    selected: Option<CatalogEntry>,
    rows: Vec<Row>,
}

impl AdminSession {
    pub fn new(service: Arc<AdminService>) -> Self {
        Self {
            service,
            state: AdminState::Browsing,
            tables: Vec::new(),
            selected: None,
            rows: Vec::new(),
        }
    }

    pub fn state(&self) -> AdminState {
        self.state
    }

    pub fn tables(&self) -> &[TableSummary] {
        &self.tables
    }

    pub fn selected(&self) -> Option<&CatalogEntry> {
        self.selected.as_ref()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Reload the table list. Not allowed while a form is open.
    pub async fn refresh_tables(&mut self) -> ServiceResult<&[TableSummary]> {
        if self.state.is_modal() {
            return Err(self.illegal("refresh the table list"));
        }
        self.reload_tables().await?;
        Ok(&self.tables)
    }

    /// Select a table and load its rows
    #[tracing::instrument(skip(self), fields(state = %self.state))]
    pub async fn select_table(&mut self, name: &str) -> ServiceResult<()> {
        self.require_state(&[AdminState::Browsing, AdminState::TableSelected], "select a table")?;

        let entry = self.service.managed("select_table", name).await?;
        let rows = self.service.rows().list_rows(&entry.definition).await?;

        self.selected = Some(entry);
        self.rows = rows;
        self.state = AdminState::TableSelected;
        Ok(())
    }

    /// Return to browsing with nothing selected
    pub fn deselect(&mut self) -> ServiceResult<()> {
        self.require_state(&[AdminState::TableSelected], "deselect the table")?;
        self.clear_selection();
        Ok(())
    }

    /// Reload the rows of the selected table
    pub async fn refresh_rows(&mut self) -> ServiceResult<&[Row]> {
        self.require_state(&[AdminState::TableSelected], "refresh rows")?;
        self.reload_rows().await?;
        Ok(&self.rows)
    }

    pub fn begin_create_table(&mut self) -> ServiceResult<()> {
        self.require_state(&[AdminState::Browsing], "create a table")?;
        self.state = AdminState::CreatingTable;
        Ok(())
    }

    /// Create the table and return to browsing with a fresh table list.
    ///
    /// The service checks the catalog before any DDL, so resubmitting after a
    /// partial failure reports `TableAlreadyExists` or `CatalogDesync`.
    #[tracing::instrument(skip(self, definition), fields(table = %definition.name))]
    pub async fn submit_create_table(
        &mut self,
        definition: &TableDefinition,
    ) -> ServiceResult<CatalogEntry> {
        self.require_state(&[AdminState::CreatingTable], "submit a new table")?;

        let entry = self.service.create_table(definition).await?;
        self.state = AdminState::Browsing;
        self.refresh_tables_after_commit().await;
        Ok(entry)
    }

    pub fn begin_insert_row(&mut self) -> ServiceResult<()> {
        self.require_state(&[AdminState::TableSelected], "insert a row")?;
        self.state = AdminState::InsertingRow;
        Ok(())
    }

    #[tracing::instrument(skip(self, values))]
    pub async fn submit_insert_row(&mut self, values: &RowValues) -> ServiceResult<i64> {
        self.require_state(&[AdminState::InsertingRow], "submit a new row")?;

        let table = self.selected_definition()?.name;
        let id = self.service.insert_row(&table, values).await?;
        self.state = AdminState::TableSelected;
        self.refresh_rows_after_commit().await;
        Ok(id)
    }

    /// Open the edit form for a loaded row
    pub fn begin_edit_row(&mut self, row_id: i64) -> ServiceResult<()> {
        self.require_state(&[AdminState::TableSelected], "edit a row")?;
        self.state = AdminState::EditingRow { row_id };
        Ok(())
    }

    #[tracing::instrument(skip(self, values))]
    pub async fn submit_edit_row(&mut self, values: &RowValues) -> ServiceResult<()> {
        let AdminState::EditingRow { row_id } = self.state else {
            return Err(self.illegal("submit a row edit"));
        };

        let table = self.selected_definition()?.name;
        self.service.update_row(&table, row_id, values).await?;
        self.state = AdminState::TableSelected;
        self.refresh_rows_after_commit().await;
        Ok(())
    }

    /// Delete a row of the selected table and reload the rows
    #[tracing::instrument(skip(self))]
    pub async fn remove_row(&mut self, row_id: i64) -> ServiceResult<()> {
        self.require_state(&[AdminState::TableSelected], "remove a row")?;

        let table = self.selected_definition()?.name;
        self.service.delete_row(&table, row_id).await?;
        self.refresh_rows_after_commit().await;
        Ok(())
    }

    pub fn request_delete_table(&mut self) -> ServiceResult<()> {
        self.require_state(&[AdminState::TableSelected], "delete the table")?;
        self.state = AdminState::ConfirmingDelete;
        Ok(())
    }

    /// Drop the selected table and return to browsing
    #[tracing::instrument(skip(self))]
    pub async fn confirm_delete_table(&mut self) -> ServiceResult<()> {
        self.require_state(&[AdminState::ConfirmingDelete], "confirm a table delete")?;

        let name = self.selected_definition()?.name;
        self.service.delete_table(&name).await?;
        self.clear_selection();
        self.refresh_tables_after_commit().await;
        Ok(())
    }

    /// Close the open form without any backend call
    pub fn cancel(&mut self) -> ServiceResult<AdminState> {
        self.state = match self.state {
            AdminState::CreatingTable => AdminState::Browsing,
            AdminState::InsertingRow
            | AdminState::EditingRow { .. }
            | AdminState::ConfirmingDelete => AdminState::TableSelected,
            AdminState::Browsing | AdminState::TableSelected => {
                return Err(self.illegal("cancel"));
            }
        };
        Ok(self.state)
    }

    async fn reload_tables(&mut self) -> ServiceResult<()> {
        let entries = self.service.list_tables().await?;
        self.tables = entries.iter().map(TableSummary::from).collect();
        Ok(())
    }

    async fn reload_rows(&mut self) -> ServiceResult<()> {
        let definition = self.selected_definition()?;
        self.rows = self.service.rows().list_rows(&definition).await?;
        Ok(())
    }

    /// Reload after a committed change. The change stands even when the
    /// reload fails, so the old list is kept and the failure only logged.
    async fn refresh_rows_after_commit(&mut self) {
        if let Err(e) = self.reload_rows().await {
            tracing::warn!(error = %e, "row list is stale after a committed change");
        }
    }

    async fn refresh_tables_after_commit(&mut self) {
        if let Err(e) = self.reload_tables().await {
            tracing::warn!(error = %e, "table list is stale after a committed change");
        }
    }

    fn clear_selection(&mut self) {
        self.selected = None;
        self.rows.clear();
        self.state = AdminState::Browsing;
    }

    fn selected_definition(&self) -> ServiceResult<TableDefinition> {
        self.selected
            .as_ref()
            .map(|entry| entry.definition.clone())
            .ok_or_else(|| self.illegal("work with rows"))
    }

    fn require_state(&self, allowed: &[AdminState], action: &'static str) -> ServiceResult<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(self.illegal(action))
        }
    }

    fn illegal(&self, action: &'static str) -> ServiceError {
        tracing::debug!(action, state = %self.state, "rejected transition");
        ServiceError::InvalidTransition {
            action,
            state: self.state.to_string(),
        }
    }
}
