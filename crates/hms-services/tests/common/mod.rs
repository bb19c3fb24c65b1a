//! Common test utilities
//!
//! `FaultyConnection` wraps a real in-memory SQLite connection and can be told
//! to fail or stall specific statements, so partial failures between DDL and
//! catalog writes can be reproduced.

#![allow(dead_code)]

use async_trait::async_trait;
use hms_core::{
    ColumnInfo, Connection, HmsError, QueryResult, Result, SchemaIntrospection, StatementResult,
    TableInfo, Transaction, Value,
};
use hms_drivers::sqlite::{SqliteConnection, sqlite_dialect};
use hms_services::{AdminOptions, AdminService};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

pub struct FaultyConnection {
    inner: SqliteConnection,
    /// Statements containing this pattern fail with a query error
    fail_on: Mutex<Option<String>>,
    /// Statements containing this pattern sleep before running
    stall_on: Mutex<Option<(String, Duration)>>,
    /// Every statement and query seen, in order
    log: Mutex<Vec<String>>,
}

impl FaultyConnection {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: SqliteConnection::open_in_memory().expect("Failed to open in-memory db"),
            fail_on: Mutex::new(None),
            stall_on: Mutex::new(None),
            log: Mutex::new(Vec::new()),
        })
    }

    pub fn fail_on(&self, pattern: impl Into<String>) {
        *self.fail_on.lock() = Some(pattern.into());
    }

    pub fn stall_on(&self, pattern: impl Into<String>, delay: Duration) {
        *self.stall_on.lock() = Some((pattern.into(), delay));
    }

    pub fn clear_faults(&self) {
        *self.fail_on.lock() = None;
        *self.stall_on.lock() = None;
    }

    pub fn log(&self) -> Vec<String> {
        self.log.lock().clone()
    }

    pub fn clear_log(&self) {
        self.log.lock().clear();
    }

    /// Statements that change the schema
    pub fn ddl_log(&self) -> Vec<String> {
        self.log()
            .into_iter()
            .filter(|sql| {
                let upper = sql.trim_start().to_ascii_uppercase();
                upper.starts_with("CREATE") || upper.starts_with("DROP") || upper.starts_with("ALTER")
            })
            .collect()
    }

    /// Run SQL directly, bypassing faults and the log
    pub async fn raw(&self, sql: &str) {
        self.inner.execute(sql, &[]).await.expect("raw statement failed");
    }

    async fn intercept(&self, sql: &str) -> Result<()> {
        self.log.lock().push(sql.to_string());

        let stall = self
            .stall_on
            .lock()
            .as_ref()
            .filter(|(pattern, _)| sql.contains(pattern.as_str()))
            .map(|(_, delay)| *delay);
        if let Some(delay) = stall {
            tokio::time::sleep(delay).await;
        }

        let fail = self
            .fail_on
            .lock()
            .as_ref()
            .is_some_and(|pattern| sql.contains(pattern.as_str()));
        if fail {
            return Err(HmsError::Query(format!("injected failure for: {}", sql)));
        }
        Ok(())
    }
}

#[async_trait]
impl Connection for FaultyConnection {
    fn driver_name(&self) -> &str {
        "sqlite"
    }

    async fn execute(&self, sql: &str, params: &[Value]) -> Result<StatementResult> {
        self.intercept(sql).await?;
        self.inner.execute(sql, params).await
    }

    async fn query(&self, sql: &str, params: &[Value]) -> Result<QueryResult> {
        self.intercept(sql).await?;
        self.inner.query(sql, params).await
    }

    async fn begin_transaction(&self) -> Result<Box<dyn Transaction>> {
        self.inner.begin_transaction().await
    }

    async fn close(&self) -> Result<()> {
        self.inner.close().await
    }

    fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }

    fn as_schema_introspection(&self) -> Option<&dyn SchemaIntrospection> {
        Some(self)
    }
}

#[async_trait]
impl SchemaIntrospection for FaultyConnection {
    async fn list_tables(&self) -> Result<Vec<TableInfo>> {
        self.inner.list_tables().await
    }

    async fn get_columns(&self, table: &str) -> Result<Vec<ColumnInfo>> {
        self.inner.get_columns(table).await
    }

    async fn table_exists(&self, table: &str) -> Result<bool> {
        self.inner.table_exists(table).await
    }
}

/// Admin service over a fresh faulty connection
pub async fn admin() -> (Arc<FaultyConnection>, AdminService) {
    admin_with(AdminOptions::default()).await
}

pub async fn admin_with(options: AdminOptions) -> (Arc<FaultyConnection>, AdminService) {
    let conn = FaultyConnection::new();
    let service = AdminService::open(conn.clone() as Arc<dyn Connection>, sqlite_dialect(), options)
        .await
        .expect("Failed to open admin service");
    (conn, service)
}
