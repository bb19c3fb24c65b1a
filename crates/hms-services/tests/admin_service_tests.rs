//! Integration tests for AdminService
//!
//! Table lifecycle against a real in-memory SQLite store, with faults injected
//! between the DDL and catalog steps.

mod common;

use hms_core::{Connection, SchemaIntrospection, Value};
use hms_services::{AdminOptions, Column, ColumnType, ErrorKind, RowValues, TableDefinition};
use pretty_assertions::assert_eq;
use std::time::Duration;

use common::{admin, admin_with};

fn patient_records() -> TableDefinition {
    TableDefinition::new("Patient Records")
        .with_description("Admitted patients")
        .with_column(Column::new("Full Name", ColumnType::Text).primary())
        .with_column(Column::new("Admitted", ColumnType::Date))
        .with_column(Column::new("Ward", ColumnType::Text).default("General"))
}

fn wards() -> TableDefinition {
    TableDefinition::new("Wards")
        .with_column(Column::new("Name", ColumnType::Text).primary())
        .with_column(Column::new("Beds", ColumnType::Integer).default("10"))
}

// ============ create_table ============

#[tokio::test]
async fn create_table_registers_sanitized_name() {
    let (conn, service) = admin().await;

    let entry = service
        .create_table(&patient_records())
        .await
        .expect("should create table");
    assert_eq!(entry.sanitized_name, "patient_records");

    let tables = service.list_tables().await.unwrap();
    assert_eq!(tables.len(), 1);
    assert_eq!(tables[0].sanitized_name, "patient_records");
    assert_eq!(tables[0].definition, patient_records());

    assert!(conn.table_exists("patient_records").await.unwrap());
    let rows = service.list_rows("Patient Records").await.unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn create_table_twice_is_rejected_without_new_ddl() {
    let (conn, service) = admin().await;
    service.create_table(&patient_records()).await.unwrap();
    conn.clear_log();

    let err = service.create_table(&patient_records()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TableAlreadyExists);
    assert!(conn.ddl_log().is_empty(), "unexpected DDL: {:?}", conn.ddl_log());
    assert_eq!(service.list_tables().await.unwrap().len(), 1);
}

#[tokio::test]
async fn two_primary_columns_issue_no_backend_calls() {
    let (conn, service) = admin().await;
    conn.clear_log();

    let def = TableDefinition::new("Beds")
        .with_column(Column::new("Ward", ColumnType::Text).primary())
        .with_column(Column::new("Number", ColumnType::Integer).primary());

    let err = service.create_table(&def).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MultiplePrimaryKeys);
    assert!(err.is_validation());
    assert!(conn.log().is_empty(), "unexpected calls: {:?}", conn.log());
}

#[tokio::test]
async fn catalog_relation_name_is_reserved() {
    let (conn, service) = admin().await;
    conn.clear_log();

    let def = TableDefinition::new("Tables").with_column(Column::new("Label", ColumnType::Text));
    let err = service.create_table(&def).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidIdentifier);
    assert!(conn.log().is_empty());
}

#[tokio::test]
async fn create_table_over_uncataloged_relation_is_desync() {
    let (conn, service) = admin().await;
    conn.raw(r#"CREATE TABLE "wards" ("id" INTEGER PRIMARY KEY)"#).await;

    let err = service.create_table(&wards()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CatalogDesync);
    assert!(service.list_tables().await.unwrap().is_empty());
}

#[tokio::test]
async fn create_table_over_relation_in_other_case_is_desync() {
    let (conn, service) = admin().await;
    conn.raw(r#"CREATE TABLE "Patient_Records" ("x" TEXT)"#).await;
    conn.clear_log();

    let err = service.create_table(&patient_records()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CatalogDesync);
    assert!(conn.ddl_log().is_empty());

    let report = service.check_consistency().await.unwrap();
    assert!(report.missing_relations.is_empty());
    let names: Vec<_> = report.uncataloged_relations.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Patient_Records"]);
}

#[tokio::test]
async fn create_table_over_view_is_desync() {
    let (conn, service) = admin().await;
    conn.raw(r#"CREATE VIEW "wards" AS SELECT 1 AS "beds""#).await;
    conn.clear_log();

    let err = service.create_table(&wards()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CatalogDesync);
    assert!(conn.ddl_log().is_empty());
    assert!(service.list_tables().await.unwrap().is_empty());

    let report = service.check_consistency().await.unwrap();
    let names: Vec<_> = report.uncataloged_relations.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["wards"]);
}

#[tokio::test]
async fn rejected_ddl_leaves_catalog_untouched() {
    let (conn, service) = admin().await;
    conn.fail_on(r#"CREATE TABLE "wards""#);

    let err = service.create_table(&wards()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SchemaExecution);
    assert!(err.to_string().starts_with("create_table failed during ddl"));
    assert!(service.list_tables().await.unwrap().is_empty());
}

#[tokio::test]
async fn failed_catalog_insert_after_ddl_is_desync() {
    let (conn, service) = admin().await;
    conn.fail_on(r#"INSERT INTO "tables""#);

    let err = service.create_table(&wards()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CatalogDesync);
    assert!(err.to_string().contains("'wards'"));
    assert!(conn.table_exists("wards").await.unwrap());

    // A retry must not try to recreate the relation
    conn.clear_faults();
    conn.clear_log();
    let err = service.create_table(&wards()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CatalogDesync);
    assert!(conn.ddl_log().is_empty());
}

// ============ delete_table ============

#[tokio::test]
async fn delete_table_removes_relation_and_entry() {
    let (conn, service) = admin().await;
    service.create_table(&wards()).await.unwrap();

    service.delete_table("Wards").await.expect("should delete table");

    assert!(!conn.table_exists("wards").await.unwrap());
    assert!(service.list_tables().await.unwrap().is_empty());
}

#[tokio::test]
async fn delete_unknown_table_is_not_found() {
    let (_conn, service) = admin().await;
    let err = service.delete_table("Morgue").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TableNotFound);
}

#[tokio::test]
async fn delete_after_external_drop_is_desync() {
    let (conn, service) = admin().await;
    service.create_table(&patient_records()).await.unwrap();
    conn.raw(r#"DROP TABLE "patient_records""#).await;

    let err = service.delete_table("Patient Records").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CatalogDesync);
    assert!(err.to_string().starts_with("delete_table left table 'patient_records'"));
    assert_eq!(service.list_tables().await.unwrap().len(), 1);
}

#[tokio::test]
async fn failed_catalog_delete_after_drop_is_desync() {
    let (conn, service) = admin().await;
    service.create_table(&wards()).await.unwrap();
    conn.fail_on(r#"DELETE FROM "tables""#);

    let err = service.delete_table("wards").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CatalogDesync);
    assert!(!conn.table_exists("wards").await.unwrap());
}

// ============ backend failures ============

#[tokio::test]
async fn stalled_ddl_times_out() {
    let (conn, service) = admin_with(AdminOptions {
        timeout: Duration::from_millis(50),
        ..AdminOptions::default()
    })
    .await;
    conn.stall_on(r#"CREATE TABLE "wards""#, Duration::from_secs(2));

    let err = service.create_table(&wards()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BackendTimeout);
    assert_eq!(err.to_string(), "create_table timed out during ddl after 50ms");
    assert!(!conn.table_exists("wards").await.unwrap());
}

#[tokio::test]
async fn closed_backend_is_unavailable() {
    let (conn, service) = admin().await;
    conn.close().await.unwrap();

    let err = service.list_tables().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BackendUnavailable);
}

#[tokio::test]
async fn custom_catalog_table_is_used() {
    let (conn, service) = admin_with(AdminOptions {
        catalog_table: "catalog".into(),
        ..AdminOptions::default()
    })
    .await;
    service.create_table(&wards()).await.unwrap();

    let names: Vec<String> = conn
        .list_tables()
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.name)
        .collect();
    assert_eq!(names, vec!["catalog", "wards"]);
}

// ============ column edits ============

#[tokio::test]
async fn add_rename_and_drop_column() {
    let (conn, service) = admin().await;
    service.create_table(&wards()).await.unwrap();

    let entry = service
        .add_column("Wards", &Column::new("Head Nurse", ColumnType::Text))
        .await
        .expect("should add column");
    assert_eq!(entry.definition.column_names(), vec!["name", "beds", "head_nurse"]);

    let entry = service
        .rename_column("Wards", "Head Nurse", "Charge Nurse")
        .await
        .expect("should rename column");
    assert_eq!(entry.definition.column_names(), vec!["name", "beds", "charge_nurse"]);

    let live: Vec<String> = conn
        .get_columns("wards")
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(live, vec!["id", "name", "beds", "charge_nurse"]);

    let entry = service
        .drop_column("Wards", "charge_nurse")
        .await
        .expect("should drop column");
    assert_eq!(entry.definition.column_names(), vec!["name", "beds"]);
    assert_eq!(service.get_table("wards").await.unwrap().definition, wards());
}

#[tokio::test]
async fn added_column_default_applies_to_new_rows() {
    let (_conn, service) = admin().await;
    service.create_table(&wards()).await.unwrap();
    service
        .add_column("Wards", &Column::new("Floor", ColumnType::Integer).default("1"))
        .await
        .unwrap();

    let values = RowValues::from([("Name".to_string(), Value::from("Oncology"))]);
    service.insert_row("Wards", &values).await.unwrap();

    let rows = service.list_rows("Wards").await.unwrap();
    assert_eq!(rows[0].get_by_name("floor"), Some(&Value::Int64(1)));
}

#[tokio::test]
async fn primary_column_edits_are_rejected() {
    let (_conn, service) = admin().await;
    service.create_table(&wards()).await.unwrap();

    let err = service
        .add_column("Wards", &Column::new("Code", ColumnType::Text).primary())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidColumn);

    let err = service.drop_column("Wards", "Name").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidColumn);

    let err = service.drop_column("Wards", "Matron").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidColumn);
}

#[tokio::test]
async fn rename_to_existing_column_is_rejected() {
    let (conn, service) = admin().await;
    service.create_table(&wards()).await.unwrap();
    conn.clear_log();

    let err = service.rename_column("Wards", "Beds", "name").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidColumn);
    assert!(conn.ddl_log().is_empty());
}

#[tokio::test]
async fn failed_catalog_update_after_column_ddl_is_desync() {
    let (conn, service) = admin().await;
    service.create_table(&wards()).await.unwrap();
    conn.fail_on(r#"UPDATE "tables""#);

    let err = service
        .add_column("Wards", &Column::new("Notes", ColumnType::Text))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CatalogDesync);
}

// ============ drift check and preview ============

#[tokio::test]
async fn drift_check_reports_both_directions() {
    let (conn, service) = admin().await;
    service.create_table(&wards()).await.unwrap();
    service.create_table(&patient_records()).await.unwrap();
    assert!(service.check_consistency().await.unwrap().is_consistent());

    conn.raw(r#"DROP TABLE "wards""#).await;
    conn.raw(
        r#"CREATE TABLE "legacy_beds" ("id" INTEGER PRIMARY KEY, "ward" TEXT NOT NULL, "beds" INTEGER DEFAULT 4)"#,
    )
    .await;

    let report = service.check_consistency().await.unwrap();
    assert!(!report.is_consistent());
    assert_eq!(report.missing_relations, vec!["wards"]);
    assert_eq!(report.uncataloged_relations.len(), 1);

    let legacy = &report.uncataloged_relations[0];
    assert_eq!(legacy.name, "legacy_beds");
    assert_eq!(legacy.row_count, Some(0));
    assert_eq!(
        legacy.definition,
        Some(
            TableDefinition::new("legacy_beds")
                .with_column(Column::new("ward", ColumnType::Text).primary())
                .with_column(Column::new("beds", ColumnType::Integer).default("4"))
        )
    );
}

#[tokio::test]
async fn preview_matches_executed_ddl() {
    let (conn, service) = admin().await;
    let preview = service.preview_create_table(&wards()).unwrap();
    assert_eq!(
        preview,
        "CREATE TABLE \"wards\" (\n  \"id\" INTEGER PRIMARY KEY AUTOINCREMENT,\n  \"name\" TEXT NOT NULL UNIQUE,\n  \"beds\" INTEGER DEFAULT 10\n)"
    );

    conn.clear_log();
    service.create_table(&wards()).await.unwrap();
    assert_eq!(conn.ddl_log(), vec![preview]);
}
