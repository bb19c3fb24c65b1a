//! Integration tests for the administration workflow

mod common;

use hms_core::Value;
use hms_services::{
    AdminSession, AdminState, Column, ColumnType, ErrorKind, RowValues, TableDefinition,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;

use common::{FaultyConnection, admin};

fn wards() -> TableDefinition {
    TableDefinition::new("Wards")
        .with_column(Column::new("Name", ColumnType::Text).primary())
        .with_column(Column::new("Beds", ColumnType::Integer).default("10"))
}

fn named(name: &str) -> RowValues {
    RowValues::from([("Name".to_string(), Value::from(name))])
}

async fn session() -> (Arc<FaultyConnection>, AdminSession) {
    let (conn, service) = admin().await;
    (conn, AdminSession::new(Arc::new(service)))
}

#[tokio::test]
async fn create_table_returns_to_browsing_with_fresh_list() {
    let (_conn, mut session) = session().await;
    assert_eq!(session.state(), AdminState::Browsing);

    session.begin_create_table().unwrap();
    assert_eq!(session.state(), AdminState::CreatingTable);

    session.submit_create_table(&wards()).await.unwrap();
    assert_eq!(session.state(), AdminState::Browsing);
    assert_eq!(session.tables().len(), 1);
    assert_eq!(session.tables()[0].sanitized_name, "wards");
    assert_eq!(session.tables()[0].column_count, 2);
    assert_eq!(session.tables()[0].primary_column.as_deref(), Some("Name"));
}

#[tokio::test]
async fn failed_submit_keeps_the_form_open() {
    let (_conn, mut session) = session().await;
    session.begin_create_table().unwrap();
    session.submit_create_table(&wards()).await.unwrap();

    session.begin_create_table().unwrap();
    let err = session.submit_create_table(&wards()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TableAlreadyExists);
    assert_eq!(session.state(), AdminState::CreatingTable);

    assert_eq!(session.cancel().unwrap(), AdminState::Browsing);
}

#[tokio::test]
async fn row_edits_reload_rows() {
    let (_conn, mut session) = session().await;
    session.begin_create_table().unwrap();
    session.submit_create_table(&wards()).await.unwrap();

    session.select_table("Wards").await.unwrap();
    assert_eq!(session.state(), AdminState::TableSelected);
    assert!(session.rows().is_empty());

    session.begin_insert_row().unwrap();
    let id = session.submit_insert_row(&named("Cardiology")).await.unwrap();
    assert_eq!(session.state(), AdminState::TableSelected);
    assert_eq!(session.rows().len(), 1);
    assert_eq!(session.rows()[0].id(), Some(id));

    session.begin_edit_row(id).unwrap();
    assert_eq!(session.state(), AdminState::EditingRow { row_id: id });
    session
        .submit_edit_row(&RowValues::from([("Beds".to_string(), Value::Int64(24))]))
        .await
        .unwrap();
    assert_eq!(session.state(), AdminState::TableSelected);
    assert_eq!(session.rows()[0].get_by_name("beds"), Some(&Value::Int64(24)));

    session.remove_row(id).await.unwrap();
    assert!(session.rows().is_empty());
}

#[tokio::test]
async fn editing_a_missing_row_stays_in_the_form() {
    let (_conn, mut session) = session().await;
    session.begin_create_table().unwrap();
    session.submit_create_table(&wards()).await.unwrap();
    session.select_table("wards").await.unwrap();

    session.begin_edit_row(5).unwrap();
    let err = session.submit_edit_row(&named("Oncology")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RowNotFound);
    assert_eq!(session.state(), AdminState::EditingRow { row_id: 5 });

    assert_eq!(session.cancel().unwrap(), AdminState::TableSelected);
}

#[tokio::test]
async fn delete_table_needs_confirmation() {
    let (conn, mut session) = session().await;
    session.begin_create_table().unwrap();
    session.submit_create_table(&wards()).await.unwrap();
    session.select_table("Wards").await.unwrap();

    session.request_delete_table().unwrap();
    assert_eq!(session.state(), AdminState::ConfirmingDelete);
    conn.clear_log();
    assert_eq!(session.cancel().unwrap(), AdminState::TableSelected);
    assert!(conn.log().is_empty(), "cancel must not touch the backend");

    session.request_delete_table().unwrap();
    session.confirm_delete_table().await.unwrap();
    assert_eq!(session.state(), AdminState::Browsing);
    assert!(session.selected().is_none());
    assert!(session.tables().is_empty());
}

#[tokio::test]
async fn illegal_actions_are_rejected() {
    let (conn, mut session) = session().await;
    conn.clear_log();

    let err = session.begin_insert_row().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidTransition);
    assert_eq!(err.to_string(), "Cannot insert a row while browsing");

    let err = session.confirm_delete_table().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidTransition);

    let err = session.cancel().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidTransition);

    session.begin_create_table().unwrap();
    let err = session.select_table("Wards").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidTransition);
    assert_eq!(session.state(), AdminState::CreatingTable);

    assert!(conn.log().is_empty());
}

#[tokio::test]
async fn selecting_an_unknown_table_keeps_state() {
    let (_conn, mut session) = session().await;
    let err = session.select_table("Pharmacy").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TableNotFound);
    assert_eq!(session.state(), AdminState::Browsing);
    assert!(session.selected().is_none());
}

#[tokio::test]
async fn selecting_an_externally_dropped_table_is_desync() {
    let (conn, mut session) = session().await;
    session.begin_create_table().unwrap();
    session.submit_create_table(&wards()).await.unwrap();
    conn.raw(r#"DROP TABLE "wards""#).await;

    let err = session.select_table("Wards").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CatalogDesync);
    assert_eq!(session.state(), AdminState::Browsing);
    assert!(session.selected().is_none());
}

#[tokio::test]
async fn insert_after_external_drop_is_desync() {
    let (conn, mut session) = session().await;
    session.begin_create_table().unwrap();
    session.submit_create_table(&wards()).await.unwrap();
    session.select_table("Wards").await.unwrap();
    conn.raw(r#"DROP TABLE "wards""#).await;

    session.begin_insert_row().unwrap();
    let err = session.submit_insert_row(&named("Cardiology")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CatalogDesync);
    assert_eq!(session.state(), AdminState::InsertingRow);
}

#[tokio::test]
async fn committed_insert_survives_a_failed_reload() {
    let (conn, mut session) = session().await;
    session.begin_create_table().unwrap();
    session.submit_create_table(&wards()).await.unwrap();
    session.select_table("Wards").await.unwrap();

    conn.fail_on(r#"SELECT * FROM "wards""#);
    session.begin_insert_row().unwrap();
    let id = session.submit_insert_row(&named("Cardiology")).await.unwrap();
    assert_eq!(session.state(), AdminState::TableSelected);
    assert!(session.rows().is_empty(), "rows stay stale until the next refresh");

    conn.clear_faults();
    session.refresh_rows().await.unwrap();
    assert_eq!(session.rows().len(), 1);
    assert_eq!(session.rows()[0].id(), Some(id));
}
