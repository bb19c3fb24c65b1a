//! Integration tests for row operations on managed tables

mod common;

use chrono::NaiveDate;
use hms_core::Value;
use hms_services::{Column, ColumnType, ErrorKind, RowValues, TableDefinition};
use pretty_assertions::assert_eq;

use common::admin;

fn beds() -> TableDefinition {
    TableDefinition::new("Ward Beds")
        .with_column(Column::new("Label", ColumnType::Text).primary())
        .with_column(Column::new("Status", ColumnType::Text).default("Free"))
        .with_column(Column::new("Floor", ColumnType::Integer))
        .with_column(Column::new("Cleaned", ColumnType::Date))
}

fn values(pairs: &[(&str, Value)]) -> RowValues {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

#[tokio::test]
async fn insert_then_list_round_trips() {
    let (_conn, service) = admin().await;
    service.create_table(&beds()).await.unwrap();

    let id = service
        .insert_row(
            "Ward Beds",
            &values(&[
                ("Label", Value::from("B-12")),
                ("Status", Value::from("Occupied")),
                ("Floor", Value::Int64(3)),
                ("Cleaned", Value::Date(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap())),
            ]),
        )
        .await
        .expect("should insert row");

    let rows = service.list_rows("Ward Beds").await.unwrap();
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row.id(), Some(id));
    assert_eq!(row.columns(), ["id", "label", "status", "floor", "cleaned"]);
    assert_eq!(row.get_by_name("label"), Some(&Value::from("B-12")));
    assert_eq!(row.get_by_name("status"), Some(&Value::from("Occupied")));
    assert_eq!(row.get_by_name("floor"), Some(&Value::Int64(3)));
    assert_eq!(row.get_by_name("cleaned"), Some(&Value::from("2024-05-01")));
}

#[tokio::test]
async fn omitted_columns_take_default_or_null() {
    let (_conn, service) = admin().await;
    service.create_table(&beds()).await.unwrap();

    service
        .insert_row("ward_beds", &values(&[("label", Value::from("B-13"))]))
        .await
        .unwrap();

    let rows = service.list_rows("ward_beds").await.unwrap();
    assert_eq!(rows[0].get_by_name("status"), Some(&Value::from("Free")));
    assert_eq!(rows[0].get_by_name("floor"), Some(&Value::Null));
}

#[tokio::test]
async fn text_values_are_parsed_for_typed_columns() {
    let (_conn, service) = admin().await;
    service.create_table(&beds()).await.unwrap();

    service
        .insert_row(
            "Ward Beds",
            &values(&[
                ("Label", Value::from("B-14")),
                ("Floor", Value::from(" 2 ")),
                ("Cleaned", Value::from("2024-06-30")),
            ]),
        )
        .await
        .unwrap();

    let rows = service.list_rows("Ward Beds").await.unwrap();
    assert_eq!(rows[0].get_by_name("floor"), Some(&Value::Int64(2)));
    assert_eq!(rows[0].get_by_name("cleaned"), Some(&Value::from("2024-06-30")));
}

#[tokio::test]
async fn rows_are_listed_in_id_order() {
    let (_conn, service) = admin().await;
    service.create_table(&beds()).await.unwrap();

    let mut ids = Vec::new();
    for label in ["A-1", "A-2", "A-3"] {
        ids.push(
            service
                .insert_row("Ward Beds", &values(&[("Label", Value::from(label))]))
                .await
                .unwrap(),
        );
    }

    let listed: Vec<i64> = service
        .list_rows("Ward Beds")
        .await
        .unwrap()
        .iter()
        .filter_map(|row| row.id())
        .collect();
    assert_eq!(listed, ids);
}

#[tokio::test]
async fn update_and_delete_by_id() {
    let (_conn, service) = admin().await;
    service.create_table(&beds()).await.unwrap();
    let id = service
        .insert_row("Ward Beds", &values(&[("Label", Value::from("C-1"))]))
        .await
        .unwrap();

    service
        .update_row("Ward Beds", id, &values(&[("Status", Value::from("Occupied"))]))
        .await
        .expect("should update row");
    let rows = service.list_rows("Ward Beds").await.unwrap();
    assert_eq!(rows[0].get_by_name("status"), Some(&Value::from("Occupied")));
    assert_eq!(rows[0].get_by_name("label"), Some(&Value::from("C-1")));

    service
        .delete_row("Ward Beds", id)
        .await
        .expect("should delete row");
    assert!(service.list_rows("Ward Beds").await.unwrap().is_empty());
}

#[tokio::test]
async fn update_missing_id_is_not_found_and_changes_nothing() {
    let (_conn, service) = admin().await;
    service.create_table(&beds()).await.unwrap();
    service
        .insert_row("Ward Beds", &values(&[("Label", Value::from("D-1"))]))
        .await
        .unwrap();
    let before = service.list_rows("Ward Beds").await.unwrap();

    let err = service
        .update_row("Ward Beds", 5, &values(&[("Status", Value::from("Occupied"))]))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RowNotFound);
    assert_eq!(err.to_string(), "Row 5 not found in 'ward_beds'");

    let err = service.delete_row("Ward Beds", 5).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RowNotFound);

    assert_eq!(service.list_rows("Ward Beds").await.unwrap(), before);
}

#[tokio::test]
async fn undeclared_columns_are_rejected() {
    let (conn, service) = admin().await;
    service.create_table(&beds()).await.unwrap();
    conn.clear_log();

    let err = service
        .insert_row("Ward Beds", &values(&[("Label", Value::from("E-1")), ("Colour", Value::from("red"))]))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidColumn);

    let err = service
        .insert_row("Ward Beds", &values(&[("Label", Value::from("E-1")), ("id", Value::Int64(9))]))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidColumn);

    // Only the catalog lookups reached the backend
    assert!(conn.log().iter().all(|sql| sql.starts_with("SELECT")));
}

#[tokio::test]
async fn mistyped_values_are_rejected() {
    let (_conn, service) = admin().await;
    service.create_table(&beds()).await.unwrap();

    let err = service
        .insert_row("Ward Beds", &values(&[("Label", Value::from("F-1")), ("Floor", Value::from("third"))]))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidValue);
    assert!(err.to_string().contains("'Floor'"));

    let err = service
        .insert_row("Ward Beds", &values(&[("Label", Value::from("F-1")), ("Cleaned", Value::from("01/05/2024"))]))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidValue);
}

#[tokio::test]
async fn primary_column_requires_a_unique_value() {
    let (_conn, service) = admin().await;
    service.create_table(&beds()).await.unwrap();

    let err = service
        .insert_row("Ward Beds", &values(&[("Floor", Value::Int64(1))]))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidValue);

    service
        .insert_row("Ward Beds", &values(&[("Label", Value::from("G-1"))]))
        .await
        .unwrap();
    let err = service
        .insert_row("Ward Beds", &values(&[("Label", Value::from("G-1"))]))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RowOperation);
    assert!(err.to_string().starts_with("insert_row failed during row"));
}

#[tokio::test]
async fn empty_update_is_rejected() {
    let (_conn, service) = admin().await;
    service.create_table(&beds()).await.unwrap();
    let id = service
        .insert_row("Ward Beds", &values(&[("Label", Value::from("H-1"))]))
        .await
        .unwrap();

    let err = service
        .update_row("Ward Beds", id, &RowValues::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidValue);
}

#[tokio::test]
async fn rows_of_unknown_table_are_not_found() {
    let (_conn, service) = admin().await;
    let err = service.list_rows("Pharmacy").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TableNotFound);
}

#[tokio::test]
async fn rows_of_externally_dropped_table_are_desync() {
    let (conn, service) = admin().await;
    service.create_table(&beds()).await.unwrap();
    conn.raw(r#"DROP TABLE "ward_beds""#).await;
    conn.clear_log();

    let err = service.list_rows("Ward Beds").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CatalogDesync);

    let err = service
        .insert_row("Ward Beds", &values(&[("Label", Value::from("J-1"))]))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CatalogDesync);
    assert!(conn.log().iter().all(|sql| !sql.starts_with("INSERT")));
}
