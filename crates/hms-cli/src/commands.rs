//! Subcommand handlers
//!
//! Listing, table creation and row commands go through an [`AdminSession`] so
//! the CLI follows the same transitions as any other front end.

use anyhow::{Result, bail};
use hms_services::{AdminService, AdminSession, TableDefinition, TableSummary};
use serde_json::json;
use std::sync::Arc;

use crate::args::{Command, TableArgs};
use crate::output;

pub async fn execute(command: Command, service: Arc<AdminService>, json: bool) -> Result<()> {
    let mut session = AdminSession::new(service.clone());

    match command {
        Command::Tables => {
            let tables = session.refresh_tables().await?;
            if json {
                print_json(&tables)?;
            } else {
                println!("{}", output::format_tables(tables));
            }
        }

        Command::Show { table } => {
            let entry = service.get_table(&table).await?;
            if json {
                print_json(&entry)?;
            } else {
                println!("{}", output::format_definition(&entry));
            }
        }

        Command::Create(args) => {
            let definition = definition_from(args);
            session.begin_create_table()?;
            let entry = session.submit_create_table(&definition).await?;
            if json {
                print_json(&TableSummary::from(&entry))?;
            } else {
                println!("Created table {} ({})", entry.definition.name, entry.sanitized_name);
            }
        }

        Command::Preview(args) => {
            let ddl = service.preview_create_table(&definition_from(args))?;
            if json {
                print_json(&json!({ "ddl": ddl }))?;
            } else {
                println!("{}", ddl);
            }
        }

        Command::Drop { table, yes } => {
            if !yes {
                bail!("refusing to drop '{}' without --yes", table);
            }
            service.delete_table(&table).await?;
            println!("Dropped table {}", table);
        }

        Command::Rows { table } => {
            session.select_table(&table).await?;
            if json {
                print_json(&output::rows_json(session.rows()))?;
            } else if let Some(entry) = session.selected() {
                println!("{}", output::format_rows(&entry.definition, session.rows()));
            }
        }

        Command::Insert { table, values } => {
            session.select_table(&table).await?;
            session.begin_insert_row()?;
            let id = session.submit_insert_row(&values.to_row_values()).await?;
            if json {
                print_json(&json!({ "id": id }))?;
            } else {
                println!("Inserted row {}", id);
            }
        }

        Command::Update { table, id, values } => {
            session.select_table(&table).await?;
            session.begin_edit_row(id)?;
            session.submit_edit_row(&values.to_row_values()).await?;
            println!("Updated row {}", id);
        }

        Command::Delete { table, id } => {
            session.select_table(&table).await?;
            session.remove_row(id).await?;
            println!("Deleted row {}", id);
        }

        Command::AddColumn { table, column } => {
            let entry = service.add_column(&table, &column).await?;
            println!("{}", output::format_definition(&entry));
        }

        Command::DropColumn { table, column } => {
            let entry = service.drop_column(&table, &column).await?;
            println!("{}", output::format_definition(&entry));
        }

        Command::RenameColumn { table, from, to } => {
            let entry = service.rename_column(&table, &from, &to).await?;
            println!("{}", output::format_definition(&entry));
        }

        Command::Check => {
            let report = service.check_consistency().await?;
            if json {
                print_json(&report)?;
            } else {
                print!("{}", output::format_drift(&report));
                if report.is_consistent() {
                    println!();
                }
            }
            if !report.is_consistent() {
                bail!("catalog drift detected");
            }
        }
    }

    Ok(())
}

fn definition_from(args: TableArgs) -> TableDefinition {
    TableDefinition {
        name: args.name,
        description: args.description,
        columns: args.columns,
    }
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
