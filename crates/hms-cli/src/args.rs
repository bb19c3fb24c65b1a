//! Command-line arguments

use clap::{Args, Parser, Subcommand};
use hms_core::Value;
use hms_services::{Column, ColumnType, RowValues};
use std::path::PathBuf;

/// HMS table administration
#[derive(Parser, Debug)]
#[command(
    name = "hms-admin",
    version,
    about = "Manage operator-defined tables and their rows",
    long_about = "Create and drop managed tables, edit their columns, and work with their rows.\n\n\
                  Table definitions are kept in a catalog relation next to the tables\n\
                  themselves; `check` reports any drift between the two."
)]
pub struct Cli {
    /// Config file (defaults to <config dir>/hms/admin.toml)
    #[arg(short, long, env = "HMS_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Database path, overrides the config file
    #[arg(short, long, env = "HMS_DATABASE", global = true)]
    pub database: Option<String>,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List managed tables
    Tables,

    /// Show the definition of a table
    Show {
        table: String,
    },

    /// Create a table
    Create(TableArgs),

    /// Print the CREATE TABLE statement for a definition without running it
    Preview(TableArgs),

    /// Drop a table and its catalog entry
    Drop {
        table: String,
        /// Confirm the drop
        #[arg(long)]
        yes: bool,
    },

    /// List the rows of a table
    Rows {
        table: String,
    },

    /// Insert a row
    Insert {
        table: String,
        #[command(flatten)]
        values: ValueArgs,
    },

    /// Update columns of the row with this id
    Update {
        table: String,
        id: i64,
        #[command(flatten)]
        values: ValueArgs,
    },

    /// Delete the row with this id
    Delete {
        table: String,
        id: i64,
    },

    /// Add a column to a table
    AddColumn {
        table: String,
        /// Column as name:type[:default][:pk]
        #[arg(value_parser = parse_column)]
        column: Column,
    },

    /// Drop a column from a table
    DropColumn {
        table: String,
        column: String,
    },

    /// Rename a column
    RenameColumn {
        table: String,
        from: String,
        to: String,
    },

    /// Compare the catalog with the live schema
    Check,
}

#[derive(Args, Debug)]
pub struct TableArgs {
    /// Display name of the table
    pub name: String,

    /// Free-text description
    #[arg(long, default_value = "")]
    pub description: String,

    /// Column as name:type[:default][:pk], repeat for each column
    #[arg(long = "column", short = 'C', value_parser = parse_column, required = true)]
    pub columns: Vec<Column>,
}

#[derive(Args, Debug)]
pub struct ValueArgs {
    /// Column value as name=value, repeat for each column
    #[arg(long = "set", short = 's', value_parser = parse_assignment)]
    pub set: Vec<(String, String)>,

    /// Store NULL in this column
    #[arg(long = "null")]
    pub null: Vec<String>,
}

impl ValueArgs {
    /// Values as text; the engine parses them per column type
    pub fn to_row_values(&self) -> RowValues {
        let mut values: RowValues = self
            .set
            .iter()
            .map(|(name, value)| (name.clone(), Value::String(value.clone())))
            .collect();
        for name in &self.null {
            values.insert(name.clone(), Value::Null);
        }
        values
    }
}

/// Parse `name:type[:default][:pk]`.
///
/// A trailing `pk` marks the primary column. Anything between the type and
/// that marker is the default, so defaults may contain `:`.
pub fn parse_column(spec: &str) -> Result<Column, String> {
    let mut parts: Vec<&str> = spec.split(':').collect();
    if parts.len() < 2 {
        return Err(format!("expected name:type[:default][:pk], got '{}'", spec));
    }

    let is_primary = parts.len() > 2 && parts.last().is_some_and(|p| p.eq_ignore_ascii_case("pk"));
    if is_primary {
        parts.pop();
    }

    let name = parts[0].trim();
    if name.is_empty() {
        return Err("column name is empty".to_string());
    }
    let column_type: ColumnType = parts[1].parse().map_err(|e| format!("{}", e))?;

    let mut column = Column::new(name, column_type);
    let default = parts[2..].join(":");
    if !default.is_empty() {
        column = column.default(default);
    }
    if is_primary {
        column = column.primary();
    }
    Ok(column)
}

/// Parse `name=value`
pub fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{}'", raw))?;
    if name.trim().is_empty() {
        return Err(format!("missing column name in '{}'", raw));
    }
    Ok((name.trim().to_string(), value.to_string()))
}
