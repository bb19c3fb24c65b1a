//! hms-admin
//!
//! Command-line front end for managed tables.
//!
//! ```text
//! hms-admin create "Ward Beds" -C "Ward:text::pk" -C "Beds:integer:10"
//! hms-admin insert "Ward Beds" --set Ward=Cardiology --set Beds=12
//! hms-admin rows "Ward Beds"
//! hms-admin drop "Ward Beds" --yes
//! hms-admin check
//! ```

mod args;
mod commands;
mod logging;
mod output;

use anyhow::{Context, Result};
use clap::Parser;
use hms_drivers::{DriverRegistry, get_dialect_info};
use hms_services::{AdminConfig, AdminService};
use std::process::ExitCode;
use std::sync::Arc;

use crate::args::Cli;
use crate::logging::LoggingConfig;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = AdminConfig::load(cli.config.as_deref())?;
    if let Some(database) = cli.database {
        config.backend.database = database;
    }

    let _guard = logging::init(LoggingConfig::from_settings(&config.logging, cli.verbose))?;

    let registry = DriverRegistry::with_defaults();
    let connection = registry
        .connect(&config.connection_config())
        .await
        .with_context(|| format!("Failed to open database '{}'", config.backend.database))?;
    let dialect = registry
        .dialect_info(&config.backend.driver)
        .unwrap_or_else(|| get_dialect_info(&config.backend.driver));

    tracing::debug!(
        driver = %config.backend.driver,
        database = %config.backend.database,
        "connected"
    );

    let service = Arc::new(AdminService::open(connection, dialect, config.admin_options()).await?);
    commands::execute(cli.command, service, cli.json).await
}
