//! Admin configuration file
//!
//! Read from `admin.toml` in the platform config directory unless a path is
//! given. Every section and key is optional.

use anyhow::{Context, Result};
use hms_core::ConnectionConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::admin_service::AdminOptions;
use crate::catalog::DEFAULT_CATALOG_TABLE;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    pub backend: BackendSettings,
    pub catalog: CatalogSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendSettings {
    /// Driver name as registered with the driver registry
    pub driver: String,
    /// Database path, `:memory:` for a throwaway store
    pub database: String,
    /// Budget for each backend call in milliseconds
    pub timeout_ms: u64,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            driver: "sqlite".to_string(),
            database: "hms.db".to_string(),
            timeout_ms: 5_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    pub table: String,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            table: DEFAULT_CATALOG_TABLE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directives, `RUST_LOG` takes precedence
    pub filter: String,
    /// Also write JSON logs to a daily-rolling file
    pub json_file: bool,
    /// Directory for log files, defaults to the platform data directory
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "warn".to_string(),
            json_file: false,
            log_dir: None,
        }
    }
}

impl AdminConfig {
    /// `<config dir>/hms/admin.toml`
    pub fn default_path() -> Result<PathBuf> {
        dirs::config_dir()
            .context("Could not determine config directory")
            .map(|p| p.join("hms").join("admin.toml"))
    }

    /// Load from `path`, or from the default location when `None`.
    ///
    /// A missing file yields the defaults; a file that exists but does not
    /// parse is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::default_path()?,
        };

        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config = Self::parse(&contents)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;
        tracing::debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }

    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.backend.timeout_ms)
    }

    pub fn admin_options(&self) -> AdminOptions {
        AdminOptions {
            catalog_table: self.catalog.table.clone(),
            timeout: self.timeout(),
        }
    }

    pub fn connection_config(&self) -> ConnectionConfig {
        let mut config = ConnectionConfig::new(&self.backend.driver, "hms");
        config.database = Some(self.backend.database.clone());
        config.with_param("path", self.backend.database.clone())
    }
}
