//! Driver registry for managing available backends

use hms_core::{ConnectionConfig, Connection, DatabaseDriver, DialectInfo, HmsError, Result};
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of available backend drivers
pub struct DriverRegistry {
    drivers: HashMap<String, Arc<dyn DatabaseDriver>>,
}

impl DriverRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            drivers: HashMap::new(),
        }
    }

    /// Create a registry with all built-in drivers registered
    pub fn with_defaults() -> Self {
        #[allow(unused_mut)]
        let mut registry = Self::new();

        #[cfg(feature = "sqlite")]
        registry.register(Arc::new(crate::sqlite::SqliteDriver::new()));

        registry
    }

    /// Register a new driver
    pub fn register(&mut self, driver: Arc<dyn DatabaseDriver>) {
        let name = driver.name().to_string();
        tracing::info!(driver = %name, "registering backend driver");
        self.drivers.insert(name, driver);
    }

    /// Get a driver by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn DatabaseDriver>> {
        let driver = self.drivers.get(name).cloned();
        if driver.is_none() {
            tracing::warn!(driver = %name, "driver not found in registry");
        }
        driver
    }

    /// List all registered driver names, sorted
    pub fn list(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.drivers.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Check if a driver is registered
    pub fn has(&self, name: &str) -> bool {
        self.drivers.contains_key(name)
    }

    /// Get dialect info for a driver by name
    pub fn dialect_info(&self, name: &str) -> Option<DialectInfo> {
        self.drivers.get(name).map(|driver| driver.dialect_info())
    }

    /// Resolve the driver named in `config` and open a connection with it
    pub async fn connect(&self, config: &ConnectionConfig) -> Result<Arc<dyn Connection>> {
        let driver = self.get(&config.driver).ok_or_else(|| {
            HmsError::Driver(format!(
                "unknown driver '{}', available: {}",
                config.driver,
                self.list().join(", ")
            ))
        })?;
        driver.connect(config).await
    }
}

impl Default for DriverRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Get dialect info for a driver by name without needing a registry instance.
///
/// Unknown drivers get the generic dialect.
pub fn get_dialect_info(driver_name: &str) -> DialectInfo {
    match driver_name.to_lowercase().as_str() {
        #[cfg(feature = "sqlite")]
        "sqlite" | "sqlite3" => crate::sqlite::sqlite_dialect(),
        _ => DialectInfo::default(),
    }
}
