//! Harness and connection configuration.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{CheckError, Result};

/// Default connection config file name inside the app directory.
pub const DB_CONFIG_FILE: &str = "db-config.json";

/// Connection settings for the article store, loaded once per run.
#[derive(Clone, Deserialize)]
pub struct ConnectionConfig {
    #[serde(default)]
    pub dsn: Option<String>,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,
    /// Driver options
    #[serde(default)]
    pub options: Map<String, Value>,
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("dsn", &self.dsn)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("options", &self.options)
            .finish()
    }
}

impl ConnectionConfig {
    /// Builds a config for `dsn` with no credentials or options.
    pub fn new(dsn: impl Into<String>) -> Self {
        Self {
            dsn: Some(dsn.into()),
            user: String::new(),
            password: String::new(),
            options: Map::new(),
        }
    }

    /// Adds a driver option.
    pub fn with_option(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.options.insert(key.to_string(), value.into());
        self
    }

    /// Reads and parses a JSON connection config.
    ///
    /// A missing file is `ConfigNotFound` and a file without `dsn` is
    /// `MissingSetting("dsn")`, so callers can report both as failures.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CheckError::ConfigNotFound(path.to_path_buf()));
        }
        let raw = fs::read_to_string(path).map_err(|e| {
            CheckError::ConfigInvalid(format!("{}: {}", path.display(), e))
        })?;
        let config: ConnectionConfig = serde_json::from_str(&raw)
            .map_err(|e| CheckError::ConfigInvalid(format!("{}: {}", path.display(), e)))?;
        config.dsn()?;
        tracing::debug!("Loaded connection config {:?}", config);
        Ok(config)
    }

    /// The DSN, or `MissingSetting` when absent or blank.
    pub fn dsn(&self) -> Result<&str> {
        match self.dsn.as_deref() {
            Some(dsn) if !dsn.trim().is_empty() => Ok(dsn),
            _ => Err(CheckError::MissingSetting("dsn")),
        }
    }
}

/// Harness settings shared by both binaries.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Directory holding the application sources
    pub app_dir: PathBuf,
    /// Connection config path
    pub db_config: PathBuf,
    /// Probe latency limit in milliseconds
    pub latency_threshold_ms: u64,
    /// Round-trip statement used by the latency probe
    pub probe_query: String,
    /// Pause between the two ordering fixtures
    pub order_pause: Duration,
    /// ANSI colors in the report
    pub color: bool,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            app_dir: PathBuf::from("."),
            db_config: PathBuf::from(DB_CONFIG_FILE),
            latency_threshold_ms: 100,
            probe_query: "SELECT 1".to_string(),
            order_pause: Duration::from_millis(100),
            color: true,
        }
    }
}

impl HarnessConfig {
    /// Defaults rooted at `app_dir`, with the connection config inside it.
    pub fn for_app_dir(app_dir: impl Into<PathBuf>) -> Self {
        let app_dir = app_dir.into();
        Self {
            db_config: app_dir.join(DB_CONFIG_FILE),
            app_dir,
            ..Default::default()
        }
    }
}
