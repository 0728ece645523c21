//! Opens the article store from a `ConnectionConfig`.

use std::time::Duration;

use rusqlite::{Connection, OpenFlags};
use serde_json::Value;

use crate::config::ConnectionConfig;
use crate::error::{CheckError, Result};

const SQLITE_SCHEME: &str = "sqlite:";
const MEMORY_TARGET: &str = ":memory:";

/// Where a DSN points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Memory,
    File(String),
}

/// Splits `sqlite:<path>` / `sqlite::memory:` into a target.
pub fn parse_dsn(dsn: &str) -> Result<Target> {
    let Some(rest) = dsn.strip_prefix(SQLITE_SCHEME) else {
        let driver = dsn.split(':').next().unwrap_or(dsn);
        return Err(CheckError::UnsupportedDriver(driver.to_string()));
    };
    match rest {
        "" => Err(CheckError::MissingSetting("dsn path")),
        MEMORY_TARGET => Ok(Target::Memory),
        path => Ok(Target::File(path.to_string())),
    }
}

/// Driver options understood by the sqlite driver.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct DriverOptions {
    create: bool,
    read_only: bool,
    busy_timeout_ms: Option<u64>,
    foreign_keys: Option<bool>,
}

impl DriverOptions {
    fn from_config(config: &ConnectionConfig) -> Result<Self> {
        let mut options = DriverOptions::default();
        for (key, value) in &config.options {
            match key.as_str() {
                "create" => options.create = expect_bool(key, value)?,
                "read_only" => options.read_only = expect_bool(key, value)?,
                "busy_timeout_ms" => {
                    options.busy_timeout_ms = Some(value.as_u64().ok_or_else(|| {
                        CheckError::ConfigInvalid(format!(
                            "option '{}' must be a non-negative integer",
                            key
                        ))
                    })?)
                }
                "foreign_keys" => options.foreign_keys = Some(expect_bool(key, value)?),
                other => tracing::warn!("Ignoring unknown driver option '{}'", other),
            }
        }
        Ok(options)
    }

    fn flags(&self) -> OpenFlags {
        let mut flags = OpenFlags::SQLITE_OPEN_URI | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        if self.read_only {
            flags |= OpenFlags::SQLITE_OPEN_READ_ONLY;
        } else {
            flags |= OpenFlags::SQLITE_OPEN_READ_WRITE;
            if self.create {
                flags |= OpenFlags::SQLITE_OPEN_CREATE;
            }
        }
        flags
    }
}

fn expect_bool(key: &str, value: &Value) -> Result<bool> {
    value
        .as_bool()
        .ok_or_else(|| CheckError::ConfigInvalid(format!("option '{}' must be a boolean", key)))
}

/// Opens a connection. User and password are accepted for every driver and
/// unused by sqlite.
pub fn open(config: &ConnectionConfig) -> Result<Connection> {
    let target = parse_dsn(config.dsn()?)?;
    let options = DriverOptions::from_config(config)?;

    let conn = match &target {
        Target::Memory => Connection::open_in_memory()?,
        Target::File(path) => Connection::open_with_flags(path, options.flags())?,
    };

    if let Some(ms) = options.busy_timeout_ms {
        conn.busy_timeout(Duration::from_millis(ms))?;
    }
    if let Some(enabled) = options.foreign_keys {
        conn.pragma_update(None, "foreign_keys", enabled)?;
    }

    tracing::debug!("Opened connection to {:?} as '{}'", target, config.user);
    Ok(conn)
}
