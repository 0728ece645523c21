//! Harness error types.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for harness operations
pub type Result<T> = std::result::Result<T, CheckError>;

/// Harness operation errors.
///
/// These are faults, not check failures: a rule that finds its pattern
/// reports `TestOutcome::Fail`, while an unreadable file is a `CheckError`.
#[derive(Error, Debug, Clone)]
pub enum CheckError {
    /// Source artifact could not be read
    #[error("Unable to read artifact '{name}' at {}: {reason}", .path.display())]
    ArtifactUnreadable {
        name: String,
        path: PathBuf,
        reason: String,
    },

    /// Application entry file is missing
    #[error("Unable to find {}", .0.display())]
    AppNotFound(PathBuf),

    /// Connection config file is missing
    #[error("{} missing", .0.display())]
    ConfigNotFound(PathBuf),

    /// Connection config file exists but cannot be parsed
    #[error("Invalid connection config: {0}")]
    ConfigInvalid(String),

    /// Required setting absent from the connection config
    #[error("{0} not defined")]
    MissingSetting(&'static str),

    /// DSN names a driver this harness cannot open
    #[error("Unsupported driver '{0}'")]
    UnsupportedDriver(String),

    /// Error reported by the database
    #[error("Database error: {0}")]
    Database(String),

    /// Rule pattern failed to compile
    #[error("Invalid pattern: {0}")]
    Pattern(String),
}

impl From<rusqlite::Error> for CheckError {
    fn from(err: rusqlite::Error) -> Self {
        CheckError::Database(err.to_string())
    }
}

impl From<regex::Error> for CheckError {
    fn from(err: regex::Error) -> Self {
        CheckError::Pattern(err.to_string())
    }
}
