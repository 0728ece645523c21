//! Source files under test.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{CheckError, Result};

/// Artifact name of the CRUD page.
pub const INDEX: &str = "index";
/// Artifact name of the form input validation module.
pub const VALIDATION: &str = "validation";

/// Named source text, read once per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub name: String,
    pub source_text: String,
}

impl Artifact {
    pub fn new(name: impl Into<String>, source_text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source_text: source_text.into(),
        }
    }

    /// Reads the artifact from disk.
    pub fn load(name: &str, path: &Path) -> Result<Self> {
        let source_text =
            fs::read_to_string(path).map_err(|e| CheckError::ArtifactUnreadable {
                name: name.to_string(),
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        tracing::debug!("Loaded artifact {} ({} bytes)", name, source_text.len());
        Ok(Self::new(name, source_text))
    }
}

/// File locations of the application's checked sources.
#[derive(Debug, Clone)]
pub struct AppLayout {
    pub app_dir: PathBuf,
}

impl AppLayout {
    pub fn new(app_dir: impl Into<PathBuf>) -> Self {
        Self {
            app_dir: app_dir.into(),
        }
    }

    /// Path of the file backing an artifact name (`index` -> `index.php`).
    pub fn path_of(&self, name: &str) -> PathBuf {
        self.app_dir.join(format!("{}.php", name))
    }

    pub fn load(&self, name: &str) -> Result<Artifact> {
        Artifact::load(name, &self.path_of(name))
    }
}
