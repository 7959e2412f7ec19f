//! Path management for the intake client's configuration files.
//!
//! Paths are resolved with the `dirs` crate so that every platform gets its
//! native configuration location.

use std::path::{Path, PathBuf};

const APP_DIR_NAME: &str = "clinic-intake";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Platform configuration directory could not be determined.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find configuration directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Path layout of the intake client.
///
/// # Directory Structure
///
/// ```text
/// ~/.config/clinic-intake/     # Config directory
/// ├── config.toml              # Client configuration
/// └── logs/                    # Application logs
///     └── intake.log.YYYY-MM-DD
/// ```
///
/// A base path may be supplied to relocate the whole tree (used by tests and
/// by the `--config` flag's parent directory).
#[derive(Debug, Clone)]
pub struct IntakePaths {
    base: Option<PathBuf>,
}

impl IntakePaths {
    pub fn new(base: Option<&Path>) -> Self {
        Self {
            base: base.map(Path::to_path_buf),
        }
    }

    /// Returns the configuration directory.
    pub fn config_dir(&self) -> Result<PathBuf, PathError> {
        match &self.base {
            Some(base) => Ok(base.clone()),
            None => dirs::config_dir()
                .map(|dir| dir.join(APP_DIR_NAME))
                .ok_or(PathError::ConfigDirNotFound),
        }
    }

    /// Returns the path to `config.toml`.
    pub fn config_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("config.toml"))
    }

    /// Returns the log directory.
    pub fn logs_dir(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("logs"))
    }

    /// Ensures the log directory exists and returns it.
    pub fn ensure_logs_dir(&self) -> std::io::Result<PathBuf> {
        let dir = self
            .logs_dir()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::NotFound, e.to_string()))?;
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}

impl Default for IntakePaths {
    fn default() -> Self {
        Self::new(None)
    }
}
