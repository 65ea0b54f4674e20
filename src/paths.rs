//! Per-user directory resolution for batch.
//!
//! Templates live in the data directory and `config.yaml` in the config
//! directory. Both default to a `batch_generator` folder under the platform's
//! standard locations and can be overridden through environment variables.

use crate::config::CONFIG_FILE;
use crate::error::{BatchError, Result};
use std::env;
use std::path::{Path, PathBuf};

/// Folder name under the platform data and config directories.
pub const APP_DIR: &str = "batch_generator";

/// Overrides the template directory.
pub const DATA_DIR_ENV: &str = "BATCHGEN_DATA_DIR";

/// Overrides the config directory.
pub const CONFIG_DIR_ENV: &str = "BATCHGEN_CONFIG_DIR";

/// Resolved directories used by batch. All paths are absolute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    /// Directory holding `<backend>.*` templates.
    pub data_dir: PathBuf,
    /// Directory holding `config.yaml`.
    pub config_dir: PathBuf,
}

impl AppPaths {
    /// Resolve directories from the environment and platform defaults.
    pub fn resolve() -> Result<Self> {
        let data_dir = match env::var_os(DATA_DIR_ENV) {
            Some(dir) => PathBuf::from(dir),
            None => dirs::data_dir()
                .ok_or_else(|| {
                    BatchError::UserError(format!(
                        "cannot determine the user data directory; set {}",
                        DATA_DIR_ENV
                    ))
                })?
                .join(APP_DIR),
        };

        let config_dir = match env::var_os(CONFIG_DIR_ENV) {
            Some(dir) => PathBuf::from(dir),
            None => dirs::config_dir()
                .ok_or_else(|| {
                    BatchError::UserError(format!(
                        "cannot determine the user config directory; set {}",
                        CONFIG_DIR_ENV
                    ))
                })?
                .join(APP_DIR),
        };

        Ok(Self::new(data_dir, config_dir))
    }

    /// Build paths from explicit directories.
    pub fn new<P: Into<PathBuf>, Q: Into<PathBuf>>(data_dir: P, config_dir: Q) -> Self {
        Self {
            data_dir: data_dir.into(),
            config_dir: config_dir.into(),
        }
    }

    /// Path to `config.yaml`.
    pub fn config_path(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE)
    }

    /// Create both directories if they are missing.
    ///
    /// Creation is idempotent and takes no lock.
    pub fn ensure_exists(&self) -> Result<()> {
        for dir in [&self.data_dir, &self.config_dir] {
            ensure_dir(dir)?;
        }
        Ok(())
    }
}

fn ensure_dir(dir: &Path) -> Result<()> {
    if dir.is_dir() {
        log::debug!("Found directory {}", dir.display());
        return Ok(());
    }

    log::debug!("Creating directory {}", dir.display());
    std::fs::create_dir_all(dir).map_err(|e| {
        BatchError::UserError(format!(
            "failed to create directory '{}': {}",
            dir.display(),
            e
        ))
    })
}

/// The absolute current working directory.
pub fn current_dir() -> Result<PathBuf> {
    env::current_dir().map_err(|e| {
        BatchError::UserError(format!("failed to get current working directory: {}", e))
    })
}
