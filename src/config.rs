//! Configuration model for batch.
//!
//! This module defines the Config struct that represents `config.yaml` in the
//! per-user config directory. It supports forward-compatible YAML parsing
//! (unknown fields are ignored), sensible defaults for every field, and
//! validation of config values.

use crate::error::{BatchError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// File name of the configuration inside the config directory.
pub const CONFIG_FILE: &str = "config.yaml";

/// Command overrides for one backend.
///
/// Each value is a command line split with shell quoting rules; it replaces
/// the program (and any leading arguments) of the corresponding operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submit: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_status: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Configuration for batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend to use regardless of what is detected on the host.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<String>,

    /// Order of preference when several backends are detected.
    #[serde(default = "default_preference")]
    pub preference: Vec<String>,

    /// Default output file for `generate`.
    #[serde(default = "default_output")]
    pub output: String,

    /// Per-backend command overrides, keyed by backend name.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub commands: BTreeMap<String, CommandOverrides>,
}

fn default_preference() -> Vec<String> {
    vec!["slurm".to_string(), "qsub".to_string()]
}

fn default_output() -> String {
    "job.sh".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: None,
            preference: default_preference(),
            output: default_output(),
            commands: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Load config from a YAML file, falling back to defaults if it is absent.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Load config from a YAML file.
    ///
    /// Unknown fields in the YAML are silently ignored for forward compatibility.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            BatchError::UserError(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Parse config from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // An empty document deserializes as null rather than an empty map.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = serde_yaml::from_str(yaml)
            .map_err(|e| BatchError::UserError(format!("failed to parse config YAML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate config values and return error on invalid values.
    ///
    /// Validation rules:
    /// - `backend`, when set, must be non-empty
    /// - `preference` entries must be non-empty
    /// - `output` must be non-empty
    pub fn validate(&self) -> Result<()> {
        if let Some(backend) = &self.backend
            && backend.trim().is_empty()
        {
            return Err(BatchError::UserError(
                "config validation failed: backend must not be empty".to_string(),
            ));
        }

        if self.preference.iter().any(|p| p.trim().is_empty()) {
            return Err(BatchError::UserError(
                "config validation failed: preference entries must be non-empty".to_string(),
            ));
        }

        if self.output.trim().is_empty() {
            return Err(BatchError::UserError(
                "config validation failed: output must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Command overrides configured for `backend`, if any.
    pub fn overrides_for(&self, backend: &str) -> CommandOverrides {
        self.commands.get(backend).cloned().unwrap_or_default()
    }
}
