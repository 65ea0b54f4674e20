//! Explicit backend registry and selection.

use super::Backend;
use super::scheduler::{Scheduler, SchedulerKind};
use crate::config::Config;
use crate::error::{BatchError, Result};
use std::collections::BTreeMap;

/// Backends known to batch, keyed by name.
#[derive(Default)]
pub struct BackendRegistry {
    backends: BTreeMap<String, Box<dyn Backend>>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in qsub and slurm backends, using any command
    /// overrides from `config`.
    pub fn builtin(config: &Config) -> Result<Self> {
        let mut registry = Self::new();
        for kind in [SchedulerKind::Qsub, SchedulerKind::Slurm] {
            let scheduler = Scheduler::new(kind, &config.overrides_for(kind.name()))?;
            registry.register(Box::new(scheduler));
        }
        Ok(registry)
    }

    /// Register `backend`, replacing any backend with the same name.
    pub fn register(&mut self, backend: Box<dyn Backend>) {
        self.backends.insert(backend.name().to_string(), backend);
    }

    pub fn get(&self, name: &str) -> Option<&dyn Backend> {
        self.backends.get(name).map(|b| b.as_ref())
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.backends.keys().map(String::as_str).collect()
    }

    /// Names of the backends present on this host, sorted.
    pub fn detect(&self) -> Vec<&str> {
        self.backends
            .values()
            .filter(|b| b.detect())
            .map(|b| b.name())
            .collect()
    }

    /// Pick the backend to use.
    ///
    /// An explicit choice wins and must name a registered backend; it is used
    /// even when not detected, so scripts can be generated off-cluster.
    /// Otherwise exactly one detected backend is used as is, and several are
    /// ranked by `preference`, falling back to name order.
    pub fn select(&self, explicit: Option<&str>, preference: &[String]) -> Result<&dyn Backend> {
        if let Some(name) = explicit {
            let backend = self.get(name).ok_or_else(|| {
                BatchError::UserError(format!(
                    "unknown backend '{}'. Available backends: {}",
                    name,
                    self.names().join(", ")
                ))
            })?;
            if !backend.detect() {
                log::warn!(
                    "Backend {} was requested but is not installed on this host",
                    name
                );
            }
            return Ok(backend);
        }

        let detected = self.detect();
        let name = choose(&detected, preference).ok_or_else(|| {
            BatchError::UserError(format!(
                "No backend found! Looked for: {}.\n\
                 Install a scheduler client or set `backend` in the config file.",
                self.names().join(", ")
            ))
        })?;
        if detected.len() > 1 {
            log::debug!(
                "Several backends detected ({}); picked {}",
                detected.join(", "),
                name
            );
        }
        self.get(name)
            .ok_or_else(|| BatchError::UserError(format!("unknown backend '{}'", name)))
    }
}

/// Choose among detected backend names using `preference` order.
///
/// `detected` must be sorted; the first name wins when no preference applies.
fn choose<'a>(detected: &[&'a str], preference: &[String]) -> Option<&'a str> {
    preference
        .iter()
        .find_map(|p| detected.iter().find(|d| **d == p.as_str()).copied())
        .or_else(|| detected.first().copied())
}
