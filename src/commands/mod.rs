//! Command implementations for batch.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations, and the application context every command runs in.

mod generate;
mod run;
mod stat;

use crate::backend::{Backend, BackendRegistry};
use crate::cli::Command;
use crate::config::Config;
use crate::error::Result;
use crate::paths::AppPaths;

/// Everything a command needs: directories, configuration and backends.
pub struct AppContext {
    pub paths: AppPaths,
    pub config: Config,
    pub registry: BackendRegistry,
    /// Backend named on the command line, if any.
    pub backend_override: Option<String>,
}

impl AppContext {
    /// Resolve directories (creating them if absent), load the config file
    /// and register the built-in backends.
    pub fn load(backend_override: Option<String>) -> Result<Self> {
        let paths = AppPaths::resolve()?;
        paths.ensure_exists()?;
        let config = Config::load_or_default(paths.config_path())?;
        let registry = BackendRegistry::builtin(&config)?;
        Ok(Self {
            paths,
            config,
            registry,
            backend_override,
        })
    }

    /// The backend commands run against.
    ///
    /// The command line wins over `backend` in the config file.
    pub fn backend(&self) -> Result<&dyn Backend> {
        let explicit = self
            .backend_override
            .as_deref()
            .or(self.config.backend.as_deref());
        let backend = self.registry.select(explicit, &self.config.preference)?;
        log::debug!("Using backend {}", backend.name());
        Ok(backend)
    }
}

/// Dispatch a command to its implementation.
pub fn dispatch(ctx: &AppContext, command: Command) -> Result<()> {
    match command {
        Command::Generate(args) => generate::cmd_generate(ctx, args),
        Command::Run(args) => run::cmd_run(ctx.backend()?, args),
        Command::Stat(args) => stat::cmd_stat(ctx.backend()?, args),
    }
}
