//! Scheduler backends.
//!
//! A backend submits job scripts to a cluster scheduler and reports on
//! queued jobs. Backends are registered explicitly in a [`BackendRegistry`]
//! at startup and detected by probing `PATH` for their submit executable.
//!
//! - **qsub**: PBS/Torque (`qsub`, `qstat`)
//! - **slurm**: Slurm (`sbatch`, `squeue`)

mod command;
mod registry;
mod scheduler;

pub use registry::BackendRegistry;

use crate::error::Result;
use std::path::Path;

/// A cluster scheduler integration.
pub trait Backend {
    /// Name used in configuration and as the template prefix (`<name>.*`).
    fn name(&self) -> &str;

    /// Whether the scheduler's tools are present on this host.
    fn detect(&self) -> bool;

    /// Submit `script` and return the scheduler's job id.
    ///
    /// Fails without running anything if `script` does not exist.
    fn submit(&self, script: &Path) -> Result<String>;

    /// Show the status of one job.
    fn job_status(&self, job_id: &str) -> Result<()>;

    /// Show the queue, optionally limited to `user`'s jobs.
    fn status(&self, user: Option<&str>) -> Result<()>;
}
