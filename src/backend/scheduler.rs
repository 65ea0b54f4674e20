//! Built-in scheduler backends: qsub (PBS/Torque) and slurm.

use super::Backend;
use super::command::{run_attached, run_captured};
use crate::config::CommandOverrides;
use crate::error::{BatchError, Result};
use std::path::Path;

/// Which scheduler family a backend drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerKind {
    Qsub,
    Slurm,
}

impl SchedulerKind {
    pub fn name(self) -> &'static str {
        match self {
            SchedulerKind::Qsub => "qsub",
            SchedulerKind::Slurm => "slurm",
        }
    }

    fn default_submit(self) -> &'static [&'static str] {
        match self {
            SchedulerKind::Qsub => &["qsub"],
            SchedulerKind::Slurm => &["sbatch"],
        }
    }

    fn default_job_status(self) -> &'static [&'static str] {
        match self {
            SchedulerKind::Qsub => &["qstat"],
            SchedulerKind::Slurm => &["squeue", "-j"],
        }
    }

    fn default_status(self) -> &'static [&'static str] {
        match self {
            SchedulerKind::Qsub => &["qstat", "-a"],
            SchedulerKind::Slurm => &["squeue"],
        }
    }

    /// Extract the job id from the submit command's output.
    ///
    /// `sbatch` prints `Submitted batch job <id>` (or `<id>[;cluster]` with
    /// `--parsable`); `qsub` prints the id on its own.
    fn parse_job_id(self, stdout: &str) -> Option<String> {
        let line = stdout.lines().map(str::trim).find(|l| !l.is_empty())?;
        let id = match self {
            SchedulerKind::Qsub => line,
            SchedulerKind::Slurm => {
                let id = line.strip_prefix("Submitted batch job").unwrap_or(line).trim();
                id.split(';').next().unwrap_or(id)
            }
        };
        (!id.is_empty()).then(|| id.to_string())
    }
}

/// A scheduler backend driven through its command-line tools.
#[derive(Debug, Clone)]
pub struct Scheduler {
    kind: SchedulerKind,
    submit: Vec<String>,
    job_status: Vec<String>,
    status: Vec<String>,
}

impl Scheduler {
    /// Build a backend, applying any configured command overrides.
    pub fn new(kind: SchedulerKind, overrides: &CommandOverrides) -> Result<Self> {
        Ok(Self {
            kind,
            submit: command_line(kind, "submit", &overrides.submit, kind.default_submit())?,
            job_status: command_line(
                kind,
                "job_status",
                &overrides.job_status,
                kind.default_job_status(),
            )?,
            status: command_line(kind, "status", &overrides.status, kind.default_status())?,
        })
    }

    /// Program probed on `PATH` to decide whether this scheduler is present.
    pub fn executable(&self) -> &str {
        &self.submit[0]
    }
}

fn command_line(
    kind: SchedulerKind,
    operation: &str,
    configured: &Option<String>,
    default: &[&str],
) -> Result<Vec<String>> {
    let Some(line) = configured else {
        return Ok(default.iter().map(|s| s.to_string()).collect());
    };

    let words = shell_words::split(line).map_err(|e| {
        BatchError::UserError(format!(
            "failed to parse commands.{}.{} '{}': {}\n\
             Fix: check for unmatched quotes or invalid escape sequences.",
            kind.name(),
            operation,
            line,
            e
        ))
    })?;

    if words.is_empty() {
        return Err(BatchError::UserError(format!(
            "commands.{}.{} is empty",
            kind.name(),
            operation
        )));
    }
    Ok(words)
}

impl Backend for Scheduler {
    fn name(&self) -> &str {
        self.kind.name()
    }

    fn detect(&self) -> bool {
        let found = which::which(self.executable()).is_ok();
        log::debug!(
            "Backend {} {} ({})",
            self.name(),
            if found { "detected" } else { "not found" },
            self.executable()
        );
        found
    }

    fn submit(&self, script: &Path) -> Result<String> {
        if !script.exists() {
            return Err(BatchError::MissingFile(script.display().to_string()));
        }

        let mut argv = self.submit.clone();
        argv.push(script.display().to_string());
        let output = run_captured(&argv)?;

        self.kind.parse_job_id(&output.stdout).ok_or_else(|| {
            BatchError::CommandFailed(format!("{} did not report a job id", self.submit[0]))
        })
    }

    fn job_status(&self, job_id: &str) -> Result<()> {
        let mut argv = self.job_status.clone();
        argv.push(job_id.to_string());
        run_attached(&argv)
    }

    fn status(&self, user: Option<&str>) -> Result<()> {
        let mut argv = self.status.clone();
        if let Some(user) = user {
            argv.push("-u".to_string());
            argv.push(user.to_string());
        }
        run_attached(&argv)
    }
}
