//! Implementation of the `batch stat` command.
//!
//! With a job id the scheduler reports on that job; otherwise it shows the
//! queue, limited to one user's jobs with `--user`. Output goes straight to
//! the terminal.

use crate::backend::Backend;
use crate::cli::StatArgs;
use crate::error::Result;

/// Execute the `batch stat` command.
pub fn cmd_stat(backend: &dyn Backend, args: StatArgs) -> Result<()> {
    match args.job_id {
        Some(job_id) => backend.job_status(&job_id),
        None => backend.status(args.user.as_deref()),
    }
}
