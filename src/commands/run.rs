//! Implementation of the `batch run` command.

use crate::backend::Backend;
use crate::cli::RunArgs;
use crate::error::Result;
use std::path::Path;

/// Submit the script and print the job id reported by the scheduler.
pub fn cmd_run(backend: &dyn Backend, args: RunArgs) -> Result<()> {
    let job_id = submit(backend, Path::new(&args.file))?;
    println!("{}", job_id);
    Ok(())
}

fn submit(backend: &dyn Backend, script: &Path) -> Result<String> {
    let job_id = backend.submit(script)?;
    log::info!("Submitted {} as job {}", script.display(), job_id);
    Ok(job_id)
}
