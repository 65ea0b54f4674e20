//! Scheduler command runner.
//!
//! Provides a thin wrapper around `std::process::Command` with captured
//! output and structured error handling. All scheduler invocations go through
//! this module.

use crate::error::{BatchError, Result};
use std::process::{Command, Output};

/// Captured output of a successful command.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Standard output from the command (trimmed).
    pub stdout: String,
    /// Standard error from the command (trimmed).
    pub stderr: String,
}

impl CommandOutput {
    fn from_output(output: &Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
    }
}

fn split_argv(argv: &[String]) -> Result<(&String, &[String])> {
    argv.split_first()
        .ok_or_else(|| BatchError::UserError("scheduler command is empty".to_string()))
}

fn spawn_error(program: &str, e: std::io::Error) -> BatchError {
    BatchError::CommandFailed(format!("failed to execute {}: {}", program, e))
}

fn exit_code_string(code: Option<i32>) -> String {
    code.map(|c| c.to_string())
        .unwrap_or_else(|| "none (terminated by signal)".to_string())
}

/// Run `argv` and capture its output.
///
/// # Returns
///
/// * `Ok(CommandOutput)` - On exit code 0
/// * `Err(BatchError::CommandFailed)` - If the program cannot start or exits non-zero
pub fn run_captured(argv: &[String]) -> Result<CommandOutput> {
    let (program, args) = split_argv(argv)?;
    log::debug!("Running {}", shell_words::join(argv));

    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|e| spawn_error(program, e))?;

    let captured = CommandOutput::from_output(&output);

    if output.status.success() {
        Ok(captured)
    } else {
        let detail = if captured.stderr.is_empty() {
            &captured.stdout
        } else {
            &captured.stderr
        };
        Err(BatchError::CommandFailed(format!(
            "{} returned exit code {}: {}",
            program,
            exit_code_string(output.status.code()),
            detail
        )))
    }
}

/// Run `argv` with the terminal attached, so its output reaches the user.
pub fn run_attached(argv: &[String]) -> Result<()> {
    let (program, args) = split_argv(argv)?;
    log::debug!("Running {}", shell_words::join(argv));

    let status = Command::new(program)
        .args(args)
        .status()
        .map_err(|e| spawn_error(program, e))?;

    if status.success() {
        Ok(())
    } else {
        Err(BatchError::CommandFailed(format!(
            "{} returned exit code {}",
            program,
            exit_code_string(status.code())
        )))
    }
}
