//! CLI argument parsing for batch.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{Parser, Subcommand};

/// Generate, run and track jobs in a unified way.
///
/// Job scripts are generated from templates stored in the data directory
/// (`<backend>.NAME`), filling in `{{...}}` markers interactively.
#[derive(Parser, Debug)]
#[command(name = "batch")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Be verbose.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Backend to use instead of the detected one (e.g. slurm, qsub).
    #[arg(long, global = true, value_name = "NAME")]
    pub backend: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands for batch.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate batch jobs.
    ///
    /// Picks a template for the active backend, asks for every marker's
    /// value, and writes the filled-in script.
    #[command(visible_alias = "g")]
    Generate(GenerateArgs),

    /// Run a batch job.
    ///
    /// Submits the script to the scheduler and prints the job id.
    #[command(visible_alias = "r")]
    Run(RunArgs),

    /// Get stats.
    ///
    /// Shows one job's status, or the queue when no job id is given.
    #[command(visible_alias = "s")]
    Stat(StatArgs),
}

/// Arguments for the `generate` command.
#[derive(Parser, Debug)]
pub struct GenerateArgs {
    /// Name of the file to generate (default: job.sh, or `output` from the config).
    pub output: Option<String>,
}

/// Arguments for the `run` command.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// The file to run.
    pub file: String,
}

/// Arguments for the `stat` command.
#[derive(Parser, Debug)]
pub struct StatArgs {
    /// Job id to query. If omitted, shows the queue.
    pub job_id: Option<String>,

    /// Only show jobs belonging to this user.
    #[arg(short, long, conflicts_with = "job_id")]
    pub user: Option<String>,
}

impl Cli {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
