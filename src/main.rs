//! Batch: generate, run and track cluster batch jobs.
//!
//! This is the main entry point for the `batch` CLI. It parses arguments,
//! sets up logging, loads the application context, dispatches to the
//! appropriate command handler, and handles errors with proper exit codes.

mod backend;
mod cli;
mod commands;
pub mod config;
pub mod error;
pub mod exit_codes;
pub mod fs;
pub mod paths;
pub mod template;
#[cfg(test)]
mod test_support;

use clap::CommandFactory;
use cli::Cli;
use std::process::ExitCode;

fn setup_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // RUST_LOG, when set, takes precedence over -v.
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse_args();
    setup_logging(cli.verbose);

    let Some(command) = cli.command else {
        // No subcommand: show help and exit cleanly
        return match Cli::command().print_help() {
            Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
            Err(_) => ExitCode::from(exit_codes::USER_ERROR as u8),
        };
    };

    let result = commands::AppContext::load(cli.backend)
        .and_then(|ctx| commands::dispatch(&ctx, command));

    match result {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(err) => {
            // Print user-actionable error message to stderr
            eprintln!("Error: {}", err);

            // Return appropriate exit code
            ExitCode::from(err.exit_code() as u8)
        }
    }
}
