//! Error types for the batch CLI.
//!
//! Uses thiserror for derive macros and provides user-actionable error messages.

use crate::exit_codes;
use crate::template::TemplateError;
use thiserror::Error;

/// Main error type for batch operations.
///
/// Each variant maps to a specific exit code. Answers rejected during
/// prompting never show up here: the prompter retries them itself.
#[derive(Error, Debug)]
pub enum BatchError {
    /// Invalid arguments, configuration, or environment.
    #[error("{0}")]
    UserError(String),

    /// A file that an operation needs does not exist.
    #[error("file '{0}' does not exist")]
    MissingFile(String),

    /// The template could not be rendered.
    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    /// A scheduler command could not run or exited non-zero.
    #[error("Command failed: {0}")]
    CommandFailed(String),
}

impl BatchError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            BatchError::UserError(_) => exit_codes::USER_ERROR,
            BatchError::MissingFile(_) => exit_codes::USER_ERROR,
            BatchError::Template(_) => exit_codes::TEMPLATE_ERROR,
            BatchError::CommandFailed(_) => exit_codes::COMMAND_FAILURE,
        }
    }
}

/// Result type alias for batch operations.
pub type Result<T> = std::result::Result<T, BatchError>;
