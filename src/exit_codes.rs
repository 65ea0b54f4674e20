//! Exit code constants for the batch CLI.
//!
//! - 0: Success
//! - 1: User error (missing templates, missing files, bad config, no backend)
//! - 2: Template error (malformed marker, unknown type, failed expression)
//! - 3: Scheduler command failure

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: missing templates or files, invalid configuration, no backend.
pub const USER_ERROR: i32 = 1;

/// Template error: malformed marker, unknown type token, or expression failure.
pub const TEMPLATE_ERROR: i32 = 2;

/// Scheduler command failure: the command could not run or exited non-zero.
pub const COMMAND_FAILURE: i32 = 3;
