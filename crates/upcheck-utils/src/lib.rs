//! Shared infrastructure for upcheck: error types, exit codes, and logging.

pub mod error;
pub mod exit_codes;
pub mod logging;

pub use error::{
    ConfigError, ErrorCategory, LlmError, OutputError, RunnerError, UpcheckError,
    UserFriendlyError,
};
pub use exit_codes::ExitCode;
