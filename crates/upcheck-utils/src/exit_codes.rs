//! Exit code constants for upcheck.
//!
//! # Exit Code Table
//!
//! | Code | Constant | Description |
//! |------|----------|-------------|
//! | 0 | `SUCCESS` | Operation completed successfully |
//! | 1 | `INTERNAL` | General/internal failure |
//! | 2 | `CLI_ARGS` | Invalid CLI arguments or configuration |
//! | 3 | `NO_HOSTS` | No simulation output files were discovered |
//! | 10 | `COMMAND_TIMEOUT` | External command exceeded its timeout |
//! | 60 | `COMMAND_FAILURE` | Playbook or package-manager invocation failed |
//! | 70 | `LLM_FAILURE` | LLM provider call failed |

/// Exit codes matching the documented exit code table.
///
/// Use the named constants, or [`as_i32()`](Self::as_i32) to get the numeric
/// value for `std::process::exit()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(i32);

impl ExitCode {
    /// Success - operation completed successfully
    pub const SUCCESS: ExitCode = ExitCode(0);

    /// Internal error - general failure
    pub const INTERNAL: ExitCode = ExitCode(1);

    /// CLI arguments error - invalid or missing command-line arguments or config
    pub const CLI_ARGS: ExitCode = ExitCode(2);

    /// No hosts - the output directory contained no simulation output files
    pub const NO_HOSTS: ExitCode = ExitCode(3);

    /// Command timeout - an external command exceeded the configured timeout
    pub const COMMAND_TIMEOUT: ExitCode = ExitCode(10);

    /// Command failure - a playbook or package-manager invocation failed
    pub const COMMAND_FAILURE: ExitCode = ExitCode(60);

    /// LLM failure - the risk-analysis provider call failed
    pub const LLM_FAILURE: ExitCode = ExitCode(70);

    /// Get the numeric exit code value.
    ///
    /// Use this with `std::process::exit()`.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self.0
    }

    /// Create an ExitCode from a raw i32 value.
    ///
    /// Prefer the named constants when possible.
    #[must_use]
    pub const fn from_i32(code: i32) -> Self {
        ExitCode(code)
    }
}

impl From<i32> for ExitCode {
    fn from(code: i32) -> Self {
        ExitCode(code)
    }
}
