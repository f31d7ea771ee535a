use std::fmt;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Library-level error type with user-friendly reporting.
///
/// `UpcheckError` is the primary error type returned by upcheck library
/// operations. Library code returns `UpcheckError` and does NOT call
/// `std::process::exit()`; only the CLI maps errors to exit codes.
#[derive(Error, Debug)]
pub enum UpcheckError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Command execution error: {0}")]
    Runner(#[from] RunnerError),

    #[error("Output file error: {0}")]
    Output(#[from] OutputError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("No simulation output files found in '{dir}'")]
    NoHosts { dir: String },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl UpcheckError {
    /// Map this error to the documented exit code table.
    #[must_use]
    pub fn to_exit_code(&self) -> crate::exit_codes::ExitCode {
        use crate::exit_codes::ExitCode;
        match self {
            Self::Config(_) => ExitCode::CLI_ARGS,
            Self::Runner(RunnerError::Timeout { .. }) => ExitCode::COMMAND_TIMEOUT,
            Self::Runner(_) => ExitCode::COMMAND_FAILURE,
            Self::Llm(_) => ExitCode::LLM_FAILURE,
            Self::NoHosts { .. } => ExitCode::NO_HOSTS,
            Self::Output(_) | Self::Io(_) => ExitCode::INTERNAL,
        }
    }
}

/// Error categories for grouping similar errors in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Execution,
    Outputs,
    LlmIntegration,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration => write!(f, "Configuration"),
            Self::Execution => write!(f, "Execution"),
            Self::Outputs => write!(f, "Outputs"),
            Self::LlmIntegration => write!(f, "LLM Integration"),
        }
    }
}

/// Trait for providing user-friendly error reporting.
///
/// Implementations supply a plain-language message, optional background
/// context, and actionable suggestions the CLI prints alongside the error.
pub trait UserFriendlyError {
    /// Primary message shown to the operator.
    fn user_message(&self) -> String;

    /// Optional background explaining the error class.
    fn context(&self) -> Option<String> {
        None
    }

    /// Actionable suggestions, most likely fix first.
    fn suggestions(&self) -> Vec<String> {
        Vec::new()
    }

    /// Category for grouping in reports.
    fn category(&self) -> ErrorCategory;
}

/// Configuration file and CLI argument errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid config file: {0}")]
    InvalidFile(String),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Config file not found: {}", path.display())]
    NotFound { path: PathBuf },
}

impl UserFriendlyError for ConfigError {
    fn user_message(&self) -> String {
        match self {
            Self::InvalidFile(msg) => format!("Configuration file is invalid: {msg}"),
            Self::InvalidValue { key, value } => {
                format!("Invalid configuration value for '{key}': {value}")
            }
            Self::NotFound { path } => {
                format!("Configuration file not found: {}", path.display())
            }
        }
    }

    fn context(&self) -> Option<String> {
        Some(
            "Configuration is loaded with precedence: CLI flags > .upcheck/config.toml > defaults."
                .to_string(),
        )
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidFile(_) => vec![
                "Check the TOML syntax of .upcheck/config.toml".to_string(),
                "Compare against the documented [defaults], [playbooks], [executor], [llm] sections".to_string(),
            ],
            Self::InvalidValue { .. } => vec![
                "Review the allowed values for this key in the documentation".to_string(),
            ],
            Self::NotFound { .. } => vec![
                "Create .upcheck/config.toml or drop the --config flag to use defaults".to_string(),
            ],
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Configuration
    }
}

/// Process execution errors for playbook and package-manager invocations.
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Failed to execute '{program}': {reason}")]
    ExecutionFailed { program: String, reason: String },

    #[error("'{program}' exited with status {code}: {stderr}")]
    CommandFailed {
        program: String,
        code: i32,
        stderr: String,
    },

    #[error("'{program}' was terminated by a signal")]
    Killed { program: String },

    #[error("Execution timed out after {duration:?}")]
    Timeout { duration: Duration },

    #[error("Binary not found: {reason}")]
    BinaryNotFound { reason: String },
}

impl UserFriendlyError for RunnerError {
    fn user_message(&self) -> String {
        match self {
            Self::ExecutionFailed { program, reason } => {
                format!("Failed to execute '{program}': {reason}")
            }
            Self::CommandFailed {
                program,
                code,
                stderr,
            } => format!("'{program}' failed with exit status {code}: {stderr}"),
            Self::Killed { program } => format!("'{program}' was terminated by a signal"),
            Self::Timeout { duration } => {
                format!("Command timed out after {duration:?}")
            }
            Self::BinaryNotFound { reason } => format!("Required binary not found: {reason}"),
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::CommandFailed { .. } => Some(
                "A failed simulation or upgrade step aborts the run; nothing was applied beyond the failing command.".to_string(),
            ),
            Self::Timeout { .. } => Some(
                "Long playbook runs can exceed the configured command timeout.".to_string(),
            ),
            _ => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::ExecutionFailed { .. } | Self::BinaryNotFound { .. } => vec![
                "Check that ansible-playbook (or apt-get) is installed and in PATH".to_string(),
                "Set [playbooks] binary in .upcheck/config.toml to an explicit path".to_string(),
            ],
            Self::CommandFailed { .. } => vec![
                "Re-run with --verbose to see the full command output".to_string(),
                "Verify the playbook path and inventory are correct".to_string(),
            ],
            Self::Timeout { .. } => vec![
                "Increase command_timeout in [defaults] or via --command-timeout".to_string(),
            ],
            Self::Killed { .. } => vec![
                "Check system logs for OOM or manual termination".to_string(),
            ],
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Execution
    }
}

/// Errors loading per-host output files.
///
/// `Missing` is the skip-this-host signal: the per-host loop logs a warning
/// and continues instead of aborting the run.
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("missing output file for host '{host}': {}", path.display())]
    Missing { host: String, path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl OutputError {
    /// Whether this error means the host simply produced no output
    /// (skip the host) rather than a real I/O failure.
    #[must_use]
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing { .. })
    }
}

impl UserFriendlyError for OutputError {
    fn user_message(&self) -> String {
        match self {
            Self::Missing { host, path } => format!(
                "Missing output file for host '{host}': {}",
                path.display()
            ),
            Self::Io { path, source } => {
                format!("Failed to read {}: {source}", path.display())
            }
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Missing { .. } => vec![
                "Re-run the simulation step; the playbook may have failed for this host".to_string(),
            ],
            Self::Io { .. } => vec![
                "Check file permissions in the output directory".to_string(),
            ],
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Outputs
    }
}

/// Errors from LLM backend operations.
#[derive(Error, Debug)]
pub enum LlmError {
    /// Transport-level failure (HTTP connectivity, malformed response)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Provider authentication failure (401, 403, missing API key)
    #[error("Provider authentication error: {0}")]
    ProviderAuth(String),

    /// Provider quota/rate limit exceeded (429)
    #[error("Provider quota exceeded: {0}")]
    ProviderQuota(String),

    /// Provider service outage (5xx errors)
    #[error("Provider outage: {0}")]
    ProviderOutage(String),

    /// Invocation timed out
    #[error("Timeout after {duration:?}")]
    Timeout { duration: Duration },

    /// Configuration error
    #[error("Misconfiguration: {0}")]
    Misconfiguration(String),

    /// Unsupported provider
    #[error("Unsupported: {0}")]
    Unsupported(String),
}

impl UserFriendlyError for LlmError {
    fn user_message(&self) -> String {
        match self {
            Self::Transport(msg) => format!("LLM transport error: {msg}"),
            Self::ProviderAuth(msg) => format!("LLM provider authentication failed: {msg}"),
            Self::ProviderQuota(msg) => format!("LLM provider quota exceeded: {msg}"),
            Self::ProviderOutage(msg) => format!("LLM provider service outage: {msg}"),
            Self::Timeout { duration } => {
                format!("LLM request timed out after {duration:?}")
            }
            Self::Misconfiguration(msg) => format!("LLM configuration error: {msg}"),
            Self::Unsupported(msg) => format!("LLM provider not supported: {msg}"),
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::ProviderAuth(_) => Some(
                "Authentication errors indicate a missing or invalid API key.".to_string(),
            ),
            Self::ProviderQuota(_) => Some(
                "Quota errors occur when rate limits or usage limits are exceeded.".to_string(),
            ),
            Self::ProviderOutage(_) => {
                Some("Provider outages are temporary service disruptions.".to_string())
            }
            _ => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Transport(_) => vec![
                "Verify network connectivity".to_string(),
                "Re-run with --verbose for detailed error information".to_string(),
            ],
            Self::ProviderAuth(_) => vec![
                "Check that the API key environment variable is set (GEMINI_API_KEY by default)".to_string(),
                "Verify the key is valid and not expired".to_string(),
            ],
            Self::ProviderQuota(_) | Self::ProviderOutage(_) => vec![
                "Wait a few minutes and try again".to_string(),
                "Check the provider's status or usage dashboard".to_string(),
            ],
            Self::Timeout { .. } => vec![
                "Increase llm_timeout in [defaults]".to_string(),
            ],
            Self::Misconfiguration(_) => vec![
                "Check the [llm] section of .upcheck/config.toml".to_string(),
            ],
            Self::Unsupported(_) => vec![
                "Supported providers: gemini, anthropic".to_string(),
            ],
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::ProviderAuth(_) | Self::Misconfiguration(_) | Self::Unsupported(_) => {
                ErrorCategory::Configuration
            }
            _ => ErrorCategory::LlmIntegration,
        }
    }
}

impl UserFriendlyError for UpcheckError {
    fn user_message(&self) -> String {
        match self {
            Self::Config(e) => e.user_message(),
            Self::Runner(e) => e.user_message(),
            Self::Output(e) => e.user_message(),
            Self::Llm(e) => e.user_message(),
            Self::NoHosts { dir } => format!(
                "No simulation output files found in '{dir}'. Did the simulation run succeed?"
            ),
            Self::Io(e) => format!("I/O error: {e}"),
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::Config(e) => e.context(),
            Self::Runner(e) => e.context(),
            Self::Output(e) => e.context(),
            Self::Llm(e) => e.context(),
            Self::NoHosts { .. } => Some(
                "Hosts are discovered from simulate_output_<host>.txt files in the output directory."
                    .to_string(),
            ),
            Self::Io(_) => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Config(e) => e.suggestions(),
            Self::Runner(e) => e.suggestions(),
            Self::Output(e) => e.suggestions(),
            Self::Llm(e) => e.suggestions(),
            Self::NoHosts { .. } => vec![
                "Run 'upcheck simulate <package>' first".to_string(),
                "Check --output-dir points at the directory the playbook writes to".to_string(),
            ],
            Self::Io(_) => Vec::new(),
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Config(e) => e.category(),
            Self::Runner(e) => e.category(),
            Self::Output(e) => e.category(),
            Self::Llm(e) => e.category(),
            Self::NoHosts { .. } => ErrorCategory::Outputs,
            Self::Io(_) => ErrorCategory::Outputs,
        }
    }
}

/// Render an error report for the terminal: message, context, suggestions.
#[must_use]
pub fn render_report(err: &dyn UserFriendlyError) -> String {
    let mut out = format!("✗ {}", err.user_message());
    if let Some(context) = err.context() {
        out.push_str("\n\n");
        out.push_str(&context);
    }
    let suggestions = err.suggestions();
    if !suggestions.is_empty() {
        out.push_str("\n\nSuggestions:");
        for s in suggestions {
            out.push_str("\n  - ");
            out.push_str(&s);
        }
    }
    out
}
