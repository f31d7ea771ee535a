use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use upcheck_utils::error::ConfigError;

/// Default playbook that simulates the upgrade and gathers reverse deps.
pub const DEFAULT_CHECK_PLAYBOOK: &str = "check_and_simulate.yml";

/// Default playbook that applies the upgrade on a host.
pub const DEFAULT_UPGRADE_PLAYBOOK: &str = "upgrade_package.yml";

/// Executor mode: how simulation and upgrade commands are executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutorMode {
    /// Delegate to ansible-playbook against the configured inventory
    Ansible,
    /// Run apt-get/apt-cache directly on the local host
    Apt,
}

impl ExecutorMode {
    /// Convert executor mode to its string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ansible => "ansible",
            Self::Apt => "apt",
        }
    }
}

/// Configuration for upcheck operations.
///
/// Use [`Config::discover()`] for CLI-like behavior that searches for
/// `.upcheck/config.toml` upward from the current directory and applies
/// built-in defaults for unspecified values.
///
/// # Configuration File Format
///
/// ```toml
/// [defaults]
/// output_dir = "."
/// command_timeout = 600
/// llm_timeout = 120
///
/// [playbooks]
/// check = "check_and_simulate.yml"
/// upgrade = "upgrade_package.yml"
/// inventory = "inventory.ini"
///
/// [executor]
/// mode = "ansible"
///
/// [llm]
/// provider = "gemini"
///
/// [llm.gemini]
/// model = "gemini-2.0-flash"
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Default values for various settings.
    pub defaults: Defaults,
    /// Playbook paths and inventory for the ansible executor.
    pub playbooks: PlaybooksConfig,
    /// Executor selection.
    pub executor: ExecutorConfig,
    /// LLM provider configuration.
    pub llm: LlmConfig,
}

impl Config {
    /// Convert the executor mode string to an enum.
    pub fn executor_mode(&self) -> Result<ExecutorMode, ConfigError> {
        let mode = self.executor.mode.as_deref().unwrap_or("ansible");
        match mode {
            "ansible" => Ok(ExecutorMode::Ansible),
            "apt" => Ok(ExecutorMode::Apt),
            other => Err(ConfigError::InvalidValue {
                key: "executor.mode".to_string(),
                value: format!("Unknown executor mode: {other}"),
            }),
        }
    }

    /// Directory where per-host output files are read and written.
    #[must_use]
    pub fn output_dir(&self) -> PathBuf {
        self.defaults
            .output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Timeout for external command execution.
    #[must_use]
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.defaults.command_timeout.unwrap_or(600))
    }

    /// Timeout for LLM HTTP requests.
    #[must_use]
    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.defaults.llm_timeout.unwrap_or(120))
    }

    /// Whether confirmation prompts are bypassed.
    #[must_use]
    pub fn assume_yes(&self) -> bool {
        self.defaults.assume_yes.unwrap_or(false)
    }

    /// Path to the simulation playbook.
    #[must_use]
    pub fn check_playbook(&self) -> String {
        self.playbooks
            .check
            .clone()
            .unwrap_or_else(|| DEFAULT_CHECK_PLAYBOOK.to_string())
    }

    /// Path to the upgrade playbook.
    #[must_use]
    pub fn upgrade_playbook(&self) -> String {
        self.playbooks
            .upgrade
            .clone()
            .unwrap_or_else(|| DEFAULT_UPGRADE_PLAYBOOK.to_string())
    }
}

/// Default configuration values.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    /// Directory for simulate/rdepends output files. Default: ".".
    pub output_dir: Option<PathBuf>,
    /// Timeout in seconds for playbook/package-manager runs. Default: 600.
    pub command_timeout: Option<u64>,
    /// Timeout in seconds for LLM HTTP requests. Default: 120.
    pub llm_timeout: Option<u64>,
    /// Skip per-host confirmation prompts. Default: false.
    pub assume_yes: Option<bool>,
    pub verbose: Option<bool>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output_dir: Some(PathBuf::from(".")),
            command_timeout: Some(600),
            llm_timeout: Some(120),
            assume_yes: Some(false),
            verbose: Some(false),
        }
    }
}

/// Playbook configuration for the ansible executor.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PlaybooksConfig {
    /// Simulation/check playbook path. Default: check_and_simulate.yml.
    pub check: Option<String>,
    /// Upgrade playbook path. Default: upgrade_package.yml.
    pub upgrade: Option<String>,
    /// Optional inventory file passed as `-i <file>`.
    pub inventory: Option<String>,
    /// Explicit ansible-playbook binary path; PATH lookup if unset.
    pub binary: Option<String>,
}

/// Executor selection.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExecutorConfig {
    pub mode: Option<String>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            mode: Some("ansible".to_string()),
        }
    }
}

/// LLM provider configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LlmConfig {
    /// Provider name: "gemini" (default) or "anthropic".
    pub provider: Option<String>,
    pub gemini: Option<GeminiConfig>,
    pub anthropic: Option<AnthropicConfig>,
}

/// Gemini HTTP provider configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GeminiConfig {
    /// Environment variable holding the API key. Default: GEMINI_API_KEY.
    pub api_key_env: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

/// Anthropic HTTP provider configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AnthropicConfig {
    /// Environment variable holding the API key. Default: ANTHROPIC_API_KEY.
    pub api_key_env: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

#[cfg(any(test, feature = "test-utils"))]
impl Config {
    /// Create a minimal Config for unit tests that don't need discovery.
    pub fn minimal_for_testing() -> Self {
        Config {
            defaults: Defaults::default(),
            playbooks: PlaybooksConfig::default(),
            executor: ExecutorConfig::default(),
            llm: LlmConfig::default(),
        }
    }
}
