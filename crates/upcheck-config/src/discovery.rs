use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::cli_args::CliArgs;
use crate::model::{Config, Defaults, ExecutorConfig, LlmConfig, PlaybooksConfig};
use crate::validation::validate;

/// Config file layout as written on disk. Every section is optional so a
/// partial file only overrides what it names.
#[derive(Debug, Default, Deserialize)]
struct TomlConfig {
    defaults: Option<Defaults>,
    playbooks: Option<PlaybooksConfig>,
    executor: Option<ExecutorConfig>,
    llm: Option<LlmConfig>,
}

impl Config {
    /// Discover configuration starting from the current directory.
    ///
    /// Precedence: CLI arguments > config file > built-in defaults. The
    /// config file is found by searching upward from the working directory
    /// for `.upcheck/config.toml`, unless `args.config_path` names a file
    /// explicitly.
    pub fn discover(args: &CliArgs) -> Result<Config> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;
        Self::discover_from(&cwd, args)
    }

    /// Discover configuration starting from an explicit directory.
    pub fn discover_from(start_dir: &Path, args: &CliArgs) -> Result<Config> {
        let file = match &args.config_path {
            Some(path) => {
                let content = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file: {}", path.display()))?;
                parse_toml(&content, path)?
            }
            None => match find_config_file(start_dir) {
                Some(path) => {
                    let content = fs::read_to_string(&path).with_context(|| {
                        format!("Failed to read config file: {}", path.display())
                    })?;
                    parse_toml(&content, &path)?
                }
                None => TomlConfig::default(),
            },
        };

        let mut config = merge_file_over_defaults(file);
        apply_cli_overrides(&mut config, args);
        validate(&config)?;
        Ok(config)
    }
}

/// Search upward from `start_dir` for `.upcheck/config.toml`.
fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = Some(start_dir);
    while let Some(dir) = current {
        let candidate = dir.join(".upcheck").join("config.toml");
        if candidate.is_file() {
            return Some(candidate);
        }
        current = dir.parent();
    }
    None
}

fn parse_toml(content: &str, path: &Path) -> Result<TomlConfig> {
    toml::from_str(content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Merge file values over built-in defaults. A field set in the file wins;
/// unset fields fall back to `Defaults::default()` and friends.
fn merge_file_over_defaults(file: TomlConfig) -> Config {
    let base = Defaults::default();
    let file_defaults = file.defaults.unwrap_or_else(|| Defaults {
        output_dir: None,
        command_timeout: None,
        llm_timeout: None,
        assume_yes: None,
        verbose: None,
    });

    Config {
        defaults: Defaults {
            output_dir: file_defaults.output_dir.or(base.output_dir),
            command_timeout: file_defaults.command_timeout.or(base.command_timeout),
            llm_timeout: file_defaults.llm_timeout.or(base.llm_timeout),
            assume_yes: file_defaults.assume_yes.or(base.assume_yes),
            verbose: file_defaults.verbose.or(base.verbose),
        },
        playbooks: file.playbooks.unwrap_or_default(),
        executor: file.executor.unwrap_or_default(),
        llm: file.llm.unwrap_or_default(),
    }
}

fn apply_cli_overrides(config: &mut Config, args: &CliArgs) {
    if let Some(dir) = &args.output_dir {
        config.defaults.output_dir = Some(dir.clone());
    }
    if let Some(secs) = args.command_timeout {
        config.defaults.command_timeout = Some(secs);
    }
    if let Some(secs) = args.llm_timeout {
        config.defaults.llm_timeout = Some(secs);
    }
    if args.assume_yes {
        config.defaults.assume_yes = Some(true);
    }
    if let Some(verbose) = args.verbose {
        config.defaults.verbose = Some(verbose);
    }
    if let Some(inventory) = &args.inventory {
        config.playbooks.inventory = Some(inventory.clone());
    }
    if let Some(mode) = &args.executor_mode {
        config.executor.mode = Some(mode.clone());
    }
    if let Some(provider) = &args.llm_provider {
        config.llm.provider = Some(provider.clone());
    }
    if let Some(model) = &args.model {
        match config.llm.provider.as_deref().unwrap_or("gemini") {
            "anthropic" => {
                config.llm.anthropic.get_or_insert_with(Default::default).model =
                    Some(model.clone());
            }
            _ => {
                config.llm.gemini.get_or_insert_with(Default::default).model =
                    Some(model.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    fn write_config(dir: &Path, content: &str) {
        let config_dir = dir.join(".upcheck");
        fs::create_dir_all(&config_dir).unwrap();
        fs::write(config_dir.join("config.toml"), content).unwrap();
    }

    #[test]
    fn defaults_apply_when_no_file_exists() {
        let tmp = TempDir::new().unwrap();
        let config = Config::discover_from(tmp.path(), &CliArgs::default()).unwrap();
        assert_eq!(config.command_timeout(), Duration::from_secs(600));
        assert_eq!(config.llm_timeout(), Duration::from_secs(120));
        assert_eq!(config.check_playbook(), "check_and_simulate.yml");
        assert!(!config.assume_yes());
    }

    #[test]
    fn file_values_override_defaults() {
        let tmp = TempDir::new().unwrap();
        write_config(
            tmp.path(),
            r#"
[defaults]
command_timeout = 900
output_dir = "/var/lib/upcheck"

[playbooks]
check = "sim.yml"
inventory = "hosts.ini"

[executor]
mode = "apt"
"#,
        );

        let config = Config::discover_from(tmp.path(), &CliArgs::default()).unwrap();
        assert_eq!(config.command_timeout(), Duration::from_secs(900));
        assert_eq!(config.output_dir(), PathBuf::from("/var/lib/upcheck"));
        assert_eq!(config.check_playbook(), "sim.yml");
        assert_eq!(config.playbooks.inventory.as_deref(), Some("hosts.ini"));
        assert_eq!(config.executor.mode.as_deref(), Some("apt"));
        // unset fields keep their defaults
        assert_eq!(config.llm_timeout(), Duration::from_secs(120));
    }

    #[test]
    fn cli_overrides_file() {
        let tmp = TempDir::new().unwrap();
        write_config(
            tmp.path(),
            r#"
[defaults]
command_timeout = 900

[executor]
mode = "ansible"
"#,
        );

        let args = CliArgs {
            command_timeout: Some(300),
            executor_mode: Some("apt".to_string()),
            assume_yes: true,
            ..Default::default()
        };
        let config = Config::discover_from(tmp.path(), &args).unwrap();
        assert_eq!(config.command_timeout(), Duration::from_secs(300));
        assert_eq!(config.executor.mode.as_deref(), Some("apt"));
        assert!(config.assume_yes());
    }

    #[test]
    fn discovery_walks_upward() {
        let tmp = TempDir::new().unwrap();
        write_config(
            tmp.path(),
            r#"
[defaults]
command_timeout = 450
"#,
        );
        let nested = tmp.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();

        let config = Config::discover_from(&nested, &CliArgs::default()).unwrap();
        assert_eq!(config.command_timeout(), Duration::from_secs(450));
    }

    #[test]
    fn explicit_config_path_skips_discovery() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("custom.toml");
        fs::write(
            &path,
            r#"
[llm]
provider = "anthropic"
"#,
        )
        .unwrap();

        let args = CliArgs {
            config_path: Some(path),
            ..Default::default()
        };
        let config = Config::discover_from(tmp.path(), &args).unwrap();
        assert_eq!(config.llm.provider.as_deref(), Some("anthropic"));
    }

    #[test]
    fn missing_explicit_config_path_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let args = CliArgs {
            config_path: Some(tmp.path().join("nope.toml")),
            ..Default::default()
        };
        assert!(Config::discover_from(tmp.path(), &args).is_err());
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let tmp = TempDir::new().unwrap();
        write_config(tmp.path(), "not [ valid toml");
        assert!(Config::discover_from(tmp.path(), &CliArgs::default()).is_err());
    }

    #[test]
    fn model_override_targets_selected_provider() {
        let tmp = TempDir::new().unwrap();
        let args = CliArgs {
            llm_provider: Some("anthropic".to_string()),
            model: Some("claude-sonnet-4-5".to_string()),
            ..Default::default()
        };
        let config = Config::discover_from(tmp.path(), &args).unwrap();
        let anthropic = config.llm.anthropic.unwrap();
        assert_eq!(anthropic.model.as_deref(), Some("claude-sonnet-4-5"));
        assert!(config.llm.gemini.is_none());
    }
}
