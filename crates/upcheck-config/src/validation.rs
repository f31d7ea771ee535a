use anyhow::Result;

use upcheck_utils::error::ConfigError;

use crate::model::Config;

/// Validate a merged configuration before it is handed to the rest of the
/// program. Catches values that would only fail much later, mid-run.
pub(crate) fn validate(config: &Config) -> Result<()> {
    if let Some(secs) = config.defaults.command_timeout {
        if secs < 5 {
            return Err(ConfigError::InvalidValue {
                key: "defaults.command_timeout".to_string(),
                value: format!("{secs} is below the 5 second minimum"),
            }
            .into());
        }
    }

    if let Some(secs) = config.defaults.llm_timeout {
        if secs < 5 {
            return Err(ConfigError::InvalidValue {
                key: "defaults.llm_timeout".to_string(),
                value: format!("{secs} is below the 5 second minimum"),
            }
            .into());
        }
    }

    // executor_mode() rejects unknown modes
    config.executor_mode()?;

    let provider = config.llm.provider.as_deref().unwrap_or("gemini");
    if provider != "gemini" && provider != "anthropic" {
        return Err(ConfigError::InvalidValue {
            key: "llm.provider".to_string(),
            value: format!("Unknown provider: {provider} (expected gemini or anthropic)"),
        }
        .into());
    }

    let temperatures = [
        config.llm.gemini.as_ref().and_then(|g| g.temperature),
        config.llm.anthropic.as_ref().and_then(|a| a.temperature),
    ];
    for temp in temperatures.into_iter().flatten() {
        if !(0.0..=2.0).contains(&temp) {
            return Err(ConfigError::InvalidValue {
                key: "llm.<provider>.temperature".to_string(),
                value: format!("{temp} is outside the valid range 0.0..=2.0"),
            }
            .into());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::GeminiConfig;

    #[test]
    fn accepts_default_config() {
        let config = Config::minimal_for_testing();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn rejects_tiny_timeouts() {
        let mut config = Config::minimal_for_testing();
        config.defaults.command_timeout = Some(1);
        assert!(validate(&config).is_err());

        let mut config = Config::minimal_for_testing();
        config.defaults.llm_timeout = Some(2);
        assert!(validate(&config).is_err());
    }

    #[test]
    fn rejects_unknown_provider() {
        let mut config = Config::minimal_for_testing();
        config.llm.provider = Some("openrouter".to_string());
        assert!(validate(&config).is_err());
    }

    #[test]
    fn rejects_out_of_range_temperature() {
        let mut config = Config::minimal_for_testing();
        config.llm.gemini = Some(GeminiConfig {
            temperature: Some(3.5),
            ..Default::default()
        });
        assert!(validate(&config).is_err());
    }
}
