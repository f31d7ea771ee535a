//! Anthropic HTTP backend implementation
//!
//! Calls Anthropic's Messages API. Selected with `[llm] provider = "anthropic"`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use upcheck_config::Config;
use upcheck_utils::error::LlmError;

use crate::http::{self, HttpParams};
use crate::types::{LlmBackend, LlmInvocation, LlmResult, Message, Role};

/// Default Anthropic API endpoint
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1/messages";

/// Anthropic API version header value
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic backend configuration
#[derive(Debug, Clone)]
pub struct AnthropicBackend {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    default_model: String,
    default_params: HttpParams,
}

impl AnthropicBackend {
    /// Create a new Anthropic backend.
    ///
    /// # Errors
    ///
    /// Returns `LlmError::Misconfiguration` if the HTTP client cannot be
    /// constructed.
    pub(crate) fn new(
        api_key: String,
        base_url: Option<String>,
        default_model: String,
        default_params: HttpParams,
    ) -> Result<Self, LlmError> {
        Ok(Self {
            client: http::build_client()?,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_key,
            default_model,
            default_params,
        })
    }

    /// Create a new Anthropic backend from configuration.
    ///
    /// # Errors
    ///
    /// Returns `LlmError::Misconfiguration` if:
    /// - The API key environment variable is not set
    /// - No model is configured in `[llm.anthropic]`
    pub fn new_from_config(config: &Config) -> Result<Self, LlmError> {
        let anthropic = config.llm.anthropic.as_ref();

        let api_key_env = anthropic
            .and_then(|a| a.api_key_env.as_deref())
            .unwrap_or("ANTHROPIC_API_KEY");

        let api_key = std::env::var(api_key_env).map_err(|_| {
            LlmError::Misconfiguration(format!(
                "Anthropic API key not found in environment variable '{api_key_env}'. \
                 Set this variable or configure a different api_key_env in [llm.anthropic]."
            ))
        })?;

        let base_url = anthropic.and_then(|a| a.base_url.clone());

        let default_model = anthropic.and_then(|a| a.model.clone()).ok_or_else(|| {
            LlmError::Misconfiguration(
                "Anthropic model not specified in configuration. \
                 Set [llm.anthropic] model = \"model-name\"."
                    .to_string(),
            )
        })?;

        let default_params = HttpParams {
            max_tokens: anthropic.and_then(|a| a.max_tokens).unwrap_or(2048),
            temperature: anthropic.and_then(|a| a.temperature).unwrap_or(0.2),
        };

        Self::new(api_key, base_url, default_model, default_params)
    }

    fn resolve_model(&self, inv: &LlmInvocation) -> String {
        if inv.model.is_empty() {
            self.default_model.clone()
        } else {
            inv.model.clone()
        }
    }

    /// Convert messages to Anthropic Messages API format.
    ///
    /// Anthropic uses a `system` field for system prompts and a `messages`
    /// array for user/assistant turns. Multiple system messages are
    /// concatenated.
    fn convert_messages(messages: &[Message]) -> (Option<String>, Vec<AnthropicMessage>) {
        let mut system_prompt: Option<String> = None;
        let mut anthropic_messages = Vec::new();

        for msg in messages {
            match msg.role {
                Role::System => {
                    if let Some(existing) = system_prompt.as_mut() {
                        existing.push_str("\n\n");
                        existing.push_str(&msg.content);
                    } else {
                        system_prompt = Some(msg.content.clone());
                    }
                }
                Role::User => anthropic_messages.push(AnthropicMessage {
                    role: "user".to_string(),
                    content: msg.content.clone(),
                }),
                Role::Assistant => anthropic_messages.push(AnthropicMessage {
                    role: "assistant".to_string(),
                    content: msg.content.clone(),
                }),
            }
        }

        (system_prompt, anthropic_messages)
    }
}

#[async_trait]
impl LlmBackend for AnthropicBackend {
    async fn invoke(&self, inv: LlmInvocation) -> Result<LlmResult, LlmError> {
        let model = self.resolve_model(&inv);

        debug!(
            provider = "anthropic",
            model = %model,
            host = %inv.host,
            timeout_secs = inv.timeout.as_secs(),
            "Invoking Anthropic backend"
        );

        let (system_prompt, messages) = Self::convert_messages(&inv.messages);

        let request_body = AnthropicRequest {
            model: model.clone(),
            messages,
            max_tokens: self.default_params.max_tokens,
            temperature: self.default_params.temperature,
            system: system_prompt,
        };

        let request = self
            .client
            .post(&self.base_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request_body);

        let response = http::execute(request, inv.timeout, "anthropic").await?;

        let response_body: AnthropicResponse = response.json().await.map_err(|e| {
            LlmError::Transport(format!("Failed to parse Anthropic response: {e}"))
        })?;

        let content: String = response_body
            .content
            .iter()
            .filter(|block| block.content_type == "text")
            .filter_map(|block| block.text.as_deref())
            .collect();

        if content.is_empty() {
            return Err(LlmError::Transport(
                "Anthropic response missing text content".to_string(),
            ));
        }

        let mut result = LlmResult::new(content, "anthropic", model);
        if let Some(usage) = response_body.usage {
            result.tokens_input = Some(usage.input_tokens);
            result.tokens_output = Some(usage.output_tokens);
        }

        debug!(
            provider = "anthropic",
            tokens_input = ?result.tokens_input,
            tokens_output = ?result.tokens_output,
            "Anthropic invocation completed"
        );

        Ok(result)
    }
}

/// Anthropic message format for requests
#[derive(Debug, Clone, Serialize)]
struct AnthropicMessage {
    role: String,
    content: String,
}

/// Anthropic request body
#[derive(Debug, Clone, Serialize)]
struct AnthropicRequest {
    model: String,
    messages: Vec<AnthropicMessage>,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
}

/// Anthropic response body
#[derive(Debug, Clone, Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
    usage: Option<Usage>,
}

#[derive(Debug, Clone, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    content_type: String,
    text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct Usage {
    input_tokens: u64,
    output_tokens: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn test_backend() -> AnthropicBackend {
        AnthropicBackend::new(
            "test-key".to_string(),
            None,
            "default-model".to_string(),
            HttpParams::default(),
        )
        .unwrap()
    }

    #[test]
    fn resolve_model_prefers_invocation_model() {
        let backend = test_backend();

        let inv = LlmInvocation::new("db01", "", Duration::from_secs(60), vec![]);
        assert_eq!(backend.resolve_model(&inv), "default-model");

        let inv = LlmInvocation::new("db01", "custom-model", Duration::from_secs(60), vec![]);
        assert_eq!(backend.resolve_model(&inv), "custom-model");
    }

    #[test]
    fn convert_messages_separates_system() {
        let messages = vec![
            Message::system("You assess upgrade risk"),
            Message::user("Analyze this output"),
        ];

        let (system, converted) = AnthropicBackend::convert_messages(&messages);

        assert_eq!(system, Some("You assess upgrade risk".to_string()));
        assert_eq!(converted.len(), 1);
        assert_eq!(converted[0].role, "user");
    }

    #[test]
    fn convert_messages_concatenates_multiple_system() {
        let messages = vec![
            Message::system("First"),
            Message::system("Second"),
            Message::user("Hello"),
        ];

        let (system, converted) = AnthropicBackend::convert_messages(&messages);

        assert_eq!(system, Some("First\n\nSecond".to_string()));
        assert_eq!(converted.len(), 1);
    }

    #[test]
    fn request_body_omits_empty_system() {
        let request = AnthropicRequest {
            model: "m".to_string(),
            messages: vec![],
            max_tokens: 100,
            temperature: 0.2,
            system: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("system").is_none());
    }

    #[test]
    fn new_from_config_missing_api_key() {
        let test_env_var = "ANTHROPIC_API_KEY_TEST_MISSING";
        unsafe {
            std::env::remove_var(test_env_var);
        }

        let mut config = Config::minimal_for_testing();
        config.llm.anthropic = Some(upcheck_config::AnthropicConfig {
            api_key_env: Some(test_env_var.to_string()),
            model: Some("test-model".to_string()),
            ..Default::default()
        });

        match AnthropicBackend::new_from_config(&config) {
            Err(LlmError::Misconfiguration(msg)) => assert!(msg.contains(test_env_var)),
            other => panic!("expected Misconfiguration, got {other:?}"),
        }
    }

    #[test]
    fn new_from_config_missing_model() {
        let test_env_var = "ANTHROPIC_API_KEY_TEST_MODEL";
        unsafe {
            std::env::set_var(test_env_var, "test-key");
        }

        let mut config = Config::minimal_for_testing();
        config.llm.anthropic = Some(upcheck_config::AnthropicConfig {
            api_key_env: Some(test_env_var.to_string()),
            ..Default::default()
        });

        match AnthropicBackend::new_from_config(&config) {
            Err(LlmError::Misconfiguration(msg)) => assert!(msg.contains("model")),
            other => panic!("expected Misconfiguration, got {other:?}"),
        }

        unsafe {
            std::env::remove_var(test_env_var);
        }
    }
}
