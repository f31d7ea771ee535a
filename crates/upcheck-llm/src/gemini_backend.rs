//! Gemini HTTP backend implementation
//!
//! Calls the Google Generative Language API (`generateContent`) directly.
//! This is the default provider.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use upcheck_config::Config;
use upcheck_utils::error::LlmError;

use crate::http::{self, HttpParams};
use crate::types::{LlmBackend, LlmInvocation, LlmResult, Message, Role};

/// Default Generative Language API root
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model when none is configured
const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Gemini backend configuration
#[derive(Debug, Clone)]
pub struct GeminiBackend {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    default_model: String,
    default_params: HttpParams,
}

impl GeminiBackend {
    /// Create a new Gemini backend.
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

    /// Create a new Gemini backend from configuration.
    ///
    /// The API key is read from the environment variable named by
    /// `[llm.gemini] api_key_env` (default `GEMINI_API_KEY`).
    ///
    /// # Errors
    ///
    /// Returns `LlmError::Misconfiguration` if the API key environment
    /// variable is not set.
    pub fn new_from_config(config: &Config) -> Result<Self, LlmError> {
        let gemini = config.llm.gemini.as_ref();

        let api_key_env = gemini
            .and_then(|g| g.api_key_env.as_deref())
            .unwrap_or("GEMINI_API_KEY");

        let api_key = std::env::var(api_key_env).map_err(|_| {
            LlmError::Misconfiguration(format!(
                "Gemini API key not found in environment variable '{api_key_env}'. \
                 Set this variable or configure a different api_key_env in [llm.gemini]."
            ))
        })?;

        let base_url = gemini.and_then(|g| g.base_url.clone());

        let default_model = gemini
            .and_then(|g| g.model.clone())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let default_params = HttpParams {
            max_tokens: gemini.and_then(|g| g.max_tokens).unwrap_or(2048),
            temperature: gemini.and_then(|g| g.temperature).unwrap_or(0.2),
        };

        Self::new(api_key, base_url, default_model, default_params)
    }

    /// Resolve the model for this invocation: `inv.model` overrides the
    /// backend default when non-empty.
    fn resolve_model(&self, inv: &LlmInvocation) -> String {
        if inv.model.is_empty() {
            self.default_model.clone()
        } else {
            inv.model.clone()
        }
    }

    /// Convert messages to Gemini `contents` format.
    ///
    /// Gemini has no separate system field at this API surface; system
    /// messages are prepended as user-role content.
    fn convert_messages(messages: &[Message]) -> Vec<GeminiContent> {
        messages
            .iter()
            .map(|msg| GeminiContent {
                role: match msg.role {
                    Role::System | Role::User => "user".to_string(),
                    Role::Assistant => "model".to_string(),
                },
                parts: vec![GeminiPart {
                    text: msg.content.clone(),
                }],
            })
            .collect()
    }
}

#[async_trait]
impl LlmBackend for GeminiBackend {
    async fn invoke(&self, inv: LlmInvocation) -> Result<LlmResult, LlmError> {
        let model = self.resolve_model(&inv);

        debug!(
            provider = "gemini",
            model = %model,
            host = %inv.host,
            timeout_secs = inv.timeout.as_secs(),
            "Invoking Gemini backend"
        );

        let request_body = GeminiRequest {
            contents: Self::convert_messages(&inv.messages),
            generation_config: GenerationConfig {
                max_output_tokens: self.default_params.max_tokens,
                temperature: self.default_params.temperature,
            },
        };

        let url = format!("{}/models/{}:generateContent", self.base_url, model);
        let request = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&request_body);

        let response = http::execute(request, inv.timeout, "gemini").await?;

        let response_body: GeminiResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Transport(format!("Failed to parse Gemini response: {e}")))?;

        let content = response_body
            .candidates
            .first()
            .map(|c| {
                c.content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if content.is_empty() {
            return Err(LlmError::Transport(
                "Gemini response missing text content".to_string(),
            ));
        }

        let mut result = LlmResult::new(content, "gemini", model);
        if let Some(usage) = response_body.usage_metadata {
            result.tokens_input = usage.prompt_token_count;
            result.tokens_output = usage.candidates_token_count;
        }

        debug!(
            provider = "gemini",
            tokens_input = ?result.tokens_input,
            tokens_output = ?result.tokens_output,
            "Gemini invocation completed"
        );

        Ok(result)
    }
}

/// Gemini request body
#[derive(Debug, Clone, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Clone, Serialize)]
struct GenerationConfig {
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Clone, Serialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Clone, Serialize)]
struct GeminiPart {
    text: String,
}

/// Gemini response body
#[derive(Debug, Clone, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(rename = "usageMetadata")]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Clone, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Clone, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Clone, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct UsageMetadata {
    #[serde(rename = "promptTokenCount")]
    prompt_token_count: Option<u64>,
    #[serde(rename = "candidatesTokenCount")]
    candidates_token_count: Option<u64>,
}
