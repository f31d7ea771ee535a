//! LLM backend abstraction for upcheck
//!
//! Provides the [`LlmBackend`] trait and HTTP implementations for the
//! supported providers: Gemini (default) and Anthropic. Backends are
//! constructed from the `[llm]` configuration section via
//! [`backend_from_config`].

mod anthropic_backend;
mod gemini_backend;
mod http;
mod types;

pub use anthropic_backend::AnthropicBackend;
pub use gemini_backend::GeminiBackend;
pub use types::{LlmBackend, LlmInvocation, LlmResult, Message, Role};
pub use upcheck_utils::error::LlmError;

use upcheck_config::Config;

/// Construct the LLM backend selected by `[llm] provider`.
///
/// # Errors
///
/// Returns `LlmError::Unsupported` for an unknown provider name and
/// `LlmError::Misconfiguration` when the selected backend cannot be built
/// (missing API key, missing required model).
pub fn backend_from_config(config: &Config) -> Result<Box<dyn LlmBackend>, LlmError> {
    let provider = config.llm.provider.as_deref().unwrap_or("gemini");
    match provider {
        "gemini" => Ok(Box::new(GeminiBackend::new_from_config(config)?)),
        "anthropic" => Ok(Box::new(AnthropicBackend::new_from_config(config)?)),
        other => Err(LlmError::Unsupported(format!(
            "Unknown LLM provider '{other}' (supported: gemini, anthropic)"
        ))),
    }
}
