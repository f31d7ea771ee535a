//! Shared HTTP execution and status mapping for provider backends.
//!
//! One request per invocation: a failed or rate-limited request surfaces as
//! an `LlmError` immediately, no retry or backoff.

use std::time::Duration;

use upcheck_utils::error::LlmError;

/// Sampling parameters shared by the HTTP providers.
#[derive(Debug, Clone)]
pub(crate) struct HttpParams {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for HttpParams {
    fn default() -> Self {
        Self {
            max_tokens: 2048,
            temperature: 0.2,
        }
    }
}

/// Build a reqwest client suitable for provider calls.
pub(crate) fn build_client() -> Result<reqwest::Client, LlmError> {
    reqwest::Client::builder()
        .build()
        .map_err(|e| LlmError::Misconfiguration(format!("Failed to build HTTP client: {e}")))
}

/// Send a request with a per-request timeout and map failures to `LlmError`.
pub(crate) async fn execute(
    request: reqwest::RequestBuilder,
    timeout: Duration,
    provider: &str,
) -> Result<reqwest::Response, LlmError> {
    let response = request.timeout(timeout).send().await.map_err(|e| {
        if e.is_timeout() {
            LlmError::Timeout { duration: timeout }
        } else {
            LlmError::Transport(format!("{provider} request failed: {e}"))
        }
    })?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(map_status(status.as_u16(), &body, provider))
}

/// Map an HTTP status code to the appropriate error variant.
pub(crate) fn map_status(status: u16, body: &str, provider: &str) -> LlmError {
    let detail = if body.is_empty() {
        format!("{provider} returned HTTP {status}")
    } else {
        format!("{provider} returned HTTP {status}: {body}")
    };

    match status {
        401 | 403 => LlmError::ProviderAuth(detail),
        429 => LlmError::ProviderQuota(detail),
        500..=599 => LlmError::ProviderOutage(detail),
        _ => LlmError::Transport(detail),
    }
}
