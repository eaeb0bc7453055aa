//! Gemini Provider - Implementation of QuestionProvider for Google's
//! Generative Language API.
//!
//! # Configuration
//!
//! ```ignore
//! let config = GeminiConfig::from_env("GOOGLE_API_KEY")
//!     .with_model("gemini-2.0-flash")
//!     .with_max_retries(2);
//!
//! let provider = GeminiProvider::new(config);
//! ```
//!
//! The API key is resolved on every call, so a key exported after startup
//! is picked up without rebuilding the provider.

use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::{ProviderError, ProviderInfo, QuestionProvider};

/// Default model.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Where the API key comes from.
#[derive(Debug)]
pub enum ApiKeySource {
    /// A key fixed at construction; `None` means never configured.
    Fixed(Option<Secret<String>>),
    /// Read from the named environment variable on every call.
    Environment(String),
}

impl ApiKeySource {
    /// Returns the key if one is currently available and non-blank.
    pub fn resolve(&self) -> Option<Secret<String>> {
        match self {
            ApiKeySource::Fixed(key) => key
                .as_ref()
                .filter(|k| !k.expose_secret().trim().is_empty())
                .map(|k| Secret::new(k.expose_secret().clone())),
            ApiKeySource::Environment(var) => std::env::var(var)
                .ok()
                .filter(|k| !k.trim().is_empty())
                .map(Secret::new),
        }
    }
}

/// Configuration for the Gemini provider.
#[derive(Debug)]
pub struct GeminiConfig {
    key_source: ApiKeySource,
    /// Model to use (e.g., "gemini-2.0-flash").
    pub model: String,
    /// Base URL for the API.
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
    /// Maximum retries on transient failures.
    pub max_retries: u32,
    /// Delay before the first retry; doubled on each further retry.
    pub initial_backoff: Duration,
}

impl GeminiConfig {
    /// Creates a configuration with a fixed API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_key_source(ApiKeySource::Fixed(Some(Secret::new(api_key.into()))))
    }

    /// Creates a configuration that reads the key from `var` on every call.
    pub fn from_env(var: impl Into<String>) -> Self {
        Self::with_key_source(ApiKeySource::Environment(var.into()))
    }

    /// Creates a configuration with no key; the provider reports unconfigured.
    pub fn unconfigured() -> Self {
        Self::with_key_source(ApiKeySource::Fixed(None))
    }

    fn with_key_source(key_source: ApiKeySource) -> Self {
        Self {
            key_source,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            max_retries: 2,
            initial_backoff: Duration::from_secs(1),
        }
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the maximum retry count.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Sets the delay before the first retry.
    pub fn with_initial_backoff(mut self, backoff: Duration) -> Self {
        self.initial_backoff = backoff;
        self
    }

    /// Returns the key source.
    pub fn key_source(&self) -> &ApiKeySource {
        &self.key_source
    }
}

/// Gemini API provider implementation.
pub struct GeminiProvider {
    config: GeminiConfig,
    client: Client,
}

impl GeminiProvider {
    /// Creates a new Gemini provider with the given configuration.
    pub fn new(config: GeminiConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { config, client }
    }

    /// Builds the generateContent endpoint URL.
    fn generate_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url, self.config.model
        )
    }

    fn to_gemini_request(prompt: &str) -> GeminiRequest {
        GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
        }
    }

    /// Sends a request and handles transport errors.
    async fn send_request(&self, prompt: &str, api_key: &Secret<String>) -> Result<Response, ProviderError> {
        self.client
            .post(self.generate_url())
            .header("x-goog-api-key", api_key.expose_secret())
            .header("Content-Type", "application/json")
            .json(&Self::to_gemini_request(prompt))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout {
                        timeout_secs: self.config.timeout.as_secs() as u32,
                    }
                } else if e.is_connect() {
                    ProviderError::network(format!("Connection failed: {}", e))
                } else {
                    ProviderError::network(e.to_string())
                }
            })
    }

    /// Maps a non-success status to a provider error.
    fn status_error(status: u16, error_body: String) -> ProviderError {
        match status {
            401 | 403 => ProviderError::AuthenticationFailed,
            400 if error_body.contains("API_KEY_INVALID") => ProviderError::AuthenticationFailed,
            400 => ProviderError::InvalidRequest(error_body),
            429 => ProviderError::rate_limited(Self::parse_retry_after(&error_body)),
            500..=599 => {
                ProviderError::unavailable(format!("Server error {}: {}", status, error_body))
            }
            _ => ProviderError::network(format!("Unexpected status {}: {}", status, error_body)),
        }
    }

    /// Parses the retry delay from a RESOURCE_EXHAUSTED body.
    fn parse_retry_after(error_body: &str) -> u32 {
        serde_json::from_str::<serde_json::Value>(error_body)
            .ok()
            .and_then(|parsed| {
                parsed
                    .pointer("/error/details")
                    .and_then(|d| d.as_array())
                    .and_then(|details| {
                        details
                            .iter()
                            .find_map(|d| d.get("retryDelay").and_then(|r| r.as_str()))
                            .map(str::to_string)
                    })
            })
            .and_then(|delay| delay.trim_end_matches('s').parse::<u32>().ok())
            .unwrap_or(30)
    }

    /// Extracts the concatenated text of the first candidate.
    fn extract_text(response: GeminiResponse) -> Result<String, ProviderError> {
        if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(ProviderError::content_filtered(reason));
        }

        let candidate = response
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::parse("No candidates in response"))?;

        if candidate.finish_reason.as_deref() == Some("SAFETY") {
            return Err(ProviderError::content_filtered("candidate blocked for safety"));
        }

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(ProviderError::parse("Empty candidate text"));
        }
        Ok(text)
    }

    async fn attempt(&self, prompt: &str, api_key: &Secret<String>) -> Result<String, ProviderError> {
        let response = self.send_request(prompt, api_key).await?;
        let status = response.status();

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(Self::status_error(status.as_u16(), error_body));
        }

        let gemini_response: GeminiResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::parse(format!("Failed to parse response: {}", e)))?;

        Self::extract_text(gemini_response)
    }
}

#[async_trait]
impl QuestionProvider for GeminiProvider {
    async fn generate_text(&self, prompt: &str) -> Result<String, ProviderError> {
        let api_key = self
            .config
            .key_source
            .resolve()
            .ok_or(ProviderError::NotConfigured)?;

        let mut retry_count = 0;

        loop {
            match self.attempt(prompt, &api_key).await {
                Ok(text) => return Ok(text),
                Err(err) => {
                    if !err.is_retryable() || retry_count >= self.config.max_retries {
                        return Err(err);
                    }
                    tracing::debug!(
                        error = %err,
                        attempt = retry_count + 1,
                        "Retrying Gemini request"
                    );
                }
            }

            sleep(backoff_delay(self.config.initial_backoff, retry_count)).await;
            retry_count += 1;
        }
    }

    fn is_configured(&self) -> bool {
        self.config.key_source.resolve().is_some()
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo::new("gemini", &self.config.model)
    }
}

/// Exponential backoff from `initial`, saturating instead of overflowing.
fn backoff_delay(initial: Duration, retry: u32) -> Duration {
    initial.saturating_mul(2u32.saturating_pow(retry))
}

// ----- Gemini API Types -----

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    prompt_feedback: Option<GeminiPromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    block_reason: Option<String>,
}
