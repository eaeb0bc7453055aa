//! Question Provider Port - Interface for the generative-text service.
//!
//! The generation service renders a prompt and hands it to a provider,
//! which returns raw text expected to contain a JSON array of question
//! objects. Everything after that (fence stripping, parsing, validation)
//! happens on our side, so providers stay thin.
//!
//! # Example
//!
//! ```ignore
//! use async_trait::async_trait;
//!
//! struct EchoProvider;
//!
//! #[async_trait]
//! impl QuestionProvider for EchoProvider {
//!     async fn generate_text(&self, _prompt: &str) -> Result<String, ProviderError> {
//!         Ok("[]".to_string())
//!     }
//!     fn is_configured(&self) -> bool { true }
//!     fn provider_info(&self) -> ProviderInfo { ProviderInfo::new("echo", "none") }
//! }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Port for generative-text provider interactions.
#[async_trait]
pub trait QuestionProvider: Send + Sync {
    /// Sends a rendered prompt and returns the raw reply text.
    async fn generate_text(&self, prompt: &str) -> Result<String, ProviderError>;

    /// Whether a credential is available right now.
    ///
    /// Checked on every generation call; returning false routes the call
    /// to fallback questions without any network I/O.
    fn is_configured(&self) -> bool;

    /// Get provider information (name, model).
    fn provider_info(&self) -> ProviderInfo;
}

/// Provider name and model, used for logging and diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderInfo {
    /// Provider name (e.g., "gemini", "mock").
    pub name: String,
    /// Model identifier (e.g., "gemini-2.0-flash").
    pub model: String,
}

impl ProviderInfo {
    /// Creates new provider info.
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
        }
    }
}

/// Provider errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProviderError {
    /// No API key available for this call.
    #[error("provider not configured")]
    NotConfigured,

    /// Rate limited by provider.
    #[error("rate limited: retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds until retry is allowed.
        retry_after_secs: u32,
    },

    /// Content was blocked by the provider's safety filters.
    #[error("content filtered: {reason}")]
    ContentFiltered {
        /// Reason for filtering.
        reason: String,
    },

    /// Provider is unavailable.
    #[error("provider unavailable: {message}")]
    Unavailable {
        /// Error details.
        message: String,
    },

    /// API key rejected.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Network error during request.
    #[error("network error: {0}")]
    Network(String),

    /// Failed to parse the provider envelope.
    #[error("parse error: {0}")]
    Parse(String),

    /// Request rejected as invalid.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Request timed out.
    #[error("request timed out after {timeout_secs}s")]
    Timeout {
        /// Configured timeout.
        timeout_secs: u32,
    },
}

impl ProviderError {
    /// Creates a rate limited error.
    pub fn rate_limited(retry_after_secs: u32) -> Self {
        Self::RateLimited { retry_after_secs }
    }

    /// Creates a content filtered error.
    pub fn content_filtered(reason: impl Into<String>) -> Self {
        Self::ContentFiltered {
            reason: reason.into(),
        }
    }

    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Creates a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// Returns true if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ProviderError::RateLimited { .. }
                | ProviderError::Unavailable { .. }
                | ProviderError::Network(_)
                | ProviderError::Timeout { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_info_new_works() {
        let info = ProviderInfo::new("gemini", "gemini-2.0-flash");
        assert_eq!(info.name, "gemini");
        assert_eq!(info.model, "gemini-2.0-flash");
    }

    #[test]
    fn retryable_errors_are_identified() {
        assert!(ProviderError::rate_limited(30).is_retryable());
        assert!(ProviderError::unavailable("down").is_retryable());
        assert!(ProviderError::network("reset").is_retryable());
        assert!(ProviderError::Timeout { timeout_secs: 30 }.is_retryable());
    }

    #[test]
    fn non_retryable_errors_are_identified() {
        assert!(!ProviderError::NotConfigured.is_retryable());
        assert!(!ProviderError::AuthenticationFailed.is_retryable());
        assert!(!ProviderError::content_filtered("unsafe").is_retryable());
        assert!(!ProviderError::parse("bad json").is_retryable());
        assert!(!ProviderError::InvalidRequest("bad".into()).is_retryable());
    }

    #[test]
    fn error_display_messages() {
        assert_eq!(
            ProviderError::rate_limited(30).to_string(),
            "rate limited: retry after 30s"
        );
        assert_eq!(
            ProviderError::Timeout { timeout_secs: 60 }.to_string(),
            "request timed out after 60s"
        );
        assert_eq!(ProviderError::NotConfigured.to_string(), "provider not configured");
    }
}
