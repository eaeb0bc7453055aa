//! AI provider configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

use crate::adapters::ai::{GeminiConfig, DEFAULT_BASE_URL, DEFAULT_MODEL};

use super::error::ValidationError;

/// AI provider configuration
///
/// A missing key is not an error: the questionnaire then runs on fallback
/// questions until a key becomes available.
#[derive(Debug, Deserialize)]
pub struct AiConfig {
    /// Google Generative Language API key
    pub google_api_key: Option<Secret<String>>,

    /// Environment variable consulted per call when no key is configured
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Model name
    #[serde(default = "default_model")]
    pub model: String,

    /// API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Maximum retries on transient failure
    #[serde(default = "default_retries")]
    pub max_retries: u32,

    /// Delay before the first retry, in milliseconds
    #[serde(default = "default_initial_backoff")]
    pub initial_backoff_ms: u64,
}

impl AiConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check if a non-blank key is configured directly
    pub fn has_google_key(&self) -> bool {
        self.google_api_key
            .as_ref()
            .is_some_and(|k| !k.expose_secret().trim().is_empty())
    }

    /// Builds the provider configuration.
    ///
    /// A configured key is fixed; otherwise the key is read from
    /// `api_key_env` on every call.
    pub fn gemini_config(&self) -> GeminiConfig {
        let base = match self.google_api_key.as_ref() {
            Some(key) if self.has_google_key() => GeminiConfig::new(key.expose_secret().clone()),
            _ => GeminiConfig::from_env(self.api_key_env.clone()),
        };

        base.with_model(self.model.clone())
            .with_base_url(self.base_url.clone())
            .with_timeout(self.timeout())
            .with_max_retries(self.max_retries)
            .with_initial_backoff(Duration::from_millis(self.initial_backoff_ms))
    }

    /// Validate AI configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.model.trim().is_empty() {
            return Err(ValidationError::MissingRequired("AI__MODEL"));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ValidationError::InvalidBaseUrl);
        }
        if self.timeout_secs == 0 || self.timeout_secs > 300 {
            return Err(ValidationError::InvalidTimeout);
        }
        if self.max_retries > 10 {
            return Err(ValidationError::TooManyRetries);
        }
        Ok(())
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            google_api_key: None,
            api_key_env: default_api_key_env(),
            model: default_model(),
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            max_retries: default_retries(),
            initial_backoff_ms: default_initial_backoff(),
        }
    }
}

fn default_api_key_env() -> String {
    "GOOGLE_API_KEY".to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_retries() -> u32 {
    2
}

fn default_initial_backoff() -> u64 {
    1000
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::ApiKeySource;

    #[test]
    fn test_ai_config_defaults() {
        let config = AiConfig::default();
        assert_eq!(config.model, "gemini-2.0-flash");
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.max_retries, 2);
        assert!(!config.has_google_key());
    }

    #[test]
    fn test_missing_key_is_valid() {
        assert!(AiConfig::default().validate().is_ok());
    }

    #[test]
    fn test_blank_key_is_not_a_key() {
        let config = AiConfig {
            google_api_key: Some(Secret::new("  ".to_string())),
            ..Default::default()
        };
        assert!(!config.has_google_key());
        assert!(matches!(
            config.gemini_config().key_source(),
            ApiKeySource::Environment(var) if var == "GOOGLE_API_KEY"
        ));
    }

    #[test]
    fn test_configured_key_is_fixed() {
        let config = AiConfig {
            google_api_key: Some(Secret::new("AIza-test".to_string())),
            model: "gemini-1.5-pro".to_string(),
            ..Default::default()
        };
        let gemini = config.gemini_config();

        assert_eq!(gemini.model, "gemini-1.5-pro");
        assert_eq!(gemini.timeout, Duration::from_secs(30));
        assert_eq!(
            gemini
                .key_source()
                .resolve()
                .map(|k| k.expose_secret().clone()),
            Some("AIza-test".to_string())
        );
    }

    #[test]
    fn test_validation_invalid_timeout() {
        let config = AiConfig {
            timeout_secs: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidTimeout));
    }

    #[test]
    fn test_validation_invalid_base_url() {
        let config = AiConfig {
            base_url: "generativelanguage.googleapis.com".to_string(),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidBaseUrl));
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = AiConfig {
            google_api_key: Some(Secret::new("AIza-very-secret".to_string())),
            ..Default::default()
        };
        assert!(!format!("{:?}", config).contains("very-secret"));
    }
}
