//! Question Provider Adapters.
//!
//! Implementations of the QuestionProvider port.
//!
//! ## Available Adapters
//!
//! - `MockQuestionProvider` - Configurable mock for testing
//! - `GeminiProvider` - Google Generative Language API (Gemini models)

mod gemini_provider;
mod mock_provider;

pub use gemini_provider::{ApiKeySource, GeminiConfig, GeminiProvider, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use mock_provider::{MockQuestionProvider, MockResponse, EXHAUSTED_RESPONSE};
