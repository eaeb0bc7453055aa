//! Question generation: prompts, fallback data, sanitation and caching.

mod cache;
mod fallback;
mod outcome;
mod params;
mod prompts;
pub mod sanitizer;

pub use cache::{CacheKey, QuestionCache};
pub use fallback::FallbackCatalog;
pub use outcome::{GenerationOutcome, GenerationWarning, QuestionSource};
pub use params::{GenerationParams, Responses};
pub use prompts::{PromptCatalog, CATEGORY_TOKEN};
pub use sanitizer::{sanitize_response, SanitizeReport};
