//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `ai` - Question providers (Gemini, mock)
//! - `export` - Report exporters (markdown, JSON)

pub mod ai;
pub mod export;

pub use ai::{GeminiConfig, GeminiProvider, MockQuestionProvider};
pub use export::MarkdownReportExporter;
