//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `QuestionProvider` - Generative-text service producing candidate questions
//! - `ReportExporter` - Renders a finished report into a downloadable artifact

mod question_provider;
mod report_exporter;

pub use question_provider::{ProviderError, ProviderInfo, QuestionProvider};
pub use report_exporter::{ExportError, ExportFormat, ExportedReport, ReportExporter};
