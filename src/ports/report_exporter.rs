//! Report Exporter Port - Turns a finished report into a downloadable artifact.
//!
//! The assembler produces a `ReportPayload`; adapters render it into a
//! concrete format. Failures here are user-visible and retryable, and never
//! touch wizard or cache state.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::report::ReportPayload;

/// Port for exporting report payloads.
///
/// # Contract
///
/// Implementations must:
/// - Render every step's questions with the matching responses
/// - Leave the payload untouched
/// - Report clear errors for unsupported formats or rendering failures
#[async_trait]
pub trait ReportExporter: Send + Sync {
    /// Renders the payload in the requested format.
    async fn export(
        &self,
        payload: &ReportPayload,
        format: ExportFormat,
    ) -> Result<ExportedReport, ExportError>;

    /// Formats this exporter can produce.
    fn supported_formats(&self) -> &[ExportFormat];
}

/// Export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    /// Human-readable markdown document.
    Markdown,
    /// Pretty-printed JSON payload.
    Json,
}

impl ExportFormat {
    /// Get the MIME content type for this format.
    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Markdown => "text/markdown; charset=utf-8",
            ExportFormat::Json => "application/json",
        }
    }

    /// Get the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Markdown => "md",
            ExportFormat::Json => "json",
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::Markdown => write!(f, "markdown"),
            ExportFormat::Json => write!(f, "json"),
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "markdown" | "md" => Ok(ExportFormat::Markdown),
            "json" => Ok(ExportFormat::Json),
            _ => Err(ExportError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// Exported report with content and metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedReport {
    /// The exported content as bytes.
    pub content: Vec<u8>,
    /// The MIME content type.
    pub content_type: String,
    /// Suggested filename for download.
    pub filename: String,
    pub format: ExportFormat,
}

impl ExportedReport {
    /// Create a new exported report.
    pub fn new(content: Vec<u8>, format: ExportFormat, base_filename: &str) -> Self {
        Self {
            content,
            content_type: format.content_type().to_string(),
            filename: format!("{}.{}", base_filename, format.extension()),
            format,
        }
    }

    /// Returns the content as UTF-8 text, if it is valid UTF-8.
    pub fn as_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.content).ok()
    }
}

/// Errors that can occur during report export.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExportError {
    /// Unsupported export format requested.
    #[error("Unsupported export format: {0}")]
    UnsupportedFormat(String),

    /// Export backend is not available.
    #[error("Export service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Rendering failed.
    #[error("Rendering failed: {0}")]
    RenderFailed(String),

    /// I/O error during export.
    #[error("I/O error during export: {0}")]
    IoError(String),
}

impl ExportError {
    /// Create a service unavailable error.
    pub fn service_unavailable(reason: impl Into<String>) -> Self {
        Self::ServiceUnavailable(reason.into())
    }

    /// Create a rendering error.
    pub fn render_failed(reason: impl Into<String>) -> Self {
        Self::RenderFailed(reason.into())
    }

    /// Returns true if retrying the same export may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ExportError::ServiceUnavailable(_) | ExportError::IoError(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_format_content_types_are_correct() {
        assert_eq!(ExportFormat::Markdown.content_type(), "text/markdown; charset=utf-8");
        assert_eq!(ExportFormat::Json.content_type(), "application/json");
    }

    #[test]
    fn export_format_parses_from_string() {
        assert_eq!("markdown".parse::<ExportFormat>().unwrap(), ExportFormat::Markdown);
        assert_eq!("MD".parse::<ExportFormat>().unwrap(), ExportFormat::Markdown);
        assert_eq!("json".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
    }

    #[test]
    fn export_format_parse_rejects_unknown_format() {
        let result = "pdf".parse::<ExportFormat>();
        assert!(matches!(result, Err(ExportError::UnsupportedFormat(f)) if f == "pdf"));
    }

    #[test]
    fn exported_report_builds_filename_from_format() {
        let report = ExportedReport::new(b"# Report".to_vec(), ExportFormat::Markdown, "oat-bar");
        assert_eq!(report.filename, "oat-bar.md");
        assert_eq!(report.content_type, "text/markdown; charset=utf-8");
        assert_eq!(report.as_text(), Some("# Report"));
    }

    #[test]
    fn only_transient_errors_are_retryable() {
        assert!(ExportError::service_unavailable("down").is_retryable());
        assert!(ExportError::IoError("disk".into()).is_retryable());
        assert!(!ExportError::render_failed("bad").is_retryable());
        assert!(!ExportError::UnsupportedFormat("pdf".into()).is_retryable());
    }
}
