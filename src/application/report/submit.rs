//! SubmitReportHandler - Exports an assembled report.
//!
//! Export failures are retried with a fixed, bounded schedule. Generation is
//! never re-run here; the payload is already final.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::time::sleep;

use crate::domain::report::ReportPayload;
use crate::ports::{ExportError, ExportFormat, ExportedReport, ReportExporter};

/// Command to export a finished report.
#[derive(Debug, Clone)]
pub struct SubmitReportCommand {
    pub payload: ReportPayload,
    pub format: ExportFormat,
}

impl SubmitReportCommand {
    pub fn markdown(payload: ReportPayload) -> Self {
        Self {
            payload,
            format: ExportFormat::Markdown,
        }
    }

    pub fn json(payload: ReportPayload) -> Self {
        Self {
            payload,
            format: ExportFormat::Json,
        }
    }
}

/// Result of a successful export.
#[derive(Debug, Clone)]
pub struct SubmitReportResult {
    pub report: ExportedReport,
    /// Attempts used, starting at 1.
    pub attempts: u32,
}

/// Error type for report submission.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SubmitReportError {
    #[error("export format {0} is not supported by this exporter")]
    UnsupportedFormat(ExportFormat),

    #[error("export failed after {attempts} attempt(s): {source}")]
    Export {
        attempts: u32,
        #[source]
        source: ExportError,
    },
}

/// Handler for exporting reports.
///
/// # Usage
///
/// ```rust,ignore
/// let handler = SubmitReportHandler::new(exporter).with_retry(3, Duration::from_millis(500));
/// let result = handler.handle(SubmitReportCommand::markdown(payload)).await?;
/// ```
pub struct SubmitReportHandler {
    exporter: Arc<dyn ReportExporter>,
    max_attempts: u32,
    backoff: Duration,
}

impl SubmitReportHandler {
    /// Creates a handler that tries each export once.
    pub fn new(exporter: Arc<dyn ReportExporter>) -> Self {
        Self {
            exporter,
            max_attempts: 1,
            backoff: Duration::ZERO,
        }
    }

    /// Sets the attempt budget (at least one) and the delay between attempts.
    pub fn with_retry(mut self, max_attempts: u32, backoff: Duration) -> Self {
        self.max_attempts = max_attempts.max(1);
        self.backoff = backoff;
        self
    }

    pub async fn handle(
        &self,
        cmd: SubmitReportCommand,
    ) -> Result<SubmitReportResult, SubmitReportError> {
        if !self.exporter.supported_formats().contains(&cmd.format) {
            return Err(SubmitReportError::UnsupportedFormat(cmd.format));
        }

        let mut attempts = 0;
        loop {
            attempts += 1;
            match self.exporter.export(&cmd.payload, cmd.format).await {
                Ok(report) => {
                    tracing::info!(
                        filename = %report.filename,
                        format = %cmd.format,
                        attempts,
                        "Report exported"
                    );
                    return Ok(SubmitReportResult { report, attempts });
                }
                Err(err) if err.is_retryable() && attempts < self.max_attempts => {
                    tracing::warn!(error = %err, attempts, "Report export failed, retrying");
                    if !self.backoff.is_zero() {
                        sleep(self.backoff).await;
                    }
                }
                Err(err) => {
                    tracing::error!(error = %err, attempts, "Report export failed");
                    return Err(SubmitReportError::Export {
                        attempts,
                        source: err,
                    });
                }
            }
        }
    }
}
