//! Report export adapters.
//!
//! - `MarkdownReportExporter` - Markdown and JSON rendering of report payloads

mod markdown_exporter;

pub use markdown_exporter::MarkdownReportExporter;
