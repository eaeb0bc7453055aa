//! Markdown report exporter adapter.
//!
//! Renders a `ReportPayload` as a markdown transparency report, one section
//! per AI-driven step, or as pretty-printed JSON.

use async_trait::async_trait;

use crate::domain::questionnaire::{ProductCategory, Question, QuestionStep};
use crate::domain::report::ReportPayload;
use crate::ports::{ExportError, ExportFormat, ExportedReport, ReportExporter};

const SUPPORTED: &[ExportFormat] = &[ExportFormat::Markdown, ExportFormat::Json];

const UNANSWERED: &str = "*Not answered*";

/// Template-based implementation of ReportExporter.
#[derive(Debug, Clone, Default)]
pub struct MarkdownReportExporter;

impl MarkdownReportExporter {
    /// Creates a new markdown exporter.
    pub fn new() -> Self {
        Self
    }

    /// Renders the payload as a markdown document.
    pub fn render_markdown(&self, payload: &ReportPayload) -> String {
        let mut doc = String::from("# Product Transparency Report\n\n");

        doc.push_str(&format!("**Product:** {}\n\n", payload.product_name));
        doc.push_str(&format!(
            "**Category:** {}\n\n",
            ProductCategory::label_for(&payload.product_category)
        ));
        doc.push_str(&format!(
            "**Generated:** {}\n\n",
            payload.generated_at.to_report_string()
        ));
        doc.push_str(&format!(
            "**Answered:** {} of {} questions\n\n",
            payload.answered_questions(),
            payload.total_questions()
        ));

        if payload.used_fallback() {
            doc.push_str("> Some sections use standard questions for this category.\n\n");
        }

        for step in QuestionStep::all() {
            doc.push_str(&self.render_section(payload, *step));
        }

        doc
    }

    fn render_section(&self, payload: &ReportPayload, step: QuestionStep) -> String {
        let mut section = format!("## {}\n\n", step.wizard_step().display_name());
        let questions = payload.questions_for(step);

        if questions.is_empty() {
            section.push_str("*No questions*\n\n");
            return section;
        }

        for question in questions {
            section.push_str(&self.render_question(payload, question));
        }
        section
    }

    fn render_question(&self, payload: &ReportPayload, question: &Question) -> String {
        let marker = if question.required { " *" } else { "" };
        let answer = payload
            .response(question.id.as_str())
            .filter(|value| value.is_answered())
            .map(|value| value.display())
            .unwrap_or_else(|| UNANSWERED.to_string());

        format!("### {}{}\n\n{}\n\n", question.prompt, marker, answer)
    }

    fn base_filename(payload: &ReportPayload) -> String {
        let slug: String = payload
            .product_name
            .trim()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
            .collect();
        let slug = slug
            .split('-')
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("-");

        if slug.is_empty() {
            "transparency-report".to_string()
        } else {
            format!("{}-transparency-report", slug)
        }
    }
}

#[async_trait]
impl ReportExporter for MarkdownReportExporter {
    async fn export(
        &self,
        payload: &ReportPayload,
        format: ExportFormat,
    ) -> Result<ExportedReport, ExportError> {
        let filename = Self::base_filename(payload);

        let content = match format {
            ExportFormat::Markdown => self.render_markdown(payload).into_bytes(),
            ExportFormat::Json => serde_json::to_vec_pretty(payload)
                .map_err(|e| ExportError::render_failed(e.to_string()))?,
        };

        Ok(ExportedReport::new(content, format, &filename))
    }

    fn supported_formats(&self) -> &[ExportFormat] {
        SUPPORTED
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{QuestionId, Timestamp};
    use crate::domain::generation::{FallbackCatalog, QuestionSource, Responses};
    use crate::domain::questionnaire::ResponseValue;
    use std::collections::BTreeMap;

    fn payload(name: &str) -> ReportPayload {
        let mut responses = Responses::new();
        responses.insert(QuestionId::new("mfg_3").unwrap(), ResponseValue::yes_no(true));
        responses.insert(
            QuestionId::new("mfg_5").unwrap(),
            ResponseValue::multi_select(["Nuts", "Dairy"]),
        );

        let mut per_step_questions = BTreeMap::new();
        let mut per_step_sources = BTreeMap::new();
        for step in QuestionStep::all() {
            per_step_questions.insert(*step, FallbackCatalog::builtin().lookup("food", *step));
            per_step_sources.insert(*step, QuestionSource::Provider);
        }

        ReportPayload {
            product_name: name.into(),
            product_category: "food".into(),
            responses,
            per_step_questions,
            per_step_sources,
            generated_at: Timestamp::now(),
        }
    }

    #[test]
    fn markdown_has_header_and_every_section() {
        let doc = MarkdownReportExporter::new().render_markdown(&payload("Oat Bar"));

        assert!(doc.starts_with("# Product Transparency Report"));
        assert!(doc.contains("**Category:** Food & Beverages"));
        assert!(doc.contains("## Manufacturing & Sourcing"));
        assert!(doc.contains("## Testing & Certifications"));
        assert!(doc.contains("## Environmental Impact"));
        assert!(!doc.contains("standard questions"));
    }

    #[test]
    fn markdown_renders_answers_and_gaps() {
        let doc = MarkdownReportExporter::new().render_markdown(&payload("Oat Bar"));

        assert!(doc.contains("### Is the manufacturing facility certified? *\n\nYes"));
        assert!(doc.contains("Dairy, Nuts"));
        assert!(doc.contains("### What is the shelf life testing protocol?\n\n*Not answered*"));
        assert!(doc.contains("**Answered:** 2 of 15 questions"));
    }

    #[tokio::test]
    async fn export_markdown_names_file_after_product() {
        let exporter = MarkdownReportExporter::new();
        let report = exporter
            .export(&payload("Oat Bar (Classic)"), ExportFormat::Markdown)
            .await
            .unwrap();

        assert_eq!(report.filename, "oat-bar-classic-transparency-report.md");
        assert!(report.as_text().unwrap().contains("**Product:** Oat Bar (Classic)"));
    }

    #[tokio::test]
    async fn export_json_contains_payload() {
        let exporter = MarkdownReportExporter::new();
        let report = exporter
            .export(&payload("  "), ExportFormat::Json)
            .await
            .unwrap();

        assert_eq!(report.filename, "transparency-report.json");
        let json: serde_json::Value = serde_json::from_slice(&report.content).unwrap();
        assert_eq!(json["responses"]["mfg_3"], true);
        assert_eq!(json["product_category"], "food");
    }

    #[test]
    fn supports_markdown_and_json() {
        assert_eq!(
            MarkdownReportExporter::new().supported_formats(),
            &[ExportFormat::Markdown, ExportFormat::Json]
        );
    }
}
