//! ReportAssembler - Builds the report payload at submission.
//!
//! Every AI-driven step is resolved again through the generation service
//! with the final responses, so the payload always carries a full question
//! set per step even when a step was skipped or fell back earlier. The
//! service's cache keeps this from costing extra provider calls.

use futures::future::join_all;
use std::collections::BTreeMap;

use crate::application::generation::QuestionGenerationService;
use crate::application::wizard::WizardState;
use crate::domain::foundation::Timestamp;
use crate::domain::generation::GenerationParams;
use crate::domain::questionnaire::QuestionStep;
use crate::domain::report::ReportPayload;

/// Assembles report payloads from wizard state.
#[derive(Debug, Clone)]
pub struct ReportAssembler {
    service: QuestionGenerationService,
}

impl ReportAssembler {
    pub fn new(service: QuestionGenerationService) -> Self {
        Self { service }
    }

    /// Builds the payload. Cannot fail; generation problems degrade to fallback.
    pub async fn assemble(&self, state: &WizardState) -> ReportPayload {
        let generations = QuestionStep::all().iter().map(|step| {
            let params = GenerationParams::new(state.product_category(), *step)
                .with_prior_responses(state.responses().clone());
            async move { (*step, self.service.generate(&params).await) }
        });

        let mut per_step_questions = BTreeMap::new();
        let mut per_step_sources = BTreeMap::new();
        for (step, outcome) in join_all(generations).await {
            if !outcome.warnings.is_empty() {
                tracing::debug!(
                    step = %step,
                    source = %outcome.source,
                    warnings = outcome.warnings.len(),
                    "Report step resolved with warnings"
                );
            }
            per_step_sources.insert(step, outcome.source);
            per_step_questions.insert(step, outcome.questions);
        }

        let payload = ReportPayload {
            product_name: state.product_name().to_string(),
            product_category: state.product_category().to_string(),
            responses: state.responses().clone(),
            per_step_questions,
            per_step_sources,
            generated_at: Timestamp::now(),
        };

        tracing::info!(
            session_id = %state.session_id(),
            questions = payload.total_questions(),
            answered = payload.answered_questions(),
            "Report assembled"
        );

        payload
    }
}
