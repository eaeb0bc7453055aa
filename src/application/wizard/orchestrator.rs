//! WizardOrchestrator - Drives one questionnaire session.
//!
//! Step changes that land on an AI-driven step produce a `GenerationRequest`.
//! The caller runs the generation (or uses the async convenience methods)
//! and hands the outcome back with `complete_generation`. An outcome is only
//! applied if its ticket is still the live one for the current step; leaving
//! a step cancels its ticket, so late results are discarded.

use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::application::generation::QuestionGenerationService;
use crate::application::report::ReportAssembler;
use crate::domain::foundation::{QuestionId, StateMachine, ValidationError};
use crate::domain::generation::{GenerationOutcome, GenerationParams, QuestionSource};
use crate::domain::questionnaire::{
    ProductCategory, QuestionSet, QuestionStep, ResponseError, ResponseValue, WizardStep,
};
use crate::domain::report::ReportPayload;

use super::errors::WizardError;
use super::state::WizardState;

/// Identifies one generation request issued by the orchestrator.
///
/// Ids are unique within the issuing session only.
#[derive(Debug, Clone)]
pub struct GenerationTicket {
    id: u64,
    step: QuestionStep,
    token: CancellationToken,
}

impl GenerationTicket {
    fn new(id: u64, step: QuestionStep) -> Self {
        Self {
            id,
            step,
            token: CancellationToken::new(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn step(&self) -> QuestionStep {
        self.step
    }

    /// True once the orchestrator has moved away from this ticket's step.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves when the ticket is cancelled.
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }
}

/// A generation the caller should run for the step just entered.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub ticket: GenerationTicket,
    pub params: GenerationParams,
}

/// What `complete_generation` did with an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationApplied {
    Applied,
    /// Stale: the ticket was cancelled or superseded.
    Discarded,
}

/// Per-step line of the review summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepSummary {
    pub step: QuestionStep,
    pub title: &'static str,
    pub total_questions: usize,
    pub answered: usize,
    pub unanswered_required: Vec<QuestionId>,
    pub source: Option<QuestionSource>,
}

/// Review step overview.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewSummary {
    pub product_name: String,
    pub product_category: String,
    pub category_label: String,
    pub steps: Vec<StepSummary>,
}

impl ReviewSummary {
    /// True when no applied step has an unanswered required question.
    pub fn is_complete(&self) -> bool {
        self.steps.iter().all(|s| s.unanswered_required.is_empty())
    }
}

/// Orchestrates one wizard session.
///
/// Owns its generation service (and therefore its cache) for the lifetime
/// of the session.
#[derive(Debug)]
pub struct WizardOrchestrator {
    state: WizardState,
    service: QuestionGenerationService,
    assembler: ReportAssembler,
    in_flight: Option<GenerationTicket>,
    next_ticket: u64,
}

impl WizardOrchestrator {
    /// Starts a session at the product information step.
    pub fn new(service: QuestionGenerationService) -> Self {
        Self {
            state: WizardState::new("", ""),
            assembler: ReportAssembler::new(service.clone()),
            service,
            in_flight: None,
            next_ticket: 1,
        }
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn current_step(&self) -> WizardStep {
        self.state.step()
    }

    pub fn service(&self) -> &QuestionGenerationService {
        &self.service
    }

    /// Questions applied for the current step, if it is AI-driven.
    pub fn current_questions(&self) -> Option<&QuestionSet> {
        self.state
            .step()
            .question_step()
            .and_then(|step| self.state.question_set(step))
    }

    /// True while a generation for the current step is outstanding.
    pub fn is_generating(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn set_product_name(&mut self, name: impl Into<String>) {
        self.state.set_product_name(name.into());
    }

    pub fn set_product_category(&mut self, category: impl Into<String>) {
        self.state.set_product_category(category.into());
    }

    // ----- Step transitions -----

    /// Moves forward one step.
    ///
    /// Leaving the product information step requires a product name and
    /// category. Returns a request when the new step needs questions.
    pub fn begin_next(&mut self) -> Result<Option<GenerationRequest>, WizardError> {
        let from = self.state.step();
        let to = from.next().ok_or(WizardError::InvalidTransition { from, to: from })?;

        if from == WizardStep::ProductInfo && !self.state.has_product_info() {
            let field = if self.state.product_name().trim().is_empty() {
                "product_name"
            } else {
                "product_category"
            };
            return Err(ValidationError::empty_field(field).into());
        }

        self.enter(to)
    }

    /// Moves back to any earlier step.
    pub fn begin_back(&mut self, target: WizardStep) -> Result<Option<GenerationRequest>, WizardError> {
        let from = self.state.step();
        if target >= from {
            return Err(WizardError::InvalidTransition { from, to: target });
        }
        self.enter(target)
    }

    /// Re-requests questions for the current step.
    ///
    /// Returns `None` on steps without generated questions. Any outstanding
    /// request for the step is superseded.
    pub fn begin_retry(&mut self) -> Option<GenerationRequest> {
        let step = self.state.step().question_step()?;
        self.cancel_in_flight();
        Some(self.issue(step))
    }

    /// Applies an outcome if its ticket is still live for the current step.
    pub fn complete_generation(
        &mut self,
        ticket: GenerationTicket,
        outcome: GenerationOutcome,
    ) -> GenerationApplied {
        let live = self
            .in_flight
            .as_ref()
            .map(|t| t.id == ticket.id)
            .unwrap_or(false);
        let on_step = self.state.step().question_step() == Some(ticket.step);

        if !live || !on_step || ticket.is_cancelled() {
            tracing::debug!(
                ticket = ticket.id,
                step = %ticket.step,
                "Discarding stale generation result"
            );
            return GenerationApplied::Discarded;
        }

        self.in_flight = None;
        if outcome.is_clean() {
            tracing::debug!(step = %ticket.step, cached = outcome.from_cache, "Applying generated questions");
        } else {
            tracing::info!(
                step = %ticket.step,
                source = %outcome.source,
                warnings = outcome.warnings.len(),
                "Applying degraded question set"
            );
        }
        self.state
            .apply_question_set(ticket.step, outcome.questions, outcome.source);
        GenerationApplied::Applied
    }

    /// Moves forward and loads questions for the new step.
    pub async fn next(&mut self) -> Result<WizardStep, WizardError> {
        let request = self.begin_next()?;
        self.run(request).await;
        Ok(self.state.step())
    }

    /// Moves back and reloads questions for the target step.
    pub async fn back(&mut self, target: WizardStep) -> Result<WizardStep, WizardError> {
        let request = self.begin_back(target)?;
        self.run(request).await;
        Ok(self.state.step())
    }

    /// Reloads questions for the current step.
    pub async fn retry(&mut self) -> Option<GenerationApplied> {
        let request = self.begin_retry()?;
        Some(self.run(Some(request)).await)
    }

    async fn run(&mut self, request: Option<GenerationRequest>) -> GenerationApplied {
        match request {
            Some(GenerationRequest { ticket, params }) => {
                let outcome = self.service.generate(&params).await;
                self.complete_generation(ticket, outcome)
            }
            None => GenerationApplied::Discarded,
        }
    }

    fn enter(&mut self, target: WizardStep) -> Result<Option<GenerationRequest>, WizardError> {
        let from = self.state.step();
        let to = from
            .transition_to(target)
            .map_err(|_| WizardError::InvalidTransition { from, to: target })?;

        self.cancel_in_flight();
        self.state.set_step(to);
        tracing::debug!(session_id = %self.state.session_id(), from = %from, to = %to, "Wizard step changed");

        Ok(to.question_step().map(|step| self.issue(step)))
    }

    fn issue(&mut self, step: QuestionStep) -> GenerationRequest {
        let ticket = GenerationTicket::new(self.next_ticket, step);
        self.next_ticket += 1;
        self.in_flight = Some(ticket.clone());

        GenerationRequest {
            ticket,
            params: GenerationParams::new(self.state.product_category(), step)
                .with_prior_responses(self.state.responses().clone()),
        }
    }

    fn cancel_in_flight(&mut self) {
        if let Some(ticket) = self.in_flight.take() {
            ticket.token.cancel();
        }
    }

    // ----- Responses -----

    /// Records an answer after checking it against its question.
    pub fn set_response(
        &mut self,
        question_id: &str,
        value: ResponseValue,
    ) -> Result<(), WizardError> {
        let (_, question) = self
            .state
            .find_question(question_id)
            .ok_or_else(|| ResponseError::UnknownQuestion(question_id.to_string()))?;
        question.check_response(&value)?;
        let id = question.id.clone();

        self.state.responses_mut().insert(id, value);
        Ok(())
    }

    /// Toggles one option of a multi-select answer.
    ///
    /// Returns whether the option is selected afterwards.
    pub fn toggle_option(&mut self, question_id: &str, option: &str) -> Result<bool, WizardError> {
        let (_, question) = self
            .state
            .find_question(question_id)
            .ok_or_else(|| ResponseError::UnknownQuestion(question_id.to_string()))?;

        if question.kind.is_choice() && !question.has_option(option) {
            return Err(ResponseError::OptionNotAllowed {
                question_id: question.id.clone(),
                option: option.to_string(),
            }
            .into());
        }
        let id = question.id.clone();
        let kind = question.kind;

        let mut value = self
            .state
            .response(question_id)
            .filter(|v| v.kind() == kind)
            .cloned()
            .unwrap_or_else(|| ResponseValue::empty(kind));
        let selected = value.toggle_option(option)?;

        self.state.responses_mut().insert(id, value);
        Ok(selected)
    }

    /// Removes an answer, returning it.
    pub fn clear_response(&mut self, question_id: &str) -> Option<ResponseValue> {
        self.state.responses_mut().remove(question_id)
    }

    // ----- Review and submission -----

    /// Step number as a percentage of the wizard length.
    pub fn progress_percent(&self) -> u8 {
        ((u32::from(self.state.step().number()) * 100) / u32::from(WizardStep::TOTAL)) as u8
    }

    pub fn unanswered_required(&self, step: QuestionStep) -> Vec<QuestionId> {
        self.state
            .unanswered_required(step)
            .into_iter()
            .map(|q| q.id.clone())
            .collect()
    }

    pub fn review_summary(&self) -> ReviewSummary {
        let steps = QuestionStep::all()
            .iter()
            .map(|step| {
                let questions = self.state.question_set(*step);
                let answered = questions
                    .map(|set| {
                        set.iter()
                            .filter(|q| {
                                self.state
                                    .response(q.id.as_str())
                                    .map(ResponseValue::is_answered)
                                    .unwrap_or(false)
                            })
                            .count()
                    })
                    .unwrap_or(0);

                StepSummary {
                    step: *step,
                    title: step.wizard_step().display_name(),
                    total_questions: questions.map(|set| set.len()).unwrap_or(0),
                    answered,
                    unanswered_required: self.unanswered_required(*step),
                    source: self.state.question_source(*step),
                }
            })
            .collect();

        ReviewSummary {
            product_name: self.state.product_name().to_string(),
            product_category: self.state.product_category().to_string(),
            category_label: ProductCategory::label_for(self.state.product_category()).to_string(),
            steps,
        }
    }

    /// Assembles the report. Only allowed from the review step.
    pub async fn submit(&self) -> Result<ReportPayload, WizardError> {
        let step = self.state.step();
        if step != WizardStep::Review {
            return Err(WizardError::NotAtReview(step));
        }
        Ok(self.assembler.assemble(&self.state).await)
    }

    /// Ends the session without submitting.
    pub fn abandon(mut self) {
        self.cancel_in_flight();
        tracing::debug!(session_id = %self.state.session_id(), step = %self.state.step(), "Wizard abandoned");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockQuestionProvider;
    use crate::domain::questionnaire::QuestionKind;
    use std::sync::Arc;

    fn orchestrator(provider: &MockQuestionProvider) -> WizardOrchestrator {
        WizardOrchestrator::new(QuestionGenerationService::new(Arc::new(provider.clone())))
    }

    fn with_product(provider: &MockQuestionProvider) -> WizardOrchestrator {
        let mut wizard = orchestrator(provider);
        wizard.set_product_name("Oat Bar");
        wizard.set_product_category("food");
        wizard
    }

    #[tokio::test]
    async fn next_requires_product_info() {
        let mut wizard = orchestrator(&MockQuestionProvider::unconfigured());

        let err = wizard.next().await.unwrap_err();
        assert!(matches!(err, WizardError::Validation(ValidationError::EmptyField { .. })));
        assert_eq!(wizard.current_step(), WizardStep::ProductInfo);

        wizard.set_product_name("Oat Bar");
        assert!(wizard.next().await.is_err());
        wizard.set_product_category("food");
        assert_eq!(wizard.next().await.unwrap(), WizardStep::Manufacturing);
    }

    #[tokio::test]
    async fn entering_ai_step_loads_questions() {
        let mut wizard = with_product(&MockQuestionProvider::unconfigured());
        wizard.next().await.unwrap();

        let questions = wizard.current_questions().unwrap();
        assert_eq!(questions.len(), 5);
        assert_eq!(questions[0].id.as_str(), "mfg_1");
        assert_eq!(
            wizard.state().question_source(QuestionStep::Manufacturing),
            Some(QuestionSource::Fallback)
        );
        assert!(!wizard.is_generating());
    }

    #[test]
    fn next_from_review_is_invalid() {
        let mut wizard = with_product(&MockQuestionProvider::unconfigured());
        for _ in 0..4 {
            wizard.begin_next().unwrap();
        }
        assert_eq!(wizard.current_step(), WizardStep::Review);
        assert!(matches!(
            wizard.begin_next(),
            Err(WizardError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn back_must_target_an_earlier_step() {
        let mut wizard = with_product(&MockQuestionProvider::unconfigured());
        wizard.begin_next().unwrap();

        assert!(wizard.begin_back(WizardStep::Testing).is_err());
        assert!(wizard.begin_back(WizardStep::Manufacturing).is_err());
        assert!(wizard.begin_back(WizardStep::ProductInfo).unwrap().is_none());
    }

    #[test]
    fn leaving_a_step_discards_its_late_result() {
        let mut wizard = with_product(&MockQuestionProvider::unconfigured());
        let manufacturing = wizard.begin_next().unwrap().unwrap();
        let testing = wizard.begin_next().unwrap().unwrap();

        assert!(manufacturing.ticket.is_cancelled());
        assert!(!testing.ticket.is_cancelled());

        let stale = GenerationOutcome::fallback(QuestionSet::default(), vec![]);
        assert_eq!(
            wizard.complete_generation(manufacturing.ticket, stale),
            GenerationApplied::Discarded
        );
        assert!(wizard.state().question_set(QuestionStep::Manufacturing).is_none());
        assert!(wizard.is_generating());
    }

    #[tokio::test]
    async fn back_and_forth_only_applies_the_latest_request() {
        let provider = MockQuestionProvider::unconfigured();
        let mut wizard = with_product(&provider);
        let first = wizard.begin_next().unwrap().unwrap();
        wizard.begin_back(WizardStep::ProductInfo).unwrap();
        let second = wizard.begin_next().unwrap().unwrap();

        let service = wizard.service().clone();
        let first_outcome = service.generate(&first.params).await;
        let second_outcome = service.generate(&second.params).await;

        assert_eq!(
            wizard.complete_generation(first.ticket, first_outcome),
            GenerationApplied::Discarded
        );
        assert_eq!(
            wizard.complete_generation(second.ticket, second_outcome),
            GenerationApplied::Applied
        );
        assert!(wizard.current_questions().is_some());
    }

    #[test]
    fn retry_supersedes_outstanding_request() {
        let mut wizard = with_product(&MockQuestionProvider::unconfigured());
        let original = wizard.begin_next().unwrap().unwrap();
        let retry = wizard.begin_retry().unwrap();

        assert!(original.ticket.is_cancelled());
        assert_eq!(retry.ticket.step(), QuestionStep::Manufacturing);
        assert_ne!(retry.ticket.id(), original.ticket.id());
    }

    #[test]
    fn retry_is_a_no_op_outside_ai_steps() {
        let mut wizard = with_product(&MockQuestionProvider::unconfigured());
        assert!(wizard.begin_retry().is_none());
    }

    #[tokio::test]
    async fn retry_after_fallback_reaches_provider_once_configured() {
        let provider = MockQuestionProvider::unconfigured().with_response(
            r#"[{"id": "mfg_1", "question": "Origin?", "type": "text", "required": true}]"#,
        );
        let mut wizard = with_product(&provider);
        wizard.next().await.unwrap();
        assert_eq!(wizard.current_questions().unwrap().len(), 5);

        provider.set_configured(true);
        assert_eq!(wizard.retry().await, Some(GenerationApplied::Applied));

        assert_eq!(wizard.current_questions().unwrap().len(), 1);
        assert_eq!(
            wizard.state().question_source(QuestionStep::Manufacturing),
            Some(QuestionSource::Provider)
        );
    }

    #[tokio::test]
    async fn prior_responses_flow_into_next_request() {
        let mut wizard = with_product(&MockQuestionProvider::unconfigured());
        wizard.next().await.unwrap();
        wizard.set_response("mfg_3", ResponseValue::yes_no(true)).unwrap();

        let request = wizard.begin_next().unwrap().unwrap();
        assert_eq!(request.params.step, QuestionStep::Testing);
        assert_eq!(request.params.category, "food");
        assert_eq!(
            request.params.prior_responses.get("mfg_3"),
            Some(&ResponseValue::yes_no(true))
        );
    }

    #[tokio::test]
    async fn next_reports_the_blank_product_field() {
        let mut wizard = orchestrator(&MockQuestionProvider::unconfigured());
        wizard.set_product_name("Oat Bar");
        wizard.set_product_category("   ");

        match wizard.begin_next() {
            Err(WizardError::Validation(err)) => assert_eq!(err.field(), "product_category"),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn ticket_ids_are_scoped_to_the_session() {
        let mut first = with_product(&MockQuestionProvider::unconfigured());
        let mut second = with_product(&MockQuestionProvider::unconfigured());

        let a = first.begin_next().unwrap().unwrap();
        let b = second.begin_next().unwrap().unwrap();
        let c = first.begin_retry().unwrap();

        assert_eq!(a.ticket.id(), 1);
        assert_eq!(b.ticket.id(), 1);
        assert_eq!(c.ticket.id(), 2);
    }

    #[tokio::test]
    async fn shared_id_across_steps_answers_the_question_on_screen() {
        let provider = MockQuestionProvider::new()
            .with_response(r#"[{"id": "q1", "question": "Where is it made?", "type": "text", "required": true}]"#)
            .with_response(r#"[{"id": "q1", "question": "Is it certified?", "type": "boolean", "required": true}]"#)
            .with_response(r#"[{"id": "q2", "question": "Options?", "type": "multiselect", "required": false, "options": ["A", "B"]}]"#);
        let mut wizard = with_product(&provider);

        wizard.next().await.unwrap();
        wizard.set_response("q1", ResponseValue::text("Lyon")).unwrap();

        wizard.next().await.unwrap();
        wizard.set_response("q1", ResponseValue::yes_no(true)).unwrap();
        assert_eq!(wizard.state().response("q1"), Some(&ResponseValue::yes_no(true)));
        assert!(matches!(
            wizard.set_response("q1", ResponseValue::text("Lyon")),
            Err(WizardError::Response(ResponseError::KindMismatch { .. }))
        ));

        wizard.next().await.unwrap();
        assert!(wizard.toggle_option("q2", "A").unwrap());
    }

    #[tokio::test]
    async fn set_response_validates_against_question() {
        let mut wizard = with_product(&MockQuestionProvider::unconfigured());
        wizard.next().await.unwrap();

        assert!(wizard.set_response("mfg_2", ResponseValue::select("Organic")).is_ok());
        assert!(matches!(
            wizard.set_response("mfg_2", ResponseValue::select("Synthetic")),
            Err(WizardError::Response(ResponseError::OptionNotAllowed { .. }))
        ));
        assert!(matches!(
            wizard.set_response("mfg_3", ResponseValue::text("yes")),
            Err(WizardError::Response(ResponseError::KindMismatch { .. }))
        ));
        assert!(matches!(
            wizard.set_response("zzz_1", ResponseValue::text("?")),
            Err(WizardError::Response(ResponseError::UnknownQuestion(_)))
        ));
    }

    #[tokio::test]
    async fn toggle_option_adds_and_removes() {
        let mut wizard = with_product(&MockQuestionProvider::unconfigured());
        wizard.next().await.unwrap();

        assert!(wizard.toggle_option("mfg_5", "Nuts").unwrap());
        assert!(wizard.toggle_option("mfg_5", "Soy").unwrap());
        assert!(!wizard.toggle_option("mfg_5", "Nuts").unwrap());
        assert_eq!(
            wizard.state().response("mfg_5"),
            Some(&ResponseValue::multi_select(["Soy"]))
        );

        assert!(wizard.toggle_option("mfg_5", "Shellfish").is_err());
        assert!(matches!(
            wizard.toggle_option("mfg_2", "Organic"),
            Err(WizardError::Response(ResponseError::NotMultiSelect {
                actual: QuestionKind::Select
            }))
        ));
    }

    #[tokio::test]
    async fn clear_response_removes_answer() {
        let mut wizard = with_product(&MockQuestionProvider::unconfigured());
        wizard.next().await.unwrap();
        wizard.set_response("mfg_1", ResponseValue::text("Local")).unwrap();

        assert_eq!(wizard.clear_response("mfg_1"), Some(ResponseValue::text("Local")));
        assert!(wizard.clear_response("mfg_1").is_none());
    }

    #[tokio::test]
    async fn progress_tracks_step_number() {
        let mut wizard = with_product(&MockQuestionProvider::unconfigured());
        assert_eq!(wizard.progress_percent(), 20);
        wizard.next().await.unwrap();
        wizard.next().await.unwrap();
        assert_eq!(wizard.progress_percent(), 60);
    }

    #[tokio::test]
    async fn review_summary_reports_gaps() {
        let mut wizard = with_product(&MockQuestionProvider::unconfigured());
        wizard.next().await.unwrap();
        wizard.set_response("mfg_1", ResponseValue::text("Local")).unwrap();

        let summary = wizard.review_summary();
        assert_eq!(summary.category_label, "Food & Beverages");
        let manufacturing = &summary.steps[0];
        assert_eq!(manufacturing.total_questions, 5);
        assert_eq!(manufacturing.answered, 1);
        assert_eq!(manufacturing.unanswered_required.len(), 2);
        assert_eq!(summary.steps[1].total_questions, 0);
        assert!(!summary.is_complete());
    }

    #[tokio::test]
    async fn submit_only_from_review() {
        let mut wizard = with_product(&MockQuestionProvider::unconfigured());
        assert!(matches!(
            wizard.submit().await,
            Err(WizardError::NotAtReview(WizardStep::ProductInfo))
        ));

        for _ in 0..4 {
            wizard.next().await.unwrap();
        }
        wizard.set_response("env_1", ResponseValue::yes_no(false)).unwrap();

        let payload = wizard.submit().await.unwrap();
        assert_eq!(payload.product_name, "Oat Bar");
        assert_eq!(payload.per_step_questions.len(), 3);
        assert_eq!(payload.response("env_1"), Some(&ResponseValue::yes_no(false)));
    }

    #[test]
    fn abandon_cancels_outstanding_request() {
        let mut wizard = with_product(&MockQuestionProvider::unconfigured());
        let request = wizard.begin_next().unwrap().unwrap();

        wizard.abandon();
        assert!(request.ticket.is_cancelled());
    }
}
