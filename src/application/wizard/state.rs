//! Wizard session state.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::domain::foundation::{QuestionId, SessionId, Timestamp};
use crate::domain::generation::{QuestionSource, Responses};
use crate::domain::questionnaire::{Question, QuestionSet, QuestionStep, ResponseValue, WizardStep};

/// Everything one wizard walk-through has collected so far.
///
/// Only the orchestrator mutates a live state; the builder methods exist
/// for assembling snapshots.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WizardState {
    session_id: SessionId,
    started_at: Timestamp,
    step: WizardStep,
    product_name: String,
    product_category: String,
    /// Flat across all steps, keyed by question id.
    responses: Responses,
    last_question_sets: BTreeMap<QuestionStep, QuestionSet>,
    last_sources: BTreeMap<QuestionStep, QuestionSource>,
}

impl WizardState {
    /// Creates a state at the product information step.
    pub fn new(product_name: impl Into<String>, product_category: impl Into<String>) -> Self {
        Self {
            session_id: SessionId::new(),
            started_at: Timestamp::now(),
            step: WizardStep::ProductInfo,
            product_name: product_name.into(),
            product_category: product_category.into(),
            responses: Responses::new(),
            last_question_sets: BTreeMap::new(),
            last_sources: BTreeMap::new(),
        }
    }

    /// Replaces the collected responses.
    pub fn with_responses(mut self, responses: Responses) -> Self {
        self.responses = responses;
        self
    }

    /// Adds one response without validation.
    pub fn with_response(mut self, question_id: QuestionId, value: ResponseValue) -> Self {
        self.responses.insert(question_id, value);
        self
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn started_at(&self) -> Timestamp {
        self.started_at
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    pub fn product_category(&self) -> &str {
        &self.product_category
    }

    pub fn responses(&self) -> &Responses {
        &self.responses
    }

    pub fn response(&self, question_id: &str) -> Option<&ResponseValue> {
        self.responses.get(question_id)
    }

    /// The set last applied for a step, if any.
    pub fn question_set(&self, step: QuestionStep) -> Option<&QuestionSet> {
        self.last_question_sets.get(&step)
    }

    pub fn question_source(&self, step: QuestionStep) -> Option<QuestionSource> {
        self.last_sources.get(&step).copied()
    }

    /// Finds a question in the applied sets, current step first.
    ///
    /// An id shared by several steps resolves to the one on screen; the
    /// other steps are searched in wizard order.
    pub fn find_question(&self, question_id: &str) -> Option<(QuestionStep, &Question)> {
        let current = self.step.question_step();
        let on_screen = current
            .and_then(|step| self.last_question_sets.get(&step).map(|set| (step, set)));

        on_screen
            .into_iter()
            .chain(
                self.last_question_sets
                    .iter()
                    .filter(|(step, _)| Some(**step) != current)
                    .map(|(step, set)| (*step, set)),
            )
            .find_map(|(step, set)| set.get(question_id).map(|q| (step, q)))
    }

    /// Required questions of a step without an actual answer.
    pub fn unanswered_required(&self, step: QuestionStep) -> Vec<&Question> {
        self.question_set(step)
            .map(|set| {
                set.iter()
                    .filter(|q| q.required)
                    .filter(|q| {
                        !self
                            .responses
                            .get(q.id.as_str())
                            .map(ResponseValue::is_answered)
                            .unwrap_or(false)
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// True once both product fields are non-blank.
    pub fn has_product_info(&self) -> bool {
        !self.product_name.trim().is_empty() && !self.product_category.trim().is_empty()
    }

    // ----- Orchestrator mutations -----

    pub(crate) fn set_step(&mut self, step: WizardStep) {
        self.step = step;
    }

    pub(crate) fn set_product_name(&mut self, name: String) {
        self.product_name = name;
    }

    pub(crate) fn set_product_category(&mut self, category: String) {
        self.product_category = category;
    }

    pub(crate) fn responses_mut(&mut self) -> &mut Responses {
        &mut self.responses
    }

    pub(crate) fn apply_question_set(
        &mut self,
        step: QuestionStep,
        questions: QuestionSet,
        source: QuestionSource,
    ) {
        self.last_question_sets.insert(step, questions);
        self.last_sources.insert(step, source);
    }
}
