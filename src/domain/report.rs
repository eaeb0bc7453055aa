//! Report payload handed to the export collaborator.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::domain::foundation::Timestamp;
use crate::domain::generation::{QuestionSource, Responses};
use crate::domain::questionnaire::{Question, QuestionSet, QuestionStep, ResponseValue};

/// Everything collected during one wizard session, frozen at submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportPayload {
    pub product_name: String,
    pub product_category: String,
    pub responses: Responses,
    pub per_step_questions: BTreeMap<QuestionStep, QuestionSet>,
    /// How each step's questions were obtained at assembly time.
    pub per_step_sources: BTreeMap<QuestionStep, QuestionSource>,
    pub generated_at: Timestamp,
}

impl ReportPayload {
    /// Returns the questions for a step, empty when the step is missing.
    pub fn questions_for(&self, step: QuestionStep) -> &[Question] {
        self.per_step_questions
            .get(&step)
            .map(|set| &set[..])
            .unwrap_or(&[])
    }

    /// Returns the response for a question id, if any.
    pub fn response(&self, question_id: &str) -> Option<&ResponseValue> {
        self.responses.get(question_id)
    }

    /// Number of questions across all steps.
    pub fn total_questions(&self) -> usize {
        self.per_step_questions.values().map(|set| set.len()).sum()
    }

    /// Number of questions with an actual answer.
    pub fn answered_questions(&self) -> usize {
        self.per_step_questions
            .values()
            .flat_map(|set| set.iter())
            .filter(|q| {
                self.responses
                    .get(q.id.as_str())
                    .map(ResponseValue::is_answered)
                    .unwrap_or(false)
            })
            .count()
    }

    /// True when any step had to use fallback questions.
    pub fn used_fallback(&self) -> bool {
        self.per_step_sources
            .values()
            .any(|s| *s == QuestionSource::Fallback)
    }
}
