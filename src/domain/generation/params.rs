//! Input to a single question-generation call.

use std::collections::BTreeMap;

use crate::domain::foundation::QuestionId;
use crate::domain::questionnaire::{QuestionStep, ResponseValue};

/// Responses keyed by question id, ordered for stable serialization.
pub type Responses = BTreeMap<QuestionId, ResponseValue>;

/// Parameters for generating one question set.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    pub category: String,
    pub step: QuestionStep,
    /// Earlier answers used to personalize the prompt; ignored for cache matching.
    pub prior_responses: Responses,
}

impl GenerationParams {
    /// Creates parameters without prior responses.
    pub fn new(category: impl Into<String>, step: QuestionStep) -> Self {
        Self {
            category: category.into(),
            step,
            prior_responses: Responses::new(),
        }
    }

    /// Attaches prior responses as personalization context.
    pub fn with_prior_responses(mut self, responses: Responses) -> Self {
        self.prior_responses = responses;
        self
    }
}
