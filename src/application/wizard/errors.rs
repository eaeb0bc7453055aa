//! Wizard errors.

use thiserror::Error;

use crate::domain::foundation::ValidationError;
use crate::domain::questionnaire::{ResponseError, WizardStep};

/// Errors returned by wizard operations.
///
/// Generation problems never show up here; they travel as warnings on the
/// generation outcome.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WizardError {
    /// A guard refused the move (e.g. missing product information).
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("cannot move from {from} to {to}")]
    InvalidTransition { from: WizardStep, to: WizardStep },

    #[error("invalid response: {0}")]
    Response(#[from] ResponseError),

    #[error("report can only be submitted from the review step, current step is {0}")]
    NotAtReview(WizardStep),
}
