//! Wizard orchestration: step state machine, responses and submission.

mod errors;
mod orchestrator;
mod state;

pub use errors::WizardError;
pub use orchestrator::{
    GenerationApplied, GenerationRequest, GenerationTicket, ReviewSummary, StepSummary,
    WizardOrchestrator,
};
pub use state::WizardState;
