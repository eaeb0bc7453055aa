//! Application layer - Use cases over the questionnaire domain.
//!
//! Coordinates domain types with the provider and exporter ports.

pub mod generation;
pub mod report;
pub mod wizard;

pub use generation::{GenerationDiagnostics, GenerationStats, QuestionGenerationService};
pub use report::{
    ReportAssembler, SubmitReportCommand, SubmitReportError, SubmitReportHandler,
    SubmitReportResult,
};
pub use wizard::{
    GenerationApplied, GenerationRequest, GenerationTicket, ReviewSummary, StepSummary,
    WizardError, WizardOrchestrator, WizardState,
};
