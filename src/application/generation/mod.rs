//! Question generation service and its in-flight request registry.

mod pending;
mod service;

pub use pending::{Claim, PendingRequests, SharedGeneration};
pub use service::{GenerationDiagnostics, GenerationStats, QuestionGenerationService};
