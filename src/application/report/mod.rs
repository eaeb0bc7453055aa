//! Report assembly and submission.

mod assembler;
mod submit;

pub use assembler::ReportAssembler;
pub use submit::{SubmitReportCommand, SubmitReportError, SubmitReportHandler, SubmitReportResult};
