//! Questionnaire vocabulary: questions, answers, steps and categories.

mod category;
mod question;
mod response;
mod step;

pub use category::ProductCategory;
pub use question::{Question, QuestionKind, QuestionSet};
pub use response::{ResponseError, ResponseValue};
pub use step::{QuestionStep, WizardStep};
