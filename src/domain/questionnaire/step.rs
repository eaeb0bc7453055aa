//! Wizard steps and the AI-driven subset of them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{StateMachine, ValidationError};

/// The five ordered states of the questionnaire wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    ProductInfo,
    Manufacturing,
    Testing,
    Environmental,
    Review,
}

impl WizardStep {
    /// Number of steps in the wizard.
    pub const TOTAL: u8 = 5;

    /// Returns all steps in wizard order.
    pub fn all() -> &'static [WizardStep] {
        &[
            WizardStep::ProductInfo,
            WizardStep::Manufacturing,
            WizardStep::Testing,
            WizardStep::Environmental,
            WizardStep::Review,
        ]
    }

    /// Returns the 1-based step number.
    pub fn number(&self) -> u8 {
        match self {
            WizardStep::ProductInfo => 1,
            WizardStep::Manufacturing => 2,
            WizardStep::Testing => 3,
            WizardStep::Environmental => 4,
            WizardStep::Review => 5,
        }
    }

    /// Resolves a 1-based step number.
    pub fn from_number(number: u8) -> Result<Self, ValidationError> {
        Self::all()
            .iter()
            .copied()
            .find(|s| s.number() == number)
            .ok_or_else(|| ValidationError::invalid_format("step", format!("no step {}", number)))
    }

    /// Returns the following step, if any.
    pub fn next(&self) -> Option<WizardStep> {
        Self::from_number(self.number() + 1).ok()
    }

    /// Returns the preceding step, if any.
    pub fn previous(&self) -> Option<WizardStep> {
        self.number()
            .checked_sub(1)
            .and_then(|n| Self::from_number(n).ok())
    }

    /// Returns the generation step backing this wizard step, if it is AI-driven.
    pub fn question_step(&self) -> Option<QuestionStep> {
        match self {
            WizardStep::Manufacturing => Some(QuestionStep::Manufacturing),
            WizardStep::Testing => Some(QuestionStep::Testing),
            WizardStep::Environmental => Some(QuestionStep::Environmental),
            WizardStep::ProductInfo | WizardStep::Review => None,
        }
    }

    /// Returns the display name.
    pub fn display_name(&self) -> &'static str {
        match self {
            WizardStep::ProductInfo => "Product Information",
            WizardStep::Manufacturing => "Manufacturing & Sourcing",
            WizardStep::Testing => "Testing & Certifications",
            WizardStep::Environmental => "Environmental Impact",
            WizardStep::Review => "Review & Submit",
        }
    }
}

impl StateMachine for WizardStep {
    fn can_transition_to(&self, target: &Self) -> bool {
        target.number() == self.number() + 1 || target.number() < self.number()
    }

    fn valid_transitions(&self) -> Vec<Self> {
        let mut targets: Vec<Self> = self.next().into_iter().collect();
        targets.extend(
            Self::all()
                .iter()
                .copied()
                .filter(|s| s.number() < self.number())
                .rev(),
        );
        targets
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// The three AI-driven steps for which question sets are generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionStep {
    Manufacturing,
    Testing,
    Environmental,
}

impl QuestionStep {
    /// Returns all generation steps in wizard order.
    pub fn all() -> &'static [QuestionStep] {
        &[
            QuestionStep::Manufacturing,
            QuestionStep::Testing,
            QuestionStep::Environmental,
        ]
    }

    /// Returns the wire name used in prompts and cache keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionStep::Manufacturing => "manufacturing",
            QuestionStep::Testing => "testing",
            QuestionStep::Environmental => "environmental",
        }
    }

    /// Returns the id prefix that keeps question ids unique across steps.
    pub fn id_prefix(&self) -> &'static str {
        match self {
            QuestionStep::Manufacturing => "mfg_",
            QuestionStep::Testing => "test_",
            QuestionStep::Environmental => "env_",
        }
    }

    /// Returns the wizard step that hosts this generation step.
    pub fn wizard_step(&self) -> WizardStep {
        match self {
            QuestionStep::Manufacturing => WizardStep::Manufacturing,
            QuestionStep::Testing => WizardStep::Testing,
            QuestionStep::Environmental => WizardStep::Environmental,
        }
    }
}

impl fmt::Display for QuestionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionStep {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "manufacturing" => Ok(QuestionStep::Manufacturing),
            "testing" => Ok(QuestionStep::Testing),
            "environmental" => Ok(QuestionStep::Environmental),
            other => Err(ValidationError::invalid_format(
                "step",
                format!("unknown question step '{}'", other),
            )),
        }
    }
}
