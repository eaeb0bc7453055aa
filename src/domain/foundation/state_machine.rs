//! State machine trait for ordered step enums.
//!
//! Gives step-like enums a uniform way to validate a move before the
//! caller commits to it.

use super::ValidationError;

/// Trait for enums whose values form a state machine.
///
/// Implementors define the legal moves and get a validated
/// `transition_to` for free.
///
/// # Example
///
/// ```ignore
/// impl StateMachine for WizardStep {
///     fn can_transition_to(&self, target: &Self) -> bool {
///         target.number() == self.number() + 1 || target.number() < self.number()
///     }
///
///     fn valid_transitions(&self) -> Vec<Self> {
///         // next step, then every earlier step
///     }
/// }
///
/// let step = WizardStep::ProductInfo.transition_to(WizardStep::Manufacturing)?;
/// ```
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// Returns true if transition from self to target is valid.
    fn can_transition_to(&self, target: &Self) -> bool;

    /// Returns all valid target states from current state.
    fn valid_transitions(&self) -> Vec<Self>;

    /// Performs transition with validation, returning error if invalid.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(ValidationError::invalid_format(
                "state_transition",
                format!("Cannot transition from {:?} to {:?}", self, target),
            ))
        }
    }

    /// Checks if current state is terminal (no valid outgoing transitions).
    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}
