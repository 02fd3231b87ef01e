//! Validated transitions for lifecycle enums.

use thiserror::Error;

/// A transition the lifecycle does not permit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot transition from {from} to {to}")]
pub struct InvalidTransition {
    pub from: String,
    pub to: String,
}

/// Declares which moves between states are legal.
///
/// The dialogue lifecycle implements this so every state change goes
/// through `transition_to` and an illegal jump surfaces as an error
/// instead of a silently corrupted session.
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// Whether the move from the current state to `target` is allowed.
    fn can_transition_to(&self, target: &Self) -> bool;

    /// States reachable in one step from the current state.
    fn valid_transitions(&self) -> Vec<Self>;

    /// Validates the move and returns the new state, or the rejected pair.
    fn transition_to(&self, target: Self) -> Result<Self, InvalidTransition> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(InvalidTransition {
                from: format!("{:?}", self),
                to: format!("{:?}", target),
            })
        }
    }

    /// A state with no way out.
    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}
