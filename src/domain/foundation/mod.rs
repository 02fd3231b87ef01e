//! Shared domain building blocks.

pub mod state_machine;

pub use state_machine::{InvalidTransition, StateMachine};
