//! Application layer: use-case orchestration over the ports.

pub mod allergy;
pub mod analysis;
pub mod dialogue;

pub use allergy::AllergyFlow;
pub use analysis::AnalysisWorker;
pub use dialogue::{DialogueEngine, DialogueError};
