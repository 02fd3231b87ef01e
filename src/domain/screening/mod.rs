//! Screening domain: slot vocabulary, session lifecycle, extraction,
//! question staging and the predictive-index evaluator.

pub mod extractor;
pub mod report;
pub mod session;
pub mod slots;
pub mod stage;
pub mod transcript;
pub mod verdict;
pub mod vocabulary;

pub use report::Reply;
pub use session::{DialogueState, Session, Speaker, Turn};
pub use slots::{SlotField, SlotSet, SlotValue};
pub use verdict::{Possibility, Verdict};
