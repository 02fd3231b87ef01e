//! Generative-language adapters.

pub mod gemini;
pub mod mock;
pub mod unwrap;

pub use gemini::{GeminiClient, GeminiConfig};
pub use mock::MockQuestionService;
