//! Question Service Port - Interface for generating agent turns.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::screening::stage::StageContext;
use crate::domain::screening::Turn;

/// Errors that can occur while generating a question
#[derive(Debug, Error)]
pub enum QuestionError {
    #[error("question generation timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("question service request failed: {0}")]
    Http(String),

    #[error("could not parse question service output: {0}")]
    Parse(String),
}

/// Port for the natural-language question generator.
///
/// Implementations produce exactly one Korean question per call; the
/// caller supplies the stage context so the generator never re-asks a
/// covered field. Failures are non-fatal: the engine substitutes a
/// fixed fallback question.
#[async_trait]
pub trait QuestionService: Send + Sync {
    /// Generates the next question for the given stage.
    async fn next_question(
        &self,
        recent_history: &[Turn],
        context: &StageContext,
    ) -> Result<String, QuestionError>;

    /// Generates a short contextual interim message shown while the
    /// deferred analysis runs.
    async fn wait_message(&self, history: &[Turn]) -> Result<String, QuestionError>;
}
