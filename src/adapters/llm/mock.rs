//! Scripted question service for tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::screening::stage::StageContext;
use crate::domain::screening::Turn;
use crate::ports::{QuestionError, QuestionService};

/// Returns queued responses in order and records every call, so tests
/// can assert both the replies and the contexts the engine built.
#[derive(Default)]
pub struct MockQuestionService {
    questions: Mutex<VecDeque<Result<String, String>>>,
    wait_messages: Mutex<VecDeque<String>>,
    contexts: Mutex<Vec<StageContext>>,
}

impl MockQuestionService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_question(self, question: impl Into<String>) -> Self {
        self.questions
            .lock()
            .unwrap()
            .push_back(Ok(question.into()));
        self
    }

    pub fn with_failure(self) -> Self {
        self.questions
            .lock()
            .unwrap()
            .push_back(Err("scripted failure".to_string()));
        self
    }

    pub fn with_wait_message(self, message: impl Into<String>) -> Self {
        self.wait_messages.lock().unwrap().push_back(message.into());
        self
    }

    /// Stage contexts the engine passed in, in call order.
    pub fn recorded_contexts(&self) -> Vec<StageContext> {
        self.contexts.lock().unwrap().clone()
    }
}

#[async_trait]
impl QuestionService for MockQuestionService {
    async fn next_question(
        &self,
        _recent_history: &[Turn],
        context: &StageContext,
    ) -> Result<String, QuestionError> {
        self.contexts.lock().unwrap().push(context.clone());
        match self.questions.lock().unwrap().pop_front() {
            Some(Ok(question)) => Ok(question),
            Some(Err(message)) => Err(QuestionError::Http(message)),
            None => Err(QuestionError::Parse("no scripted question".to_string())),
        }
    }

    async fn wait_message(&self, _history: &[Turn]) -> Result<String, QuestionError> {
        match self.wait_messages.lock().unwrap().pop_front() {
            Some(message) => Ok(message),
            None => Err(QuestionError::Parse("no scripted wait message".to_string())),
        }
    }
}
