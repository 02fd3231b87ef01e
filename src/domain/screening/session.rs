//! Session aggregate: dialogue state, transcript and slot record.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{InvalidTransition, StateMachine};

use super::slots::SlotSet;

/// Lifecycle of one screening conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DialogueState {
    Init,
    Collecting,
    ConfirmAnalysis,
    PostAnalysis,
}

impl StateMachine for DialogueState {
    fn can_transition_to(&self, target: &Self) -> bool {
        use DialogueState::*;
        matches!(
            (self, target),
            (Init, Collecting)
                | (Collecting, ConfirmAnalysis)
                | (Collecting, Init)
                | (ConfirmAnalysis, Collecting)
                | (ConfirmAnalysis, PostAnalysis)
                | (ConfirmAnalysis, Init)
                | (PostAnalysis, Collecting)
                | (PostAnalysis, ConfirmAnalysis)
                | (PostAnalysis, Init)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use DialogueState::*;
        match self {
            Init => vec![Collecting],
            Collecting => vec![ConfirmAnalysis, Init],
            ConfirmAnalysis => vec![Collecting, PostAnalysis, Init],
            PostAnalysis => vec![Collecting, ConfirmAnalysis, Init],
        }
    }
}

/// Who produced a transcript turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Agent,
}

/// One transcript entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub speaker: Speaker,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Turn {
            speaker: Speaker::User,
            text: text.into(),
        }
    }

    pub fn agent(text: impl Into<String>) -> Self {
        Turn {
            speaker: Speaker::Agent,
            text: text.into(),
        }
    }
}

impl fmt::Display for Turn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.speaker {
            Speaker::User => write!(f, "사용자: {}", self.text),
            Speaker::Agent => write!(f, "챗봇: {}", self.text),
        }
    }
}

/// One user's screening conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub state: DialogueState,
    pub history: Vec<Turn>,
    pub slots: SlotSet,
}

impl Session {
    pub fn new() -> Self {
        Session {
            state: DialogueState::Init,
            history: Vec::new(),
            slots: SlotSet::new(),
        }
    }

    /// Moves to `target`, validating against the state machine.
    /// Staying in the current state is always a no-op.
    pub fn set_state(&mut self, target: DialogueState) -> Result<(), InvalidTransition> {
        if self.state != target {
            self.state = self.state.transition_to(target)?;
        }
        Ok(())
    }

    pub fn push_user(&mut self, text: impl Into<String>) {
        self.history.push(Turn::user(text));
    }

    pub fn push_agent(&mut self, text: impl Into<String>) {
        self.history.push(Turn::agent(text));
    }

    /// The most recent `n` turns, oldest first.
    pub fn recent(&self, n: usize) -> &[Turn] {
        let start = self.history.len().saturating_sub(n);
        &self.history[start..]
    }

    pub fn last_agent_text(&self) -> Option<&str> {
        self.history
            .iter()
            .rev()
            .find(|t| t.speaker == Speaker::Agent)
            .map(|t| t.text.as_str())
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
