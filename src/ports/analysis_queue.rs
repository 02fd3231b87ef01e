//! Analysis Queue Port - Interface for deferring the verdict computation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::screening::{SlotSet, Turn};

use super::session_store::UserKey;

/// Self-contained deferred analysis job.
///
/// Carries everything the worker needs so it never re-reads live
/// session state; delivery is at-least-once and processing must
/// tolerate duplicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisTask {
    pub task_id: Uuid,
    pub user_key: UserKey,
    pub history: Vec<Turn>,
    pub slots: SlotSet,
    pub callback_url: String,
}

impl AnalysisTask {
    pub fn new(
        user_key: UserKey,
        history: Vec<Turn>,
        slots: SlotSet,
        callback_url: impl Into<String>,
    ) -> Self {
        AnalysisTask {
            task_id: Uuid::new_v4(),
            user_key,
            history,
            slots,
            callback_url: callback_url.into(),
        }
    }
}

/// Errors that can occur while enqueuing a task
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("failed to enqueue analysis task: {0}")]
    Enqueue(String),
}

/// Port for handing an analysis job to the deferred worker.
#[async_trait]
pub trait AnalysisQueue: Send + Sync {
    /// Enqueues the task; returns as soon as the job is accepted.
    async fn enqueue(&self, task: AnalysisTask) -> Result<(), QueueError>;
}
