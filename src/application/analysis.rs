//! Deferred analysis worker.
//!
//! Consumes an [`AnalysisTask`], re-derives the slot record from the
//! transcript, evaluates the predictive index, persists the session in
//! POST_ANALYSIS and pushes the verdict card through the callback
//! channel. Task delivery is at-least-once, so processing the same task
//! twice must land in the same state.

use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info};

use crate::domain::screening::{report, transcript, verdict, DialogueState, Reply, Session};
use crate::ports::{AnalysisTask, CallbackSender, SessionStore, StoreError};

const ANALYSIS_FAILED_REPLY: &str =
    "죄송합니다, 답변을 분석하는 중 오류가 발생했어요. 잠시 후 다시 시도해주세요. 😥";

#[derive(Debug, Error)]
enum AnalysisError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Processes deferred analysis tasks end to end.
pub struct AnalysisWorker {
    store: Arc<dyn SessionStore>,
    callbacks: Arc<dyn CallbackSender>,
}

impl AnalysisWorker {
    pub fn new(store: Arc<dyn SessionStore>, callbacks: Arc<dyn CallbackSender>) -> Self {
        AnalysisWorker { store, callbacks }
    }

    /// Runs one task to completion.
    ///
    /// Never returns an error: failures collapse into an apology reply
    /// so the user always hears back if the channel is alive. The
    /// callback itself is a single attempt.
    pub async fn process(&self, task: AnalysisTask) {
        let reply = match self.analyze(&task).await {
            Ok(reply) => reply,
            Err(err) => {
                error!(task = %task.task_id, error = %err, "deferred analysis failed");
                Reply::text_with(
                    ANALYSIS_FAILED_REPLY,
                    vec![report::RETRY_QUICK_REPLY.to_string()],
                )
            }
        };

        if let Err(err) = self.callbacks.deliver(&task.callback_url, &reply).await {
            error!(task = %task.task_id, error = %err, "verdict callback delivery failed");
        }
    }

    async fn analyze(&self, task: &AnalysisTask) -> Result<Reply, AnalysisError> {
        // the transcript, not the live record, is authoritative
        let slots = transcript::derive_slots(&task.history);
        let verdict = verdict::judge(&slots);
        info!(
            task = %task.task_id,
            user = %task.user_key,
            possibility = %verdict.possibility,
            "analysis complete"
        );

        let session = Session {
            state: DialogueState::PostAnalysis,
            history: task.history.clone(),
            slots,
        };
        self.store.put(&task.user_key, &session).await?;

        Ok(report::format_result(&verdict))
    }
}
