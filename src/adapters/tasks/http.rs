//! HTTP analysis queue.
//!
//! Hands tasks to the worker by POSTing them to its endpoint (normally
//! this service's own `/analysis-tasks` route). The POST runs in a
//! spawned task so the enqueue is fire-and-forget: the triggering
//! request never waits for the analysis.

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, error};

use crate::ports::{AnalysisQueue, AnalysisTask, QueueError};

pub struct HttpAnalysisQueue {
    client: Client,
    worker_url: String,
}

impl HttpAnalysisQueue {
    pub fn new(client: Client, worker_url: impl Into<String>) -> Self {
        HttpAnalysisQueue {
            client,
            worker_url: worker_url.into(),
        }
    }
}

#[async_trait]
impl AnalysisQueue for HttpAnalysisQueue {
    async fn enqueue(&self, task: AnalysisTask) -> Result<(), QueueError> {
        let client = self.client.clone();
        let worker_url = self.worker_url.clone();
        let task_id = task.task_id;
        debug!(task = %task_id, url = %worker_url, "dispatching analysis task");

        tokio::spawn(async move {
            let result = client.post(&worker_url).json(&task).send().await;
            match result {
                Ok(response) if !response.status().is_success() => {
                    error!(task = %task_id, status = %response.status(), "worker rejected analysis task");
                }
                Err(err) => {
                    error!(task = %task_id, error = %err, "failed to dispatch analysis task");
                }
                Ok(_) => {}
            }
        });

        Ok(())
    }
}
