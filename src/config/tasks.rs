//! Analysis task queue configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Deferred analysis configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TaskConfig {
    /// URL the queue POSTs analysis tasks to (normally this service's
    /// own /analysis-tasks endpoint)
    #[serde(default = "default_worker_url")]
    pub worker_url: String,
}

impl TaskConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.worker_url.trim().is_empty() {
            return Err(ValidationError::MissingWorkerUrl);
        }
        Ok(())
    }
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            worker_url: default_worker_url(),
        }
    }
}

fn default_worker_url() -> String {
    "http://127.0.0.1:8080/analysis-tasks".to_string()
}
