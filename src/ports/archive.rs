//! Archive Sink Port - Interface for long-term storage of closed sessions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::screening::{SlotSet, Turn, Verdict};

use super::session_store::UserKey;

/// Snapshot of a closed consultation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveRecord {
    pub user_key: UserKey,
    pub history: Vec<Turn>,
    pub slots: SlotSet,
    pub verdict: Verdict,
    pub closed_at: DateTime<Utc>,
}

/// Errors that can occur while archiving
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("archive write failed: {0}")]
    Write(String),
}

/// Port for the append-only consultation archive.
#[async_trait]
pub trait ArchiveSink: Send + Sync {
    async fn archive(&self, record: ArchiveRecord) -> Result<(), ArchiveError>;
}
