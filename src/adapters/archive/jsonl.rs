//! JSON-lines consultation archive.
//!
//! Appends one JSON record per closed session. The parent directory is
//! created on first write.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::ports::{ArchiveError, ArchiveRecord, ArchiveSink};

pub struct JsonlArchiveSink {
    path: PathBuf,
}

impl JsonlArchiveSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonlArchiveSink { path: path.into() }
    }
}

#[async_trait]
impl ArchiveSink for JsonlArchiveSink {
    async fn archive(&self, record: ArchiveRecord) -> Result<(), ArchiveError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| ArchiveError::Write(e.to_string()))?;
            }
        }

        let mut line =
            serde_json::to_string(&record).map_err(|e| ArchiveError::Write(e.to_string()))?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| ArchiveError::Write(e.to_string()))?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| ArchiveError::Write(e.to_string()))?;
        debug!(path = %self.path.display(), user = %record.user_key, "session archived");
        Ok(())
    }
}
