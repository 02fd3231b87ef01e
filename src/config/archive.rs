//! Consultation archive configuration

use std::path::PathBuf;

use serde::Deserialize;

use super::error::ValidationError;

/// Archive sink configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ArchiveConfig {
    /// JSON-lines file the archive appends to
    #[serde(default = "default_path")]
    pub path: PathBuf,
}

impl ArchiveConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.path.as_os_str().is_empty() {
            return Err(ValidationError::MissingArchivePath);
        }
        Ok(())
    }
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
        }
    }
}

fn default_path() -> PathBuf {
    PathBuf::from("archive/consultations.jsonl")
}
