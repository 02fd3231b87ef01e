//! Session store configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Session lifecycle configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Inactivity window after which a session expires
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

impl SessionConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.idle_timeout_secs == 0 {
            return Err(ValidationError::InvalidIdleTimeout);
        }
        Ok(())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: default_idle_timeout(),
        }
    }
}

fn default_idle_timeout() -> u64 {
    600
}
