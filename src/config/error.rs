//! Configuration errors

use thiserror::Error;

/// Error loading configuration from the environment
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

/// Semantic validation failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("server port must not be 0")]
    InvalidPort,

    #[error("request timeout must be between 1 and 300 seconds")]
    InvalidTimeout,

    #[error("AI API key must not be empty")]
    MissingApiKey,

    #[error("AI model name must not be empty")]
    MissingModel,

    #[error("session idle timeout must be at least 1 second")]
    InvalidIdleTimeout,

    #[error("analysis worker URL must not be empty")]
    MissingWorkerUrl,

    #[error("archive path must not be empty")]
    MissingArchivePath,
}
