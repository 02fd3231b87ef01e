//! Application configuration module
//!
//! Type-safe configuration loading from environment variables using the
//! `config` and `dotenvy` crates. Values are read with the
//! `ASTHMA_SCOUT` prefix and `__` as the nesting separator, e.g.
//! `ASTHMA_SCOUT__SERVER__PORT=8080` -> `server.port = 8080`.

mod ai;
mod archive;
mod error;
mod server;
mod session;
mod tasks;

pub use ai::AiConfig;
pub use archive::ArchiveConfig;
pub use error::{ConfigError, ValidationError};
pub use server::ServerConfig;
pub use session::SessionConfig;
pub use tasks::TaskConfig;

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, timeouts)
    #[serde(default)]
    pub server: ServerConfig,

    /// Generative-language API configuration (requires an API key)
    pub ai: AiConfig,

    /// Session store configuration
    #[serde(default)]
    pub session: SessionConfig,

    /// Deferred analysis configuration
    #[serde(default)]
    pub tasks: TaskConfig,

    /// Consultation archive configuration
    #[serde(default)]
    pub archive: ArchiveConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// Loads a `.env` file if present (development), then reads
    /// `ASTHMA_SCOUT`-prefixed environment variables with `__` as the
    /// nesting separator.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or
    /// values cannot be parsed into the expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("ASTHMA_SCOUT")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.ai.validate()?;
        self.session.validate()?;
        self.tasks.validate()?;
        self.archive.validate()?;
        Ok(())
    }
}
