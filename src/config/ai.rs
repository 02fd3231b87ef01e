//! Generative-language API configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;

/// Configuration for the question/vision models
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// API key for the generative-language endpoint
    pub api_key: SecretString,

    /// Model used for question and wait-message generation
    #[serde(default = "default_question_model")]
    pub question_model: String,

    /// Model used for image text extraction
    #[serde(default = "default_vision_model")]
    pub vision_model: String,

    /// Model used for structured report parsing
    #[serde(default = "default_report_model")]
    pub report_model: String,

    /// Budget for question generation; the skill channel expects a reply
    /// within 5s, so this stays well under it
    #[serde(default = "default_question_timeout")]
    pub question_timeout_secs: u64,

    /// Budget for the whole image analysis (runs behind a callback)
    #[serde(default = "default_image_timeout")]
    pub image_timeout_secs: u64,
}

impl AiConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.api_key.expose_secret().trim().is_empty() {
            return Err(ValidationError::MissingApiKey);
        }
        if self.question_model.is_empty()
            || self.vision_model.is_empty()
            || self.report_model.is_empty()
        {
            return Err(ValidationError::MissingModel);
        }
        if self.question_timeout_secs == 0 || self.image_timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

fn default_question_model() -> String {
    "gemini-2.5-flash-lite".to_string()
}

fn default_vision_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_report_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_question_timeout() -> u64 {
    4
}

fn default_image_timeout() -> u64 {
    55
}
