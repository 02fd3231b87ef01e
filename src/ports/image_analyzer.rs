//! Allergy Report Analyzer Port - Interface for reading test-result images.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured contents of an allergy test report.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AllergyReport {
    #[serde(default)]
    pub test_type: Option<String>,
    #[serde(default)]
    pub total_ige: Option<String>,
    #[serde(default)]
    pub airborne_allergens: Vec<String>,
    #[serde(default)]
    pub food_allergens: Vec<String>,
    #[serde(default)]
    pub asthma_high_risk: Vec<String>,
    #[serde(default)]
    pub asthma_medium_risk: Vec<String>,
    #[serde(default)]
    pub total_positive: u32,
    #[serde(default)]
    pub asthma_related: u32,
    #[serde(default)]
    pub risk_level: Option<String>,
}

/// Errors that can occur during image analysis
#[derive(Debug, Error)]
pub enum ImageAnalysisError {
    #[error("image analysis timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("unsupported media type: {mime}")]
    UnsupportedMedia { mime: String },

    #[error("image too large: {bytes} bytes")]
    TooLarge { bytes: usize },

    #[error("image fetch or analysis request failed: {0}")]
    Http(String),

    #[error("could not parse analyzer output: {0}")]
    Parse(String),
}

impl ImageAnalysisError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, ImageAnalysisError::Timeout { .. })
    }
}

/// Port for the two-step allergy report reader: OCR-style text
/// extraction, then structured parsing of the extracted text.
#[async_trait]
pub trait AllergyReportAnalyzer: Send + Sync {
    /// Pulls the raw text out of a report image at the given URL.
    async fn extract_text(&self, image_url: &str) -> Result<String, ImageAnalysisError>;

    /// Parses extracted report text into structured fields.
    async fn parse_report(&self, text: &str) -> Result<AllergyReport, ImageAnalysisError>;
}
