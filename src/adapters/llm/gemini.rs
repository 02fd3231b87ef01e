//! Gemini Client - generative-language API adapter.
//!
//! Implements both the question generator and the allergy-report
//! analyzer against the `generateContent` REST endpoint. Each call
//! carries its own timeout: question generation must fit inside the
//! skill channel's reply window, while image analysis runs behind a
//! callback and can take most of a minute.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::AiConfig;
use crate::domain::screening::stage::StageContext;
use crate::domain::screening::{Speaker, Turn};
use crate::ports::{
    AllergyReport, AllergyReportAnalyzer, ImageAnalysisError, QuestionError, QuestionService,
};

use super::unwrap::{parse_fenced_json, unwrap_model_text};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Images larger than this are rejected before upload.
const MAX_IMAGE_BYTES: usize = 15 * 1024 * 1024;

const SUPPORTED_IMAGE_MIMES: &[&str] = &["image/jpeg", "image/png", "image/webp"];

const QUESTION_SYSTEM_PROMPT: &str = "\
당신은 소아 천식 스크리닝 상담 챗봇입니다. 보호자에게 공감하는 따뜻한 말투로, \
묻지 않은 항목 중 지시된 단계의 증상 하나만을 확인하는 질문을 정확히 한 문장 생성하세요. \
이미 확인된 항목은 절대 다시 묻지 마세요. 의학적 진단이나 조언은 하지 마세요.";

const WAIT_SYSTEM_PROMPT: &str = "\
당신은 소아 천식 스크리닝 상담 챗봇입니다. 지금까지의 대화를 바탕으로, 분석을 시작한다는 \
짧고 다정한 안내 문장을 JSON 형식 {\"wait_text\": \"...\"} 으로 생성하세요. 한 문장이어야 합니다.";

const EXTRACT_TEXT_PROMPT: &str = "\
이 이미지는 알레르기 검사결과지입니다. 이미지에 보이는 모든 텍스트를 순서대로 추출해 주세요. \
표가 있다면 행 단위로 읽어 주세요. 설명 없이 추출된 텍스트만 출력하세요.";

const PARSE_REPORT_PROMPT: &str = "\
다음은 알레르기 검사결과지에서 추출한 텍스트입니다. 아래 JSON 스키마로 정리해 주세요. \
값을 알 수 없는 필드는 생략합니다. JSON만 출력하세요.\n\
{\"test_type\": string, \"total_ige\": string, \"airborne_allergens\": [string], \
\"food_allergens\": [string], \"asthma_high_risk\": [string], \"asthma_medium_risk\": [string], \
\"total_positive\": number, \"asthma_related\": number, \"risk_level\": string}";

/// Configuration for the Gemini client.
#[derive(Clone)]
pub struct GeminiConfig {
    api_key: SecretString,
    pub question_model: String,
    pub vision_model: String,
    pub report_model: String,
    pub base_url: String,
    pub question_timeout: Duration,
    pub image_timeout: Duration,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key.into()),
            question_model: "gemini-2.5-flash-lite".to_string(),
            vision_model: "gemini-2.0-flash".to_string(),
            report_model: "gemini-2.5-flash".to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            question_timeout: Duration::from_secs(4),
            image_timeout: Duration::from_secs(55),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

impl From<&AiConfig> for GeminiConfig {
    fn from(config: &AiConfig) -> Self {
        Self {
            api_key: config.api_key.clone(),
            question_model: config.question_model.clone(),
            vision_model: config.vision_model.clone(),
            report_model: config.report_model.clone(),
            base_url: DEFAULT_BASE_URL.to_string(),
            question_timeout: Duration::from_secs(config.question_timeout_secs),
            image_timeout: Duration::from_secs(config.image_timeout_secs),
        }
    }
}

/// Gemini API client implementing the question and image ports.
pub struct GeminiClient {
    config: GeminiConfig,
    client: Client,
}

/// Internal failure shape, mapped per port at the trait boundary.
enum ApiCallError {
    Timeout(u64),
    Http(String),
    Parse(String),
}

impl GeminiClient {
    pub fn new(config: GeminiConfig, client: Client) -> Self {
        Self { config, client }
    }

    fn generate_url(&self, model: &str) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.config.base_url,
            model,
            self.config.api_key()
        )
    }

    async fn generate(
        &self,
        model: &str,
        parts: Vec<Part>,
        json_output: bool,
        timeout: Duration,
    ) -> Result<String, ApiCallError> {
        let request = GenerateRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts,
            }],
            generation_config: GenerationConfig {
                temperature: 0.7,
                max_output_tokens: 1024,
                response_mime_type: json_output.then(|| "application/json".to_string()),
            },
        };

        let send = self.client.post(self.generate_url(model)).json(&request).send();
        let response = tokio::time::timeout(timeout, send)
            .await
            .map_err(|_| ApiCallError::Timeout(timeout.as_secs()))?
            .map_err(|e| ApiCallError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiCallError::Http(format!(
                "generateContent returned {status}"
            )));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ApiCallError::Parse(e.to_string()))?;
        body.first_text()
            .ok_or_else(|| ApiCallError::Parse("response carried no candidate text".to_string()))
    }

    async fn fetch_image(&self, image_url: &str) -> Result<(String, Vec<u8>), ImageAnalysisError> {
        let response = self
            .client
            .get(image_url)
            .send()
            .await
            .map_err(|e| ImageAnalysisError::Http(e.to_string()))?;
        if !response.status().is_success() {
            return Err(ImageAnalysisError::Http(format!(
                "image fetch returned {}",
                response.status()
            )));
        }

        let mime = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or(v).trim().to_string())
            .unwrap_or_else(|| guess_mime_from_url(image_url));
        if !SUPPORTED_IMAGE_MIMES.contains(&mime.as_str()) {
            return Err(ImageAnalysisError::UnsupportedMedia { mime });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ImageAnalysisError::Http(e.to_string()))?;
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(ImageAnalysisError::TooLarge { bytes: bytes.len() });
        }
        Ok((mime, bytes.to_vec()))
    }
}

fn guess_mime_from_url(url: &str) -> String {
    let path = url.split('?').next().unwrap_or(url).to_lowercase();
    if path.ends_with(".png") {
        "image/png".to_string()
    } else if path.ends_with(".webp") {
        "image/webp".to_string()
    } else {
        "image/jpeg".to_string()
    }
}

/// Renders the staged instruction block for question generation.
fn build_question_prompt(recent_history: &[Turn], context: &StageContext) -> String {
    let transcript: Vec<String> = recent_history.iter().map(|t| t.to_string()).collect();
    let collected: Vec<String> = context
        .collected
        .iter()
        .map(|(label, value)| format!("- {label}: {value}"))
        .collect();
    let unasked: Vec<&str> = context
        .progress
        .unasked(context.target)
        .iter()
        .map(|f| f.label())
        .collect();

    format!(
        "{QUESTION_SYSTEM_PROMPT}\n\n\
         [최근 대화]\n{}\n\n\
         [이미 확인된 정보 - 다시 묻지 마세요]\n{}\n\n\
         [현재 단계 지시]\n{}\n\
         아직 확인되지 않은 항목: {}\n\n\
         다음 질문 한 문장:",
        if transcript.is_empty() {
            "(대화 시작)".to_string()
        } else {
            transcript.join("\n")
        },
        if collected.is_empty() {
            "(없음)".to_string()
        } else {
            collected.join("\n")
        },
        context.target.instruction(),
        if unasked.is_empty() {
            "(없음)".to_string()
        } else {
            unasked.join(", ")
        },
    )
}

#[async_trait]
impl QuestionService for GeminiClient {
    async fn next_question(
        &self,
        recent_history: &[Turn],
        context: &StageContext,
    ) -> Result<String, QuestionError> {
        let prompt = build_question_prompt(recent_history, context);
        debug!(target_stage = ?context.target, "generating next question");
        let raw = self
            .generate(
                &self.config.question_model,
                vec![Part::text(prompt)],
                false,
                self.config.question_timeout,
            )
            .await
            .map_err(|e| e.into_question_error(self.config.question_timeout))?;
        Ok(unwrap_model_text(&raw))
    }

    async fn wait_message(&self, history: &[Turn]) -> Result<String, QuestionError> {
        let user_lines: Vec<String> = history
            .iter()
            .filter(|t| t.speaker == Speaker::User)
            .map(|t| t.text.clone())
            .collect();
        let prompt = format!(
            "{WAIT_SYSTEM_PROMPT}\n\n[보호자가 말한 내용]\n{}",
            user_lines.join("\n")
        );
        let raw = self
            .generate(
                &self.config.question_model,
                vec![Part::text(prompt)],
                true,
                self.config.question_timeout,
            )
            .await
            .map_err(|e| e.into_question_error(self.config.question_timeout))?;
        Ok(unwrap_model_text(&raw))
    }
}

#[async_trait]
impl AllergyReportAnalyzer for GeminiClient {
    async fn extract_text(&self, image_url: &str) -> Result<String, ImageAnalysisError> {
        let (mime, bytes) = self.fetch_image(image_url).await?;
        debug!(mime, size = bytes.len(), "extracting text from report image");
        let parts = vec![
            Part::text(EXTRACT_TEXT_PROMPT.to_string()),
            Part::inline_image(mime, BASE64.encode(&bytes)),
        ];
        let raw = self
            .generate(
                &self.config.vision_model,
                parts,
                false,
                self.config.image_timeout,
            )
            .await
            .map_err(|e| e.into_image_error(self.config.image_timeout))?;
        Ok(unwrap_model_text(&raw))
    }

    async fn parse_report(&self, text: &str) -> Result<AllergyReport, ImageAnalysisError> {
        let prompt = format!("{PARSE_REPORT_PROMPT}\n\n[추출된 텍스트]\n{text}");
        let raw = self
            .generate(
                &self.config.report_model,
                vec![Part::text(prompt)],
                true,
                self.config.image_timeout,
            )
            .await
            .map_err(|e| e.into_image_error(self.config.image_timeout))?;
        let value =
            parse_fenced_json(&raw).map_err(|e| ImageAnalysisError::Parse(e.to_string()))?;
        serde_json::from_value(value).map_err(|e| ImageAnalysisError::Parse(e.to_string()))
    }
}

impl ApiCallError {
    fn into_question_error(self, timeout: Duration) -> QuestionError {
        match self {
            ApiCallError::Timeout(_) => QuestionError::Timeout {
                timeout_secs: timeout.as_secs(),
            },
            ApiCallError::Http(message) => QuestionError::Http(message),
            ApiCallError::Parse(message) => QuestionError::Parse(message),
        }
    }

    fn into_image_error(self, timeout: Duration) -> ImageAnalysisError {
        match self {
            ApiCallError::Timeout(_) => ImageAnalysisError::Timeout {
                timeout_secs: timeout.as_secs(),
            },
            ApiCallError::Http(message) => ImageAnalysisError::Http(message),
            ApiCallError::Parse(message) => ImageAnalysisError::Parse(message),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(rename = "inlineData", skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

impl Part {
    fn text(text: String) -> Self {
        Part {
            text: Some(text),
            inline_data: None,
        }
    }

    fn inline_image(mime_type: String, data: String) -> Self {
        Part {
            text: None,
            inline_data: Some(InlineData { mime_type, data }),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

impl GenerateResponse {
    fn first_text(&self) -> Option<String> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .iter()
            .find_map(|p| p.text.clone())
    }
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}
