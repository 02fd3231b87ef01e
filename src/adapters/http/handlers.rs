//! HTTP handlers for the skill channel and the analysis worker endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tracing::{error, info};

use crate::application::{AllergyFlow, AnalysisWorker, DialogueEngine};
use crate::ports::{AnalysisTask, UserKey};

use super::dto::{ReplyEnvelope, SkillRequest};

const INVALID_REQUEST_REPLY: &str = "잘못된 요청입니다.";
const MISSING_CALLBACK_REPLY: &str = "오류: 콜백 URL이 없습니다. 다시 시도해주세요.";
const INTERNAL_ERROR_REPLY: &str = "시스템에 오류가 발생했어요. 잠시 후 다시 시도해주세요.";

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<DialogueEngine>,
    pub worker: Arc<AnalysisWorker>,
    pub allergy: Arc<AllergyFlow>,
}

/// Liveness probe.
pub async fn health() -> &'static str {
    "Asthma screening bot is running!"
}

/// Main skill endpoint: routes image uploads to the allergy pipeline
/// and everything else to the dialogue engine.
pub async fn handle_skill(
    State(state): State<AppState>,
    Json(request): Json<SkillRequest>,
) -> (StatusCode, Json<ReplyEnvelope>) {
    let Some(user_id) = request.user_id.as_deref().map(str::trim).filter(|s| !s.is_empty())
    else {
        return bad_request(INVALID_REQUEST_REPLY);
    };
    let Ok(key) = UserKey::new(user_id) else {
        return bad_request(INVALID_REQUEST_REPLY);
    };

    if let Some(media) = request.media.as_ref().filter(|m| m.media_type == "image") {
        let Some(callback_url) = request.callback_url.clone() else {
            return bad_request(MISSING_CALLBACK_REPLY);
        };
        info!(user = %key, "allergy report upload received");
        let flow = state.allergy.clone();
        let image_url = media.url.clone();
        let user = key.clone();
        tokio::spawn(async move {
            flow.process(user, image_url, callback_url).await;
        });
        return (
            StatusCode::OK,
            Json(ReplyEnvelope::from(&AllergyFlow::wait_reply())),
        );
    }

    let Some(utterance) = request
        .utterance
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
    else {
        return bad_request(INVALID_REQUEST_REPLY);
    };

    match state
        .engine
        .handle_utterance(&key, utterance, request.callback_url.as_deref())
        .await
    {
        Ok(reply) => (StatusCode::OK, Json(ReplyEnvelope::from(&reply))),
        Err(err) => {
            error!(user = %key, error = %err, "utterance handling failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ReplyEnvelope::simple_text(INTERNAL_ERROR_REPLY)),
            )
        }
    }
}

/// Worker endpoint consuming queued analysis tasks.
///
/// Delivery is at-least-once; the worker itself is duplicate-safe, so
/// the handler accepts any well-formed task.
pub async fn handle_analysis_task(
    State(state): State<AppState>,
    Json(task): Json<AnalysisTask>,
) -> (StatusCode, &'static str) {
    if task.history.is_empty() || task.callback_url.trim().is_empty() {
        return (StatusCode::BAD_REQUEST, "Bad Request: missing required fields.");
    }
    info!(task = %task.task_id, user = %task.user_key, "analysis task accepted");
    state.worker.process(task).await;
    (StatusCode::OK, "Analysis task processed.")
}

fn bad_request(text: &str) -> (StatusCode, Json<ReplyEnvelope>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ReplyEnvelope::simple_text(text)),
    )
}
