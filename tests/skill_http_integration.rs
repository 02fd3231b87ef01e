//! HTTP integration tests for the skill channel and the worker endpoint.
//!
//! Drives the real router with in-memory adapters and scripted mocks,
//! asserting the wire envelopes the messenger platform would see.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use asthma_scout::adapters::http::{routes, AppState};
use asthma_scout::adapters::llm::MockQuestionService;
use asthma_scout::adapters::store::InMemorySessionStore;
use asthma_scout::application::{AllergyFlow, AnalysisWorker, DialogueEngine};
use asthma_scout::domain::screening::{vocabulary, DialogueState, Reply, SlotSet, Turn};
use asthma_scout::ports::{
    AllergyReport, AllergyReportAnalyzer, AnalysisQueue, AnalysisTask, ArchiveError,
    ArchiveRecord, ArchiveSink, CallbackError, CallbackSender, ImageAnalysisError, QueueError,
    SessionStore, UserKey,
};

// =============================================================================
// Test Infrastructure
// =============================================================================

#[derive(Default)]
struct RecordingQueue {
    tasks: Mutex<Vec<AnalysisTask>>,
}

#[async_trait]
impl AnalysisQueue for RecordingQueue {
    async fn enqueue(&self, task: AnalysisTask) -> Result<(), QueueError> {
        self.tasks.lock().unwrap().push(task);
        Ok(())
    }
}

#[derive(Default)]
struct RecordingCallback {
    replies: Mutex<Vec<Reply>>,
}

#[async_trait]
impl CallbackSender for RecordingCallback {
    async fn deliver(&self, _url: &str, reply: &Reply) -> Result<(), CallbackError> {
        self.replies.lock().unwrap().push(reply.clone());
        Ok(())
    }
}

#[derive(Default)]
struct RecordingArchive {
    records: Mutex<Vec<ArchiveRecord>>,
}

#[async_trait]
impl ArchiveSink for RecordingArchive {
    async fn archive(&self, record: ArchiveRecord) -> Result<(), ArchiveError> {
        self.records.lock().unwrap().push(record);
        Ok(())
    }
}

struct StubAnalyzer;

#[async_trait]
impl AllergyReportAnalyzer for StubAnalyzer {
    async fn extract_text(&self, _image_url: &str) -> Result<String, ImageAnalysisError> {
        Ok("검사결과 원문".to_string())
    }

    async fn parse_report(&self, _text: &str) -> Result<AllergyReport, ImageAnalysisError> {
        Ok(AllergyReport::default())
    }
}

struct TestApp {
    app: Router,
    store: Arc<InMemorySessionStore>,
    queue: Arc<RecordingQueue>,
    callbacks: Arc<RecordingCallback>,
}

impl TestApp {
    fn new(questions: MockQuestionService) -> Self {
        let store = Arc::new(InMemorySessionStore::new(Duration::from_secs(600)));
        let queue = Arc::new(RecordingQueue::default());
        let callbacks = Arc::new(RecordingCallback::default());
        let archive = Arc::new(RecordingArchive::default());
        let questions = Arc::new(questions);

        let state = AppState {
            engine: Arc::new(DialogueEngine::new(
                store.clone(),
                questions.clone(),
                queue.clone(),
                archive,
            )),
            worker: Arc::new(AnalysisWorker::new(store.clone(), callbacks.clone())),
            allergy: Arc::new(AllergyFlow::new(
                store.clone(),
                questions,
                Arc::new(StubAnalyzer),
                callbacks.clone(),
            )),
        };

        TestApp {
            app: routes().with_state(state),
            store,
            queue,
            callbacks,
        }
    }

    async fn post(&self, uri: &str, body: Value) -> (StatusCode, Vec<u8>) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes.to_vec())
    }

    async fn post_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        let (status, bytes) = self.post(uri, body).await;
        (status, serde_json::from_slice(&bytes).unwrap())
    }
}

fn simple_text(envelope: &Value) -> &str {
    envelope["template"]["outputs"][0]["simpleText"]["text"]
        .as_str()
        .unwrap()
}

// =============================================================================
// Skill Endpoint
// =============================================================================

#[tokio::test]
async fn health_endpoint_reports_liveness() {
    let test_app = TestApp::new(MockQuestionService::new());
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let response = test_app.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"Asthma screening bot is running!");
}

#[tokio::test]
async fn missing_user_id_is_rejected() {
    let test_app = TestApp::new(MockQuestionService::new());
    let (status, envelope) = test_app
        .post_json("/skill", json!({"utterance": "아이가 기침해요"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(simple_text(&envelope), "잘못된 요청입니다.");
}

#[tokio::test]
async fn blank_utterance_is_rejected() {
    let test_app = TestApp::new(MockQuestionService::new());
    let (status, envelope) = test_app
        .post_json("/skill", json!({"userId": "u-1", "utterance": "   "}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(simple_text(&envelope), "잘못된 요청입니다.");
}

#[tokio::test]
async fn first_utterance_gets_a_question_envelope() {
    let test_app =
        TestApp::new(MockQuestionService::new().with_question("아이가 쌕쌕거리나요?"));
    let (status, envelope) = test_app
        .post_json(
            "/skill",
            json!({"userId": "u-1", "utterance": "아이가 기침해요"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(envelope["version"], "2.0");
    assert_eq!(simple_text(&envelope), "아이가 쌕쌕거리나요?");
    assert!(envelope.get("useCallback").is_none());
}

#[tokio::test]
async fn consenting_to_analysis_returns_the_callback_envelope() {
    let test_app = TestApp::new(
        MockQuestionService::new()
            .with_question("아이가 쌕쌕거리나요?")
            .with_wait_message("잠시만 기다려주세요!"),
    );

    test_app
        .post_json(
            "/skill",
            json!({"userId": "u-1", "utterance": "상담 시작할게요"}),
        )
        .await;
    test_app
        .post_json("/skill", json!({"userId": "u-1", "utterance": "분석해줘"}))
        .await;
    let (status, envelope) = test_app
        .post_json(
            "/skill",
            json!({
                "userId": "u-1",
                "utterance": "네 좋아요",
                "callbackUrl": "http://cb.example/reply"
            }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(envelope["useCallback"], true);
    assert_eq!(envelope["data"]["text"], "잠시만 기다려주세요!");
    assert!(envelope.get("template").is_none());

    let tasks = test_app.queue.tasks.lock().unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].callback_url, "http://cb.example/reply");
}

// =============================================================================
// Allergy Report Upload
// =============================================================================

#[tokio::test]
async fn image_upload_without_callback_url_is_rejected() {
    let test_app = TestApp::new(MockQuestionService::new());
    let (status, envelope) = test_app
        .post_json(
            "/skill",
            json!({
                "userId": "u-1",
                "media": {"url": "http://img.example/report.png", "type": "image"}
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        simple_text(&envelope),
        "오류: 콜백 URL이 없습니다. 다시 시도해주세요."
    );
}

#[tokio::test]
async fn image_upload_is_acknowledged_with_the_wait_envelope() {
    let test_app = TestApp::new(MockQuestionService::new());
    let (status, envelope) = test_app
        .post_json(
            "/skill",
            json!({
                "userId": "u-1",
                "media": {"url": "http://img.example/report.png", "type": "image"},
                "callbackUrl": "http://cb.example/reply"
            }),
        )
        .await;
    // the pipeline itself runs in the background; only the immediate
    // acknowledgement is deterministic here
    assert_eq!(status, StatusCode::OK);
    assert_eq!(envelope["useCallback"], true);
    assert_eq!(envelope["data"]["text"], vocabulary::ALLERGY_WAIT_MESSAGE);
}

// =============================================================================
// Worker Endpoint
// =============================================================================

fn high_risk_task(key: &UserKey) -> AnalysisTask {
    AnalysisTask::new(
        key.clone(),
        vec![
            Turn::agent("아이가 쌕쌕거리는 소리를 내나요?"),
            Turn::user("네 맞아요"),
            Turn::agent("증상이 얼마나 오래 지속되었나요?"),
            Turn::user("네, 3개월 넘게요"),
            Turn::agent("가족 중에 천식 진단을 받은 분이 있나요?"),
            Turn::user("네 아빠가 천식이에요"),
        ],
        SlotSet::new(),
        "http://cb.example/reply",
    )
}

#[tokio::test]
async fn analysis_task_is_processed_and_answered_via_callback() {
    let test_app = TestApp::new(MockQuestionService::new());
    let key = UserKey::new("u-1").unwrap();
    let task = high_risk_task(&key);

    let (status, bytes) = test_app
        .post("/analysis-tasks", serde_json::to_value(&task).unwrap())
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(&bytes[..], b"Analysis task processed.");

    let replies = test_app.callbacks.replies.lock().unwrap();
    assert_eq!(replies.len(), 1);
    match &replies[0] {
        Reply::Card { title, .. } => assert!(title.contains("가능성이 높아")),
        other => panic!("expected verdict card, got {other:?}"),
    }
    drop(replies);

    let session = test_app.store.get(&key).await.unwrap().unwrap();
    assert_eq!(session.state, DialogueState::PostAnalysis);
}

#[tokio::test]
async fn analysis_task_without_history_is_rejected() {
    let test_app = TestApp::new(MockQuestionService::new());
    let key = UserKey::new("u-1").unwrap();
    let task = AnalysisTask::new(key, vec![], SlotSet::new(), "http://cb.example/reply");

    let (status, bytes) = test_app
        .post("/analysis-tasks", serde_json::to_value(&task).unwrap())
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(&bytes[..], b"Bad Request: missing required fields.");
    assert!(test_app.callbacks.replies.lock().unwrap().is_empty());
}
