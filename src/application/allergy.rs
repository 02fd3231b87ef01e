//! Allergy report pipeline.
//!
//! Runs in the background after the HTTP layer acknowledges an image
//! upload: extract text, parse it into structured fields, merge them
//! into the session's slot record, and ask the next question through
//! the callback channel.

use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info, warn};

use crate::domain::foundation::InvalidTransition;
use crate::domain::screening::{
    vocabulary, DialogueState, Reply, Session, SlotField, SlotValue,
};
use crate::ports::{
    AllergyReport, AllergyReportAnalyzer, CallbackSender, ImageAnalysisError, QuestionService,
    SessionStore, StoreError, UserKey,
};

const ANALYSIS_TIMEOUT_REPLY: &str = "분석 시간이 초과되었습니다. 다시 시도해주세요.";
const ANALYSIS_ERROR_REPLY: &str =
    "알레르기 검사결과지 분석 중 오류가 발생했어요. 다시 시도해주세요.";
const UPLOAD_TURN: &str = "[알레르기 검사결과지 업로드]";

#[derive(Debug, Error)]
enum AllergyError {
    #[error(transparent)]
    Image(#[from] ImageAnalysisError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Transition(#[from] InvalidTransition),
}

/// Background handler for allergy-report uploads.
pub struct AllergyFlow {
    store: Arc<dyn SessionStore>,
    questions: Arc<dyn QuestionService>,
    analyzer: Arc<dyn AllergyReportAnalyzer>,
    callbacks: Arc<dyn CallbackSender>,
}

impl AllergyFlow {
    pub fn new(
        store: Arc<dyn SessionStore>,
        questions: Arc<dyn QuestionService>,
        analyzer: Arc<dyn AllergyReportAnalyzer>,
        callbacks: Arc<dyn CallbackSender>,
    ) -> Self {
        AllergyFlow {
            store,
            questions,
            analyzer,
            callbacks,
        }
    }

    /// Interim acknowledgement returned synchronously on upload.
    pub fn wait_reply() -> Reply {
        Reply::wait(vocabulary::ALLERGY_WAIT_MESSAGE)
    }

    /// Runs the pipeline and delivers the outcome via callback.
    /// Errors become user-facing apologies; timeouts get their own text.
    pub async fn process(&self, key: UserKey, image_url: String, callback_url: String) {
        let reply = match self.run(&key, &image_url).await {
            Ok(reply) => reply,
            Err(err) => {
                error!(user = %key, error = %err, "allergy report analysis failed");
                let text = match &err {
                    AllergyError::Image(e) if e.is_timeout() => ANALYSIS_TIMEOUT_REPLY,
                    _ => ANALYSIS_ERROR_REPLY,
                };
                Reply::text(text)
            }
        };

        if let Err(err) = self.callbacks.deliver(&callback_url, &reply).await {
            error!(user = %key, error = %err, "allergy callback delivery failed");
        }
    }

    async fn run(&self, key: &UserKey, image_url: &str) -> Result<Reply, AllergyError> {
        let text = self.analyzer.extract_text(image_url).await?;
        let report = self.analyzer.parse_report(&text).await?;
        info!(
            user = %key,
            airborne = report.airborne_allergens.len(),
            food = report.food_allergens.len(),
            "allergy report parsed"
        );

        let mut session = self.store.get(key).await?.unwrap_or_default();
        if session.state == DialogueState::Init {
            session.set_state(DialogueState::Collecting)?;
        }
        apply_report(&mut session, &report);

        session.push_user(UPLOAD_TURN);
        session.push_agent(summarize(&report));

        let question =
            super::dialogue::next_question_or_fallback(self.questions.as_ref(), &session).await;
        session.slots.set_last_question(&question);
        session.push_agent(&question);
        self.store.put(key, &session).await?;

        Ok(Reply::text(format!("{}\n\n{}", summarize(&report), question)))
    }
}

/// Merges parsed report fields into the slot record.
fn apply_report(session: &mut Session, report: &AllergyReport) {
    if !report.airborne_allergens.is_empty() {
        session.slots.set(SlotField::AirborneAllergen, SlotValue::Yes);
        session.slots.set(
            SlotField::AirborneAllergenDetail,
            SlotValue::text(report.airborne_allergens.join(", ")),
        );
    }
    if !report.food_allergens.is_empty() {
        session.slots.set(SlotField::FoodAllergen, SlotValue::Yes);
        session.slots.set(
            SlotField::FoodAllergenDetail,
            SlotValue::text(report.food_allergens.join(", ")),
        );
    }
    if let Some(ige) = &report.total_ige {
        session.slots.set(SlotField::TotalIge, SlotValue::text(ige));
    }
    match serde_json::to_string(report) {
        Ok(raw) => session
            .slots
            .set(SlotField::AllergyReport, SlotValue::text(raw)),
        Err(err) => warn!(error = %err, "could not serialize allergy report"),
    }
}

/// Builds the Korean summary line shown after a successful parse.
fn summarize(report: &AllergyReport) -> String {
    let mut lines = vec!["📊 알레르기 검사결과를 확인했어요.".to_string()];
    if let Some(kind) = &report.test_type {
        lines.push(format!("• 검사 종류: {kind}"));
    }
    if !report.airborne_allergens.is_empty() {
        lines.push(format!(
            "• 공중 항원 양성: {}",
            report.airborne_allergens.join(", ")
        ));
    }
    if !report.food_allergens.is_empty() {
        lines.push(format!(
            "• 식품 항원 양성: {}",
            report.food_allergens.join(", ")
        ));
    }
    if let Some(ige) = &report.total_ige {
        lines.push(format!("• 총 IgE: {ige}"));
    }
    if !report.asthma_high_risk.is_empty() {
        lines.push(format!(
            "• 천식 고위험 항원: {}",
            report.asthma_high_risk.join(", ")
        ));
    }
    if report.airborne_allergens.is_empty() && report.food_allergens.is_empty() {
        lines.push("• 양성 항원은 확인되지 않았어요.".to_string());
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::adapters::llm::mock::MockQuestionService;
    use crate::adapters::store::in_memory::InMemorySessionStore;
    use crate::ports::CallbackError;

    struct ScriptedAnalyzer {
        result: Result<AllergyReport, fn() -> ImageAnalysisError>,
    }

    #[async_trait]
    impl AllergyReportAnalyzer for ScriptedAnalyzer {
        async fn extract_text(&self, _image_url: &str) -> Result<String, ImageAnalysisError> {
            match &self.result {
                Ok(_) => Ok("검사결과 원문".to_string()),
                Err(make) => Err(make()),
            }
        }

        async fn parse_report(&self, _text: &str) -> Result<AllergyReport, ImageAnalysisError> {
            match &self.result {
                Ok(report) => Ok(report.clone()),
                Err(make) => Err(make()),
            }
        }
    }

    #[derive(Default)]
    struct RecordingCallback {
        deliveries: Mutex<Vec<Reply>>,
    }

    #[async_trait]
    impl CallbackSender for RecordingCallback {
        async fn deliver(&self, _url: &str, reply: &Reply) -> Result<(), CallbackError> {
            self.deliveries.lock().unwrap().push(reply.clone());
            Ok(())
        }
    }

    fn sample_report() -> AllergyReport {
        AllergyReport {
            test_type: Some("MAST".to_string()),
            total_ige: Some("250 IU/mL".to_string()),
            airborne_allergens: vec!["집먼지 진드기".to_string(), "꽃가루".to_string()],
            food_allergens: vec!["계란 흰자".to_string()],
            ..Default::default()
        }
    }

    fn flow(
        analyzer: ScriptedAnalyzer,
        questions: MockQuestionService,
    ) -> (AllergyFlow, Arc<InMemorySessionStore>, Arc<RecordingCallback>) {
        let store = Arc::new(InMemorySessionStore::new(Duration::from_secs(600)));
        let callbacks = Arc::new(RecordingCallback::default());
        let flow = AllergyFlow::new(
            store.clone(),
            Arc::new(questions),
            Arc::new(analyzer),
            callbacks.clone(),
        );
        (flow, store, callbacks)
    }

    fn key() -> UserKey {
        UserKey::new("user-1").unwrap()
    }

    #[tokio::test]
    async fn successful_parse_fills_allergen_slots() {
        let (flow, store, callbacks) = flow(
            ScriptedAnalyzer {
                result: Ok(sample_report()),
            },
            MockQuestionService::new().with_question("증상이 얼마나 지속되었나요?"),
        );
        flow.process(key(), "http://img.example/r.png".into(), "http://cb".into())
            .await;

        let session = store.get(&key()).await.unwrap().unwrap();
        assert_eq!(session.state, DialogueState::Collecting);
        assert!(session.slots.get(SlotField::AirborneAllergen).is_yes());
        assert!(session.slots.get(SlotField::FoodAllergen).is_yes());
        assert!(session
            .slots
            .get(SlotField::AirborneAllergenDetail)
            .mentions("집먼지 진드기"));
        assert_eq!(
            session.slots.last_question(),
            "증상이 얼마나 지속되었나요?"
        );

        let deliveries = callbacks.deliveries.lock().unwrap();
        match &deliveries[0] {
            Reply::Text { text, .. } => {
                assert!(text.contains("집먼지 진드기"));
                assert!(text.contains("증상이 얼마나 지속되었나요?"));
            }
            other => panic!("expected text reply, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn timeout_gets_the_timeout_apology() {
        let (flow, store, callbacks) = flow(
            ScriptedAnalyzer {
                result: Err(|| ImageAnalysisError::Timeout { timeout_secs: 55 }),
            },
            MockQuestionService::new(),
        );
        flow.process(key(), "http://img".into(), "http://cb".into())
            .await;

        assert!(store.get(&key()).await.unwrap().is_none());
        let deliveries = callbacks.deliveries.lock().unwrap();
        assert_eq!(deliveries[0], Reply::text(ANALYSIS_TIMEOUT_REPLY));
    }

    #[tokio::test]
    async fn parse_failure_gets_the_generic_apology() {
        let (flow, _store, callbacks) = flow(
            ScriptedAnalyzer {
                result: Err(|| ImageAnalysisError::Parse("not a report".into())),
            },
            MockQuestionService::new(),
        );
        flow.process(key(), "http://img".into(), "http://cb".into())
            .await;

        let deliveries = callbacks.deliveries.lock().unwrap();
        assert_eq!(deliveries[0], Reply::text(ANALYSIS_ERROR_REPLY));
    }

    #[tokio::test]
    async fn existing_session_keeps_its_state_and_history() {
        let (flow, store, _callbacks) = flow(
            ScriptedAnalyzer {
                result: Ok(sample_report()),
            },
            MockQuestionService::new().with_question("다음 질문입니다"),
        );
        let mut session = Session::new();
        session.set_state(DialogueState::Collecting).unwrap();
        session.push_agent("이전 질문");
        session.push_user("이전 답변");
        store.put(&key(), &session).await.unwrap();

        flow.process(key(), "http://img".into(), "http://cb".into())
            .await;

        let session = store.get(&key()).await.unwrap().unwrap();
        assert_eq!(session.state, DialogueState::Collecting);
        assert_eq!(session.history[0].text, "이전 질문");
        assert_eq!(session.history.last().unwrap().text, "다음 질문입니다");
    }

    #[test]
    fn summary_mentions_every_positive_group() {
        let summary = summarize(&sample_report());
        assert!(summary.contains("MAST"));
        assert!(summary.contains("집먼지 진드기"));
        assert!(summary.contains("계란 흰자"));
        assert!(summary.contains("250 IU/mL"));
    }

    #[test]
    fn empty_report_summary_says_nothing_found() {
        let summary = summarize(&AllergyReport::default());
        assert!(summary.contains("양성 항원은 확인되지 않았어요"));
    }
}
