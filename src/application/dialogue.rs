//! Dialogue engine: the synchronous half of the screening conversation.
//!
//! Routes each utterance by session state, runs the slot extractor and
//! question policy, and hands off to the deferred analysis worker when
//! the user consents. All collaborator access goes through ports.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::domain::foundation::InvalidTransition;
use crate::domain::screening::stage::{self, QuestionPlan};
use crate::domain::screening::{
    extractor, verdict, vocabulary, DialogueState, Reply, Session,
};
use crate::ports::{
    AnalysisQueue, AnalysisTask, ArchiveRecord, ArchiveSink, QueueError, QuestionService,
    SessionStore, StoreError, UserKey,
};

const MISSING_CALLBACK_REPLY: &str = "오류: 콜백 URL이 없습니다. 다시 시도해주세요.";
const ANALYZE_NOW_REPLY: &str =
    "알겠습니다. 그럼 지금까지 말씀해주신 내용을 바탕으로 분석을 진행해볼까요?";
const DECLINED_ANALYSIS_REPLY: &str = "알겠습니다. 더 말씀하고 싶은 증상이 있으신가요?";
const FAREWELL_REPLY: &str = "상담이 종료되었습니다. 이용해주셔서 감사합니다!";

/// Errors the engine cannot absorb into a fallback reply.
#[derive(Debug, Error)]
pub enum DialogueError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Queue(#[from] QueueError),

    #[error(transparent)]
    Archive(#[from] crate::ports::ArchiveError),

    #[error(transparent)]
    Transition(#[from] InvalidTransition),
}

/// Runs one screening conversation per user key.
pub struct DialogueEngine {
    store: Arc<dyn SessionStore>,
    questions: Arc<dyn QuestionService>,
    queue: Arc<dyn AnalysisQueue>,
    archive: Arc<dyn ArchiveSink>,
}

impl DialogueEngine {
    pub fn new(
        store: Arc<dyn SessionStore>,
        questions: Arc<dyn QuestionService>,
        queue: Arc<dyn AnalysisQueue>,
        archive: Arc<dyn ArchiveSink>,
    ) -> Self {
        DialogueEngine {
            store,
            questions,
            queue,
            archive,
        }
    }

    /// Handles one user utterance and returns the immediate reply.
    ///
    /// Reset and close phrases are honored in every state; everything
    /// else routes to the current state's handler.
    pub async fn handle_utterance(
        &self,
        key: &UserKey,
        utterance: &str,
        callback_url: Option<&str>,
    ) -> Result<Reply, DialogueError> {
        if vocabulary::contains_any(utterance, vocabulary::END_PHRASES) {
            return self.close_session(key).await;
        }
        if vocabulary::contains_any(utterance, vocabulary::TERMINATION_PHRASES) {
            info!(user = %key, "session reset requested");
            self.store.delete(key).await?;
            return self.handle_init(key, utterance).await;
        }

        match self.store.get(key).await? {
            None => self.handle_init(key, utterance).await,
            Some(mut session) => match session.state {
                DialogueState::Init => self.handle_init(key, utterance).await,
                DialogueState::Collecting => {
                    self.handle_collecting(key, &mut session, utterance, callback_url)
                        .await
                }
                DialogueState::ConfirmAnalysis => {
                    self.handle_confirm_analysis(key, &mut session, utterance, callback_url)
                        .await
                }
                DialogueState::PostAnalysis => {
                    self.handle_post_analysis(key, &mut session, utterance, callback_url)
                        .await
                }
            },
        }
    }

    async fn handle_init(&self, key: &UserKey, utterance: &str) -> Result<Reply, DialogueError> {
        let mut session = Session::new();
        let expanded = vocabulary::expand_shorthand(utterance);
        session.push_user(&expanded);

        let question = self.next_question_or_fallback(&session).await;
        session.slots.set_last_question(&question);
        session.push_agent(&question);
        session.set_state(DialogueState::Collecting)?;

        self.store.put(key, &session).await?;
        Ok(Reply::text(question))
    }

    async fn handle_collecting(
        &self,
        key: &UserKey,
        session: &mut Session,
        utterance: &str,
        callback_url: Option<&str>,
    ) -> Result<Reply, DialogueError> {
        let expanded = vocabulary::expand_shorthand(utterance);

        if vocabulary::contains_any(&expanded, vocabulary::ANALYZE_TRIGGERS) {
            session.set_state(DialogueState::ConfirmAnalysis)?;
            self.store.put(key, session).await?;
            return Ok(Reply::text(ANALYZE_NOW_REPLY));
        }

        let offered = session
            .last_agent_text()
            .map(|t| vocabulary::contains_any(t, vocabulary::ANALYSIS_OFFER_MARKERS))
            .unwrap_or(false);
        if offered && vocabulary::is_affirmative(utterance, &expanded) {
            return self
                .handle_confirm_analysis(key, session, utterance, callback_url)
                .await;
        }

        session.push_user(&expanded);
        session.slots = extractor::extract(&expanded, &session.slots);

        let question = self.next_question_or_fallback(session).await;
        session.slots.set_last_question(&question);
        session.push_agent(&question);
        if question.contains(vocabulary::NO_MORE_TO_ASK_MARKER)
            || vocabulary::contains_any(&question, vocabulary::ANALYSIS_OFFER_MARKERS)
        {
            session.set_state(DialogueState::ConfirmAnalysis)?;
        }

        self.store.put(key, session).await?;
        Ok(Reply::text(question))
    }

    async fn handle_confirm_analysis(
        &self,
        key: &UserKey,
        session: &mut Session,
        utterance: &str,
        callback_url: Option<&str>,
    ) -> Result<Reply, DialogueError> {
        // confirmation needs the callback channel before either branch;
        // without one the turn errors and the session stays put
        let Some(callback_url) = callback_url else {
            return Ok(Reply::text(MISSING_CALLBACK_REPLY));
        };

        let expanded = vocabulary::expand_shorthand(utterance);

        if vocabulary::is_affirmative(utterance, &expanded) {
            session.push_user(&expanded);

            let wait = match self.questions.wait_message(&session.history).await {
                Ok(text) => text,
                Err(err) => {
                    warn!(error = %err, "wait message generation failed, using default");
                    vocabulary::DEFAULT_WAIT_MESSAGE.to_string()
                }
            };

            let task = AnalysisTask::new(
                key.clone(),
                session.history.clone(),
                session.slots.clone(),
                callback_url,
            );
            info!(user = %key, task = %task.task_id, "analysis task enqueued");
            self.queue.enqueue(task).await?;
            return Ok(Reply::wait(wait));
        }

        session.push_user(&expanded);
        session.set_state(DialogueState::Collecting)?;
        self.store.put(key, session).await?;
        Ok(Reply::text(DECLINED_ANALYSIS_REPLY))
    }

    async fn handle_post_analysis(
        &self,
        key: &UserKey,
        session: &mut Session,
        utterance: &str,
        callback_url: Option<&str>,
    ) -> Result<Reply, DialogueError> {
        use crate::domain::screening::report;

        let trimmed = utterance.trim();
        if trimmed == report::WHY_PRESENT_INTENT || trimmed == report::WHY_LOW_INTENT {
            return Ok(Reply::Card {
                title: "상세 분석 결과".to_string(),
                description: report::format_detailed_report(&session.slots),
                quick_replies: vec![report::RETRY_QUICK_REPLY.to_string()],
                image: None,
            });
        }
        if report::CARE_INTENTS.contains(&trimmed) {
            return Ok(Reply::text_with(
                report::CARE_GUIDE,
                vec![report::RETRY_QUICK_REPLY.to_string()],
            ));
        }
        if trimmed == report::BOOKING_INTENT {
            return Ok(Reply::text_with(
                report::BOOKING_GUIDE,
                vec![report::RETRY_QUICK_REPLY.to_string()],
            ));
        }

        // anything else re-opens collection for follow-up symptoms
        session.set_state(DialogueState::Collecting)?;
        self.handle_collecting(key, session, utterance, callback_url)
            .await
    }

    async fn close_session(&self, key: &UserKey) -> Result<Reply, DialogueError> {
        if let Some(session) = self.store.get(key).await? {
            let verdict = verdict::judge(&session.slots);
            info!(user = %key, possibility = %verdict.possibility, "archiving closed session");
            self.archive
                .archive(ArchiveRecord {
                    user_key: key.clone(),
                    history: session.history,
                    slots: session.slots,
                    verdict,
                    closed_at: chrono::Utc::now(),
                })
                .await?;
            self.store.delete(key).await?;
        }
        Ok(Reply::text(FAREWELL_REPLY))
    }

    async fn next_question_or_fallback(&self, session: &Session) -> String {
        next_question_or_fallback(self.questions.as_ref(), session).await
    }
}

/// Runs the question policy and generator, falling back to the fixed
/// question when generation fails.
pub(crate) async fn next_question_or_fallback(
    questions: &dyn QuestionService,
    session: &Session,
) -> String {
    match stage::plan_next_question(&session.history, &session.slots) {
        QuestionPlan::ProposeAnalysis => vocabulary::TRANSITION_SENTENCE.to_string(),
        QuestionPlan::Probe(context) => {
            let recent = session.recent(stage::RECENT_WINDOW);
            match questions.next_question(recent, &context).await {
                Ok(question) => question,
                Err(err) => {
                    warn!(error = %err, "question generation failed, using fallback");
                    vocabulary::FALLBACK_QUESTION.to_string()
                }
            }
        }
    }
}
