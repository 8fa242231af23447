//! Interview Manager: drives the session state machine.
//!
//! Flow per interview: start_interview → (submit_answer)* → completed → generate_summary.
//!
//! Each operation locks the session it touches for its full duration, so calls on
//! the same session run one at a time. Generator calls happen while the lock is held.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::errors::InterviewError;
use crate::interview::generator::{FeedbackGenerator, QuestionGenerator};
use crate::interview::session::{Difficulty, Progress, Session, SessionState, DEFAULT_TOPIC};
use crate::interview::store::SessionStore;
use crate::interview::summary::{build_summary, InterviewSummary};

// ────────────────────────────────────────────────────────────────────────────
// Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartInterviewResponse {
    pub session_id: String,
    pub question: String,
    pub question_id: u32,
    pub progress: Progress,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitAnswerResponse {
    pub feedback: String,
    pub score: f64,
    pub is_complete: bool,
    pub progress: Progress,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_question: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_question_id: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionResponse {
    pub question: String,
    pub question_id: u32,
    pub topic: String,
    pub progress: Progress,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStatus {
    pub session_id: String,
    pub state: SessionState,
    pub is_complete: bool,
    pub progress: Progress,
}

// ────────────────────────────────────────────────────────────────────────────
// Manager
// ────────────────────────────────────────────────────────────────────────────

pub struct InterviewManager {
    store: Arc<SessionStore>,
    questions: Arc<dyn QuestionGenerator>,
    feedback: Arc<dyn FeedbackGenerator>,
    max_questions: usize,
}

impl InterviewManager {
    pub fn new(
        store: Arc<SessionStore>,
        questions: Arc<dyn QuestionGenerator>,
        feedback: Arc<dyn FeedbackGenerator>,
        max_questions: usize,
    ) -> Self {
        Self {
            store,
            questions,
            feedback,
            max_questions,
        }
    }

    pub fn max_questions(&self) -> usize {
        self.max_questions
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Validates input, creates a session and asks its first question.
    /// If the first question cannot be generated the session is discarded.
    pub async fn start_interview(
        &self,
        role: &str,
        difficulty: &str,
        topics: Vec<String>,
    ) -> Result<StartInterviewResponse, InterviewError> {
        let role = role.trim();
        if role.is_empty() {
            return Err(InterviewError::Validation(
                "role must not be empty".to_string(),
            ));
        }
        let difficulty: Difficulty = difficulty.parse()?;
        let topics = normalize_topics(topics)?;

        let (session_id, handle) = self
            .store
            .create(role.to_string(), difficulty, topics)
            .await;
        let mut session = handle.lock().await;

        let first_topic = session.next_topic().to_string();
        let question = match self
            .questions
            .generate_question(role, difficulty.as_str(), &first_topic, &[])
            .await
        {
            Ok(q) => q,
            Err(e) => {
                error!("Session {session_id}: first question generation failed: {e}");
                drop(session);
                self.store.delete(&session_id).await;
                return Err(e);
            }
        };

        let question_id = session.add_question(question.clone());
        info!(
            "Session {session_id} started: role={role:?} difficulty={difficulty} topics={:?}",
            session.topics
        );

        Ok(StartInterviewResponse {
            session_id,
            question,
            question_id,
            progress: session.progress(self.max_questions),
        })
    }

    /// The question under the cursor, or `None` once the cursor is past the end.
    pub async fn get_current_question(
        &self,
        session_id: &str,
    ) -> Result<Option<QuestionResponse>, InterviewError> {
        let handle = self.store.get(session_id).await?;
        let mut session = handle.lock().await;
        session.touch();

        Ok(session.current_question().map(|q| QuestionResponse {
            question: q.text.clone(),
            question_id: q.id,
            topic: q.topic.clone(),
            progress: session.progress(self.max_questions),
        }))
    }

    /// Scores an answer, then either asks the next question or completes the session.
    ///
    /// Leaves the session untouched when the question is unknown, the session is
    /// already complete, every asked question is already answered, or feedback
    /// generation fails. If only the follow-up question fails, the answer stays
    /// recorded and `next_question` can retry.
    pub async fn submit_answer(
        &self,
        session_id: &str,
        question_id: u32,
        answer: &str,
    ) -> Result<SubmitAnswerResponse, InterviewError> {
        let handle = self.store.get(session_id).await?;
        let mut session = handle.lock().await;
        session.touch();

        if session.is_completed() {
            return Err(InterviewError::Validation(format!(
                "Session {session_id} is already complete"
            )));
        }
        if answer.trim().is_empty() {
            return Err(InterviewError::Validation(
                "answer must not be empty".to_string(),
            ));
        }

        if !session.has_pending_question() {
            return Err(InterviewError::Validation(format!(
                "Session {session_id} has no unanswered question; call next_question first"
            )));
        }

        let question_text = session
            .find_question(question_id)
            .map(|q| q.text.clone())
            .ok_or_else(|| InterviewError::QuestionNotFound {
                session_id: session_id.to_string(),
                question_id,
            })?;

        let result = self
            .feedback
            .generate_feedback(&question_text, answer)
            .await
            .map_err(|e| {
                error!("Session {session_id}: feedback for question {question_id} failed: {e}");
                e
            })?;

        session.add_answer(
            question_id,
            answer.to_string(),
            result.feedback.clone(),
            result.score,
        );
        info!(
            "Session {session_id}: question {question_id} answered, score={} ({}/{})",
            result.score,
            session.answers.len(),
            self.max_questions
        );

        let is_complete = session.has_reached(self.max_questions);
        let mut response = SubmitAnswerResponse {
            feedback: result.feedback,
            score: result.score,
            is_complete,
            progress: session.progress(self.max_questions),
            next_question: None,
            next_question_id: None,
        };

        if is_complete {
            session.mark_completed();
            info!(
                "Session {session_id} completed: average score {:.2}",
                session.average_score()
            );
            return Ok(response);
        }

        let next = self.ask_next_question(&mut session).await.map_err(|e| {
            error!("Session {session_id}: next question generation failed: {e}");
            e
        })?;
        response.next_question = Some(next.question);
        response.next_question_id = Some(next.question_id);
        Ok(response)
    }

    /// Advances the cursor and appends one freshly generated question.
    /// Not idempotent: every call adds a question.
    pub async fn next_question(&self, session_id: &str) -> Result<QuestionResponse, InterviewError> {
        let handle = self.store.get(session_id).await?;
        let mut session = handle.lock().await;
        session.touch();

        if session.is_completed() {
            return Err(InterviewError::Validation(format!(
                "Session {session_id} is already complete"
            )));
        }

        self.ask_next_question(&mut session).await.map_err(|e| {
            error!("Session {session_id}: next question generation failed: {e}");
            e
        })
    }

    /// Aggregates the session. Only the last-access time is refreshed.
    pub async fn generate_summary(&self, session_id: &str) -> Result<InterviewSummary, InterviewError> {
        let handle = self.store.get(session_id).await?;
        let mut session = handle.lock().await;
        session.touch();
        Ok(build_summary(&session, self.max_questions))
    }

    pub async fn get_session_state(&self, session_id: &str) -> Result<SessionStatus, InterviewError> {
        let handle = self.store.get(session_id).await?;
        let session = handle.lock().await;
        Ok(SessionStatus {
            session_id: session.id.clone(),
            state: session.state,
            is_complete: session.is_completed(),
            progress: session.progress(self.max_questions),
        })
    }

    pub async fn is_complete(&self, session_id: &str) -> Result<bool, InterviewError> {
        let handle = self.store.get(session_id).await?;
        let is_complete = handle.lock().await.is_completed();
        Ok(is_complete)
    }

    /// Returns whether the session existed. Safe to repeat.
    pub async fn delete_session(&self, session_id: &str) -> bool {
        let existed = self.store.delete(session_id).await;
        if existed {
            info!("Session {session_id} deleted");
        } else {
            warn!("Delete requested for unknown session {session_id}");
        }
        existed
    }

    pub async fn list_sessions(&self) -> Vec<String> {
        self.store.list_ids().await
    }

    /// Moves the cursor forward and appends a question, passing the full question
    /// history to the generator.
    ///
    /// The generator is asked about `topics[len(answers) % len]` while the stored
    /// question carries `topics[index % len]`. The two differ after a standalone
    /// `next_question`; summary attribution uses the stored one.
    async fn ask_next_question(&self, session: &mut Session) -> Result<QuestionResponse, InterviewError> {
        let requested_topic = session.requested_topic().to_string();
        let previous_questions = session.previous_questions();

        let question = self
            .questions
            .generate_question(
                &session.role,
                session.difficulty.as_str(),
                &requested_topic,
                &previous_questions,
            )
            .await?;

        session.advance_cursor();
        let question_id = session.add_question(question.clone());
        let topic = session
            .find_question(question_id)
            .map(|q| q.topic.clone())
            .unwrap_or(requested_topic);

        Ok(QuestionResponse {
            question,
            question_id,
            topic,
            progress: session.progress(self.max_questions),
        })
    }
}

/// Trims labels; an empty list becomes `["general"]`, a blank label is rejected.
fn normalize_topics(topics: Vec<String>) -> Result<Vec<String>, InterviewError> {
    if topics.is_empty() {
        return Ok(vec![DEFAULT_TOPIC.to_string()]);
    }
    topics
        .into_iter()
        .map(|t| {
            let t = t.trim();
            if t.is_empty() {
                Err(InterviewError::Validation(
                    "topics must not contain blank entries".to_string(),
                ))
            } else {
                Ok(t.to_string())
            }
        })
        .collect()
}
