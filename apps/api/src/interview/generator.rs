//! Question and feedback collaborators.
//!
//! The manager holds both as `Arc<dyn …>` so backends swap at startup:
//! `Llm*` generators for real interviews, `Mock*` generators when `MOCK_LLM`
//! is set or no API key is configured.

use async_trait::async_trait;
use tracing::warn;

use crate::errors::InterviewError;
use crate::interview::feedback_parser::{parse_feedback, FeedbackResult, ParsedFeedback};
use crate::llm_client::prompts::{
    build_feedback_prompt, build_question_prompt, FEEDBACK_SYSTEM, QUESTION_SYSTEM,
};
use crate::llm_client::LlmClient;

#[async_trait]
pub trait QuestionGenerator: Send + Sync {
    /// `previous_questions` is the complete ordered history of the session.
    async fn generate_question(
        &self,
        role: &str,
        difficulty: &str,
        topic: &str,
        previous_questions: &[String],
    ) -> Result<String, InterviewError>;
}

#[async_trait]
pub trait FeedbackGenerator: Send + Sync {
    async fn generate_feedback(
        &self,
        question: &str,
        answer: &str,
    ) -> Result<FeedbackResult, InterviewError>;
}

// ────────────────────────────────────────────────────────────────────────────
// LLM-backed generators
// ────────────────────────────────────────────────────────────────────────────

pub struct LlmQuestionGenerator(pub LlmClient);

#[async_trait]
impl QuestionGenerator for LlmQuestionGenerator {
    async fn generate_question(
        &self,
        role: &str,
        difficulty: &str,
        topic: &str,
        previous_questions: &[String],
    ) -> Result<String, InterviewError> {
        let prompt = build_question_prompt(role, difficulty, topic, previous_questions);
        let text = self
            .0
            .call_text(&prompt, QUESTION_SYSTEM)
            .await
            .map_err(|e| InterviewError::Generation(format!("Question generation failed: {e}")))?;

        let question = clean_question(&text);
        if question.is_empty() {
            return Err(InterviewError::Generation(
                "Question generation returned no question text".to_string(),
            ));
        }
        Ok(question)
    }
}

pub struct LlmFeedbackGenerator(pub LlmClient);

#[async_trait]
impl FeedbackGenerator for LlmFeedbackGenerator {
    async fn generate_feedback(
        &self,
        question: &str,
        answer: &str,
    ) -> Result<FeedbackResult, InterviewError> {
        let prompt = build_feedback_prompt(question, answer);
        let text = self
            .0
            .call_text(&prompt, FEEDBACK_SYSTEM)
            .await
            .map_err(|e| InterviewError::Generation(format!("Feedback generation failed: {e}")))?;

        let parsed = parse_feedback(&text);
        if let ParsedFeedback::Unparseable { raw_text } = &parsed {
            warn!(
                "Unparseable feedback output, using neutral score: {:?}",
                raw_text.chars().take(80).collect::<String>()
            );
        }
        Ok(parsed.into_result())
    }
}

/// Strips a leading `Question:` label and wrapping quotes from model output.
fn clean_question(text: &str) -> String {
    let mut question = text.trim();
    if let Some(head) = question.get(..9) {
        if head.eq_ignore_ascii_case("question:") {
            question = question[9..].trim_start();
        }
    }
    if question.len() >= 2 && question.starts_with('"') && question.ends_with('"') {
        question = question[1..question.len() - 1].trim();
    }
    question.to_string()
}

// ────────────────────────────────────────────────────────────────────────────
// Mock generators
// ────────────────────────────────────────────────────────────────────────────

/// Deterministic question generator; echoes its inputs so history is visible.
pub struct MockQuestionGenerator;

#[async_trait]
impl QuestionGenerator for MockQuestionGenerator {
    async fn generate_question(
        &self,
        role: &str,
        difficulty: &str,
        topic: &str,
        previous_questions: &[String],
    ) -> Result<String, InterviewError> {
        let previous = if previous_questions.is_empty() {
            "none".to_string()
        } else {
            previous_questions.join(" | ")
        };
        Ok(format!(
            "Mock question ({difficulty}) for {role} on {topic}. Previous: {previous}"
        ))
    }
}

/// Deterministic feedback: one point per ten words, between 1 and 10.
pub struct MockFeedbackGenerator;

#[async_trait]
impl FeedbackGenerator for MockFeedbackGenerator {
    async fn generate_feedback(
        &self,
        _question: &str,
        answer: &str,
    ) -> Result<FeedbackResult, InterviewError> {
        let words = answer.split_whitespace().count();
        let score = (words as f64 / 10.0).ceil().clamp(1.0, 10.0);
        Ok(FeedbackResult {
            score,
            feedback: format!("Mock feedback: answer has {words} words."),
        })
    }
}
