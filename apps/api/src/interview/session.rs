//! Session: the in-memory record of one candidate's interview attempt.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::InterviewError;

/// Topic used when a session has no topics configured.
pub const DEFAULT_TOPIC: &str = "general";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = InterviewError;

    /// Case-insensitive; surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(InterviewError::Validation(format!(
                "Invalid difficulty '{other}'. Must be one of: easy, medium, hard"
            ))),
        }
    }
}

/// Lifecycle of a session. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    NotStarted,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: u32,
    pub text: String,
    pub topic: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub question_id: u32,
    pub text: String,
    pub feedback: String,
    pub score: f64,
    pub timestamp: DateTime<Utc>,
}

/// Answered/remaining counts against the configured question cap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    pub answered: usize,
    pub remaining: usize,
    pub total: usize,
    pub percentage: f64,
}

impl Progress {
    pub fn new(answered: usize, total: usize) -> Self {
        let percentage = if total == 0 {
            0.0
        } else {
            round2(answered as f64 / total as f64 * 100.0)
        };
        Self {
            answered,
            remaining: total.saturating_sub(answered),
            total,
            percentage,
        }
    }
}

/// One interview's question/answer history.
///
/// `answers[i]` is assumed to answer `questions[i]`: answers arrive in question
/// order. Per-topic aggregation relies on this positional alignment.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub role: String,
    pub difficulty: Difficulty,
    pub topics: Vec<String>,
    pub questions: Vec<Question>,
    pub answers: Vec<Answer>,
    pub scores: Vec<f64>,
    pub state: SessionState,
    pub current_question_index: usize,
    next_question_id: u32,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub last_accessed_at: DateTime<Utc>,
}

impl Session {
    pub fn new(id: String, role: String, difficulty: Difficulty, topics: Vec<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            role,
            difficulty,
            topics,
            questions: Vec::new(),
            answers: Vec::new(),
            scores: Vec::new(),
            state: SessionState::NotStarted,
            current_question_index: 0,
            next_question_id: 0,
            created_at: now,
            completed_at: None,
            last_accessed_at: now,
        }
    }

    /// Topic for the question at `index`: `topics[index % len]`, or "general".
    pub fn topic_for_index(&self, index: usize) -> &str {
        if self.topics.is_empty() {
            return DEFAULT_TOPIC;
        }
        &self.topics[index % self.topics.len()]
    }

    /// Topic the next appended question will carry.
    pub fn next_topic(&self) -> &str {
        self.topic_for_index(self.questions.len())
    }

    /// Topic the generator is asked about for a follow-up question:
    /// `topics[len(answers) % len]`. Equals `next_topic` while every question
    /// but the last has been answered; a standalone advance makes them diverge.
    pub fn requested_topic(&self) -> &str {
        self.topic_for_index(self.answers.len())
    }

    /// True while fewer answers than questions have been recorded.
    pub fn has_pending_question(&self) -> bool {
        self.answers.len() < self.questions.len()
    }

    /// All question texts asked so far, in order.
    pub fn previous_questions(&self) -> Vec<String> {
        self.questions.iter().map(|q| q.text.clone()).collect()
    }

    /// Appends a question with the next id and returns that id.
    /// The first question moves the session to `InProgress`.
    pub fn add_question(&mut self, text: String) -> u32 {
        let id = self.next_question_id;
        let topic = self.next_topic().to_string();
        self.questions.push(Question { id, text, topic });
        self.next_question_id += 1;
        self.advance_state(SessionState::InProgress);
        id
    }

    pub fn find_question(&self, question_id: u32) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == question_id)
    }

    pub fn add_answer(&mut self, question_id: u32, text: String, feedback: String, score: f64) {
        self.answers.push(Answer {
            question_id,
            text,
            feedback,
            score,
            timestamp: Utc::now(),
        });
        self.scores.push(score);
    }

    /// The question under the cursor, if the cursor has not run past the end.
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current_question_index)
    }

    pub fn advance_cursor(&mut self) {
        self.current_question_index += 1;
    }

    /// Mean of all scores, 0.0 when nothing has been answered.
    pub fn average_score(&self) -> f64 {
        average(&self.scores)
    }

    pub fn has_reached(&self, max_questions: usize) -> bool {
        self.answers.len() >= max_questions
    }

    pub fn is_completed(&self) -> bool {
        self.state == SessionState::Completed
    }

    pub fn mark_completed(&mut self) {
        if self.advance_state(SessionState::Completed) {
            self.completed_at = Some(Utc::now());
        }
    }

    pub fn progress(&self, max_questions: usize) -> Progress {
        Progress::new(self.answers.len(), max_questions)
    }

    pub fn touch(&mut self) {
        self.last_accessed_at = Utc::now();
    }

    /// Moves to `next` if it is the immediate successor of the current state.
    /// Returns whether the state changed.
    fn advance_state(&mut self, next: SessionState) -> bool {
        let allowed = matches!(
            (self.state, next),
            (SessionState::NotStarted, SessionState::InProgress)
                | (SessionState::InProgress, SessionState::Completed)
        );
        if allowed {
            self.state = next;
        }
        allowed
    }
}

pub fn average(scores: &[f64]) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    scores.iter().sum::<f64>() / scores.len() as f64
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
