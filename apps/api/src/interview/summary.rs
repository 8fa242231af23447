//! Summary: read-only aggregation over a session's answers.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::interview::session::{average, round2, Difficulty, Session, SessionState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PerformanceCategory {
    Excellent,
    Good,
    Fair,
    #[serde(rename = "Needs Improvement")]
    NeedsImprovement,
}

impl PerformanceCategory {
    /// `>= 8` Excellent, `>= 6` Good, `>= 4` Fair, otherwise Needs Improvement.
    pub fn from_average(avg: f64) -> Self {
        if avg >= 8.0 {
            PerformanceCategory::Excellent
        } else if avg >= 6.0 {
            PerformanceCategory::Good
        } else if avg >= 4.0 {
            PerformanceCategory::Fair
        } else {
            PerformanceCategory::NeedsImprovement
        }
    }
}

impl fmt::Display for PerformanceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PerformanceCategory::Excellent => "Excellent",
            PerformanceCategory::Good => "Good",
            PerformanceCategory::Fair => "Fair",
            PerformanceCategory::NeedsImprovement => "Needs Improvement",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicPerformance {
    pub topic: String,
    pub average_score: f64,
    pub answered: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptEntry {
    /// 1-based position in the interview.
    pub question_number: usize,
    pub question_id: u32,
    pub topic: String,
    pub question: String,
    pub answer: Option<String>,
    pub feedback: Option<String>,
    pub score: Option<f64>,
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewSummary {
    pub session_id: String,
    pub role: String,
    pub difficulty: Difficulty,
    pub topics: Vec<String>,
    pub state: SessionState,
    pub total_questions: usize,
    pub total_answers: usize,
    pub max_questions: usize,
    pub average_score: f64,
    pub performance: PerformanceCategory,
    pub topic_performance: Vec<TopicPerformance>,
    pub strongest_topic: Option<String>,
    pub weakest_topic: Option<String>,
    pub completion_rate: f64,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub questions_and_answers: Vec<TranscriptEntry>,
}

pub fn build_summary(session: &Session, max_questions: usize) -> InterviewSummary {
    let average_score = round2(session.average_score());
    let topic_performance = topic_performance(session);
    let (strongest_topic, weakest_topic) = strongest_and_weakest(&topic_performance);

    InterviewSummary {
        session_id: session.id.clone(),
        role: session.role.clone(),
        difficulty: session.difficulty,
        topics: session.topics.clone(),
        state: session.state,
        total_questions: session.questions.len(),
        total_answers: session.answers.len(),
        max_questions,
        average_score,
        performance: PerformanceCategory::from_average(average_score),
        topic_performance,
        strongest_topic,
        weakest_topic,
        completion_rate: completion_rate(session.answers.len(), max_questions),
        started_at: session.created_at,
        completed_at: session.completed_at,
        questions_and_answers: transcript(session),
    }
}

/// Per-topic averages in first-seen order.
///
/// Answer `i` is attributed to the topic of question `i` (positional, not by
/// `question_id`). This matches the submission model where answers arrive in
/// question order.
pub fn topic_performance(session: &Session) -> Vec<TopicPerformance> {
    let mut grouped: Vec<(String, Vec<f64>)> = Vec::new();

    for (answer, question) in session.answers.iter().zip(&session.questions) {
        match grouped.iter_mut().find(|(topic, _)| *topic == question.topic) {
            Some((_, scores)) => scores.push(answer.score),
            None => grouped.push((question.topic.clone(), vec![answer.score])),
        }
    }

    grouped
        .into_iter()
        .map(|(topic, scores)| TopicPerformance {
            topic,
            average_score: round2(average(&scores)),
            answered: scores.len(),
        })
        .collect()
}

/// Argmax / argmin over per-topic averages; ties go to the first-seen topic.
pub fn strongest_and_weakest(topics: &[TopicPerformance]) -> (Option<String>, Option<String>) {
    let mut strongest: Option<&TopicPerformance> = None;
    let mut weakest: Option<&TopicPerformance> = None;

    for tp in topics {
        if strongest.map_or(true, |s| tp.average_score > s.average_score) {
            strongest = Some(tp);
        }
        if weakest.map_or(true, |w| tp.average_score < w.average_score) {
            weakest = Some(tp);
        }
    }

    (
        strongest.map(|t| t.topic.clone()),
        weakest.map(|t| t.topic.clone()),
    )
}

pub fn completion_rate(answered: usize, max_questions: usize) -> f64 {
    if max_questions == 0 {
        return 0.0;
    }
    round2(answered as f64 / max_questions as f64 * 100.0)
}

fn transcript(session: &Session) -> Vec<TranscriptEntry> {
    session
        .questions
        .iter()
        .enumerate()
        .map(|(i, question)| {
            let answer = session.answers.get(i);
            TranscriptEntry {
                question_number: i + 1,
                question_id: question.id,
                topic: question.topic.clone(),
                question: question.text.clone(),
                answer: answer.map(|a| a.text.clone()),
                feedback: answer.map(|a| a.feedback.clone()),
                score: answer.map(|a| a.score),
                timestamp: answer.map(|a| a.timestamp),
            }
        })
        .collect()
}
