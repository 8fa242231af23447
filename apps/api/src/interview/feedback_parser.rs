//! Feedback parser: turns raw evaluator output into a score and feedback text.
//!
//! Rules, first match wins:
//! 1. strict JSON `{"score": <number>, "feedback": <string>}` (code fences stripped)
//! 2. JSON object with fallback keys (see `SCORE_KEYS` / `FEEDBACK_KEYS`),
//!    numeric strings and `"7/10"` coerced
//! 3. `FEEDBACK: ...` / `SCORE: ...` labelled lines, labels case-insensitive
//! 4. anything else is `Unparseable`
//!
//! Scores are taken as given; no clamping to the 0–10 range.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::llm_client::strip_json_fences;

/// Score substituted when evaluator output cannot be parsed.
pub const NEUTRAL_SCORE: f64 = 5.0;

const SCORE_KEYS: &[&str] = &["score", "rating", "grade", "overall_score"];
const FEEDBACK_KEYS: &[&str] = &["feedback", "comments", "evaluation", "summary"];

#[derive(Debug, Clone, PartialEq)]
pub enum ParsedFeedback {
    Parsed { score: f64, feedback: String },
    Unparseable { raw_text: String },
}

/// What the manager records for an answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackResult {
    pub score: f64,
    pub feedback: String,
}

impl ParsedFeedback {
    /// Unparseable output degrades to the neutral score with the raw text as feedback.
    pub fn into_result(self) -> FeedbackResult {
        match self {
            ParsedFeedback::Parsed { score, feedback } => FeedbackResult { score, feedback },
            ParsedFeedback::Unparseable { raw_text } => FeedbackResult {
                score: NEUTRAL_SCORE,
                feedback: raw_text,
            },
        }
    }
}

#[derive(Deserialize)]
struct StrictFeedback {
    score: f64,
    feedback: String,
}

pub fn parse_feedback(raw: &str) -> ParsedFeedback {
    let raw_text = raw.trim().to_string();
    let body = strip_json_fences(&raw_text);

    if let Ok(strict) = serde_json::from_str::<StrictFeedback>(body) {
        return ParsedFeedback::Parsed {
            score: strict.score,
            feedback: strict.feedback.trim().to_string(),
        };
    }

    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        return parse_json_fallback(&map, &raw_text);
    }

    parse_labelled_lines(&raw_text)
}

fn parse_json_fallback(map: &Map<String, Value>, raw_text: &str) -> ParsedFeedback {
    let score = SCORE_KEYS
        .iter()
        .filter_map(|key| map.get(*key))
        .find_map(coerce_score);

    let Some(score) = score else {
        return ParsedFeedback::Unparseable {
            raw_text: raw_text.to_string(),
        };
    };

    let feedback = FEEDBACK_KEYS
        .iter()
        .filter_map(|key| map.get(*key))
        .find_map(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| raw_text.to_string());

    ParsedFeedback::Parsed { score, feedback }
}

fn parse_labelled_lines(raw_text: &str) -> ParsedFeedback {
    let mut feedback: Option<String> = None;
    let mut score: Option<f64> = None;

    for line in raw_text.lines() {
        let line = line.trim();
        if let Some(rest) = strip_label(line, "FEEDBACK:") {
            if feedback.is_none() && !rest.is_empty() {
                feedback = Some(rest.to_string());
            }
        } else if let Some(rest) = strip_label(line, "SCORE:") {
            if score.is_none() {
                score = parse_score_text(rest);
            }
        }
    }

    match score {
        Some(score) => ParsedFeedback::Parsed {
            score,
            feedback: feedback.unwrap_or_else(|| raw_text.to_string()),
        },
        None => ParsedFeedback::Unparseable {
            raw_text: raw_text.to_string(),
        },
    }
}

/// Case-insensitive prefix match; returns the trimmed remainder.
fn strip_label<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    let head = line.get(..label.len())?;
    if head.eq_ignore_ascii_case(label) {
        Some(line[label.len()..].trim())
    } else {
        None
    }
}

fn coerce_score(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_score_text(s),
        _ => None,
    }
}

/// Accepts `7`, `7.5`, `7/10` and `8 out of 10`; trailing punctuation is ignored.
fn parse_score_text(text: &str) -> Option<f64> {
    let text = text.trim();
    let numerator = text
        .split('/')
        .next()
        .unwrap_or(text)
        .split_whitespace()
        .next()?;
    numerator
        .trim_end_matches(|c: char| !c.is_ascii_digit())
        .parse::<f64>()
        .ok()
        .filter(|s| s.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_json() {
        let parsed = parse_feedback(r#"{"score": 8, "feedback": "Clear and correct."}"#);
        assert_eq!(
            parsed,
            ParsedFeedback::Parsed {
                score: 8.0,
                feedback: "Clear and correct.".to_string()
            }
        );
    }

    #[test]
    fn test_strict_json_inside_code_fence() {
        let raw = "```json\n{\"score\": 6.5, \"feedback\": \"Decent.\"}\n```";
        assert_eq!(
            parse_feedback(raw),
            ParsedFeedback::Parsed {
                score: 6.5,
                feedback: "Decent.".to_string()
            }
        );
    }

    #[test]
    fn test_json_fallback_keys() {
        let parsed = parse_feedback(r#"{"rating": "7/10", "comments": "Missing edge cases."}"#);
        assert_eq!(
            parsed,
            ParsedFeedback::Parsed {
                score: 7.0,
                feedback: "Missing edge cases.".to_string()
            }
        );
    }

    #[test]
    fn test_json_score_as_numeric_string() {
        let parsed = parse_feedback(r#"{"score": "9", "feedback": "Great."}"#);
        assert_eq!(parsed.into_result().score, 9.0);
    }

    #[test]
    fn test_json_without_feedback_keeps_raw_text() {
        let raw = r#"{"score": 4}"#;
        assert_eq!(
            parse_feedback(raw),
            ParsedFeedback::Parsed {
                score: 4.0,
                feedback: raw.to_string()
            }
        );
    }

    #[test]
    fn test_json_without_any_score_is_unparseable() {
        let raw = r#"{"feedback": "No number here."}"#;
        assert_eq!(
            parse_feedback(raw),
            ParsedFeedback::Unparseable {
                raw_text: raw.to_string()
            }
        );
    }

    #[test]
    fn test_labelled_lines() {
        let raw = "FEEDBACK: Good structure, weak on trade-offs.\nSCORE: 6";
        assert_eq!(
            parse_feedback(raw),
            ParsedFeedback::Parsed {
                score: 6.0,
                feedback: "Good structure, weak on trade-offs.".to_string()
            }
        );
    }

    #[test]
    fn test_labelled_lines_are_case_insensitive_and_accept_out_of_ten() {
        let raw = "Feedback: Solid.\nScore: 8/10";
        assert_eq!(
            parse_feedback(raw),
            ParsedFeedback::Parsed {
                score: 8.0,
                feedback: "Solid.".to_string()
            }
        );
    }

    #[test]
    fn test_score_line_without_feedback_line_uses_raw_text() {
        let raw = "The answer covers the basics.\nSCORE: 5.5";
        let result = parse_feedback(raw).into_result();
        assert_eq!(result.score, 5.5);
        assert_eq!(result.feedback, raw);
    }

    #[test]
    fn test_unparseable_score_line_degrades_to_neutral() {
        let raw = "FEEDBACK: Vague.\nSCORE: pretty good";
        let result = parse_feedback(raw).into_result();
        assert_eq!(result.score, NEUTRAL_SCORE);
        assert_eq!(result.feedback, raw);
    }

    #[test]
    fn test_free_text_degrades_to_neutral_with_raw_text() {
        let raw = "  I think the candidate did fine overall.  ";
        let parsed = parse_feedback(raw);
        assert_eq!(
            parsed,
            ParsedFeedback::Unparseable {
                raw_text: "I think the candidate did fine overall.".to_string()
            }
        );
        let result = parsed.into_result();
        assert_eq!(result.score, 5.0);
        assert_eq!(result.feedback, "I think the candidate did fine overall.");
    }

    #[test]
    fn test_scores_are_not_clamped() {
        let parsed = parse_feedback(r#"{"score": 12, "feedback": "Off the charts."}"#);
        assert_eq!(parsed.into_result().score, 12.0);
    }

    #[test]
    fn test_parse_score_text_forms() {
        assert_eq!(parse_score_text("7"), Some(7.0));
        assert_eq!(parse_score_text("7.5/10"), Some(7.5));
        assert_eq!(parse_score_text("8 out of 10"), Some(8.0));
        assert_eq!(parse_score_text("9."), Some(9.0));
        assert_eq!(parse_score_text("n/a"), None);
        assert_eq!(parse_score_text(""), None);
    }
}
