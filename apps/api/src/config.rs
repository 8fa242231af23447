use anyhow::{bail, Context, Result};

use crate::interview::session::Difficulty;

const DEFAULT_LLM_BASE_URL: &str = "https://api.groq.com/openai/v1";
const DEFAULT_LLM_MODEL: &str = "llama-3.1-70b-versatile";

/// Application configuration loaded from environment variables.
/// Read once at startup; there is no hot reload.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Number of answered questions after which an interview is complete.
    pub max_questions: usize,
    /// Difficulty used when a start request omits one.
    pub question_difficulty: Difficulty,
    /// Empty means any origin.
    pub allowed_origins: Vec<String>,
    /// GROQ_API_KEY, falling back to OPENAI_API_KEY. `None` forces mock generators.
    pub llm_api_key: Option<String>,
    pub llm_base_url: String,
    pub llm_model: String,
    pub llm_temperature: f32,
    pub mock_llm: bool,
    /// Idle time after which a session is evicted. Zero disables the reaper.
    pub session_ttl_secs: u64,
    pub session_reap_interval_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let max_questions: usize = parse_env("MAX_QUESTIONS", 10)?;
        if max_questions == 0 {
            bail!("MAX_QUESTIONS must be at least 1");
        }

        let question_difficulty = optional_env("QUESTION_DIFFICULTY")
            .unwrap_or_else(|| "medium".to_string())
            .parse::<Difficulty>()
            .context("QUESTION_DIFFICULTY must be one of easy, medium, hard")?;

        let llm_api_key = optional_env("GROQ_API_KEY").or_else(|| optional_env("OPENAI_API_KEY"));

        Ok(Config {
            port: parse_env("PORT", 8000)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            max_questions,
            question_difficulty,
            allowed_origins: parse_origins(&std::env::var("ALLOWED_ORIGINS").unwrap_or_default()),
            llm_api_key,
            llm_base_url: optional_env("LLM_BASE_URL")
                .unwrap_or_else(|| DEFAULT_LLM_BASE_URL.to_string()),
            llm_model: optional_env("LLM_MODEL").unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
            llm_temperature: parse_env("LLM_TEMPERATURE", 0.7)?,
            mock_llm: parse_bool(optional_env("MOCK_LLM").as_deref()),
            session_ttl_secs: parse_env("SESSION_TTL_SECS", 7200)?,
            session_reap_interval_secs: parse_env("SESSION_REAP_INTERVAL_SECS", 60)?,
        })
    }

    /// True when generators should be the local deterministic ones.
    pub fn use_mock_llm(&self) -> bool {
        self.mock_llm || self.llm_api_key.is_none()
    }
}

#[cfg(test)]
impl Config {
    /// Defaults with no API key, so generators are the mock ones.
    pub fn for_tests(max_questions: usize) -> Self {
        Config {
            port: 8000,
            rust_log: "info".to_string(),
            max_questions,
            question_difficulty: Difficulty::Medium,
            allowed_origins: vec![],
            llm_api_key: None,
            llm_base_url: DEFAULT_LLM_BASE_URL.to_string(),
            llm_model: DEFAULT_LLM_MODEL.to_string(),
            llm_temperature: 0.7,
            mock_llm: false,
            session_ttl_secs: 0,
            session_reap_interval_secs: 60,
        }
    }
}

/// Returns the variable's value, treating unset and blank the same.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        None => Ok(default),
    }
}

fn parse_bool(raw: Option<&str>) -> bool {
    matches!(
        raw.map(|v| v.to_ascii_lowercase()).as_deref(),
        Some("1" | "true" | "yes" | "on")
    )
}

/// Splits a comma-separated origin list. A `*` entry means any origin.
fn parse_origins(raw: &str) -> Vec<String> {
    let origins: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect();

    if origins.iter().any(|o| o == "*") {
        return Vec::new();
    }
    origins
}
