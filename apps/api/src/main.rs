mod config;
mod errors;
mod interview;
mod llm_client;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::http::HeaderValue;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::interview::generator::{
    FeedbackGenerator, LlmFeedbackGenerator, LlmQuestionGenerator, MockFeedbackGenerator,
    MockQuestionGenerator, QuestionGenerator,
};
use crate::interview::manager::InterviewManager;
use crate::interview::reaper::spawn_reaper;
use crate::interview::store::SessionStore;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first; invalid values abort startup
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting PrepMate API v{}", env!("CARGO_PKG_VERSION"));

    // Session store lives for the whole process; nothing is persisted
    let store = Arc::new(SessionStore::new());

    let (questions, feedback) = build_generators(&config)?;

    let manager = Arc::new(InterviewManager::new(
        Arc::clone(&store),
        questions,
        feedback,
        config.max_questions,
    ));
    info!(
        "Interview manager ready (max_questions={}, default difficulty={})",
        config.max_questions, config.question_difficulty
    );

    let _reaper = spawn_reaper(
        Arc::clone(&store),
        Duration::from_secs(config.session_ttl_secs),
        Duration::from_secs(config.session_reap_interval_secs.max(1)),
    );

    let state = AppState {
        manager,
        config: config.clone(),
    };

    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(build_cors(&config.allowed_origins)),
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// LLM-backed generators, or the deterministic mocks when no key is set or MOCK_LLM is on.
fn build_generators(
    config: &Config,
) -> Result<(Arc<dyn QuestionGenerator>, Arc<dyn FeedbackGenerator>)> {
    let api_key = match &config.llm_api_key {
        Some(key) if !config.use_mock_llm() => key.clone(),
        _ => {
            if config.mock_llm {
                info!("MOCK_LLM enabled; using mock generators");
            } else {
                warn!("No GROQ_API_KEY or OPENAI_API_KEY set; using mock generators");
            }
            let questions: Arc<dyn QuestionGenerator> = Arc::new(MockQuestionGenerator);
            let feedback: Arc<dyn FeedbackGenerator> = Arc::new(MockFeedbackGenerator);
            return Ok((questions, feedback));
        }
    };

    let llm = LlmClient::new(
        api_key,
        &config.llm_base_url,
        config.llm_model.clone(),
        config.llm_temperature,
    )?;
    info!("LLM client initialized (model: {})", llm.model());

    let questions: Arc<dyn QuestionGenerator> = Arc::new(LlmQuestionGenerator(llm.clone()));
    let feedback: Arc<dyn FeedbackGenerator> = Arc::new(LlmFeedbackGenerator(llm));
    Ok((questions, feedback))
}

/// Any origin when the list is empty; otherwise only the listed origins.
fn build_cors(allowed_origins: &[String]) -> CorsLayer {
    if allowed_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {origin:?}");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}
