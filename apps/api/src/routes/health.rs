use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /
pub async fn root_handler() -> Json<Value> {
    Json(json!({
        "message": "Welcome to PrepMate API"
    }))
}

/// GET /health
/// Liveness: the process is up and serving requests.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "prepmate-api"
    }))
}

/// GET /health/ready
/// Readiness: reports the live session count alongside the status.
pub async fn readiness_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ready",
        "active_sessions": state.manager.store().len().await,
        "max_questions": state.manager.max_questions()
    }))
}
