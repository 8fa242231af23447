//! Axum route handlers for the Interview API.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::interview::manager::{
    QuestionResponse, SessionStatus, StartInterviewResponse, SubmitAnswerResponse,
};
use crate::interview::summary::InterviewSummary;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct StartInterviewRequest {
    pub role: String,
    /// Falls back to QUESTION_DIFFICULTY when omitted.
    pub difficulty: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitAnswerRequest {
    pub session_id: String,
    pub question_id: u32,
    pub answer: String,
}

#[derive(Debug, Serialize)]
pub struct DeleteSessionResponse {
    pub session_id: String,
    pub deleted: bool,
}

#[derive(Debug, Serialize)]
pub struct SessionListResponse {
    pub sessions: Vec<String>,
    pub count: usize,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/interview/start
pub async fn handle_start(
    State(state): State<AppState>,
    Json(request): Json<StartInterviewRequest>,
) -> Result<Json<StartInterviewResponse>, AppError> {
    let difficulty = request
        .difficulty
        .unwrap_or_else(|| state.config.question_difficulty.to_string());

    let response = state
        .manager
        .start_interview(&request.role, &difficulty, request.topics)
        .await?;

    Ok(Json(response))
}

/// POST /api/interview/answer
pub async fn handle_answer(
    State(state): State<AppState>,
    Json(request): Json<SubmitAnswerRequest>,
) -> Result<Json<SubmitAnswerResponse>, AppError> {
    let response = state
        .manager
        .submit_answer(&request.session_id, request.question_id, &request.answer)
        .await?;

    Ok(Json(response))
}

/// POST /api/interview/next/:session_id
pub async fn handle_next_question(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<QuestionResponse>, AppError> {
    Ok(Json(state.manager.next_question(&session_id).await?))
}

/// GET /api/interview/current/:session_id
///
/// 404 both for an unknown session and when no question is pending.
pub async fn handle_current_question(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<QuestionResponse>, AppError> {
    state
        .manager
        .get_current_question(&session_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("No current question in session {session_id}")))
}

/// GET /api/interview/summary/:session_id
pub async fn handle_summary(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<InterviewSummary>, AppError> {
    Ok(Json(state.manager.generate_summary(&session_id).await?))
}

/// GET /api/interview/status/:session_id
pub async fn handle_status(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionStatus>, AppError> {
    Ok(Json(state.manager.get_session_state(&session_id).await?))
}

/// DELETE /api/interview/session/:session_id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<DeleteSessionResponse>, AppError> {
    if !state.manager.delete_session(&session_id).await {
        return Err(AppError::NotFound(format!("Session {session_id} not found")));
    }
    Ok(Json(DeleteSessionResponse {
        session_id,
        deleted: true,
    }))
}

/// GET /api/interview/sessions
pub async fn handle_list_sessions(State(state): State<AppState>) -> Json<SessionListResponse> {
    let sessions = state.manager.list_sessions().await;
    Json(SessionListResponse {
        count: sessions.len(),
        sessions,
    })
}
