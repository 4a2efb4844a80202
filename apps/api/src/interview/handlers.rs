//! Axum route handlers for the interview chat.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct StartInterviewRequest {
    pub application_id: String,
    pub candidate_name: String,
    pub job_title: String,
    #[serde(default)]
    pub questions: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct StartInterviewResponse {
    pub message: String,
    pub application_id: String,
    pub status: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct NextTurnRequest {
    pub application_id: String,
    pub previous_answer: String,
    #[serde(default)]
    pub remaining_questions: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct NextTurnResponse {
    pub message: String,
    pub questions_remaining: bool,
    pub remaining_count: usize,
}

#[derive(Debug, Deserialize)]
pub struct FinalizeRequest {
    pub application_id: String,
}

#[derive(Debug, Serialize)]
pub struct FinalizeResponse {
    pub message: String,
    pub finished: bool,
    pub application_id: String,
}

#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub message: String,
    pub application_id: String,
}

fn require_application_id(id: &str) -> Result<&str, AppError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(AppError::Validation(
            "application_id cannot be empty".to_string(),
        ));
    }
    Ok(id)
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/interviews/start
pub async fn handle_start(
    State(state): State<AppState>,
    Json(request): Json<StartInterviewRequest>,
) -> Result<Json<StartInterviewResponse>, AppError> {
    let application_id = require_application_id(&request.application_id)?;

    let message = state
        .interviews
        .start(
            application_id,
            &request.candidate_name,
            &request.job_title,
            &request.questions,
        )
        .await
        .into_value();

    Ok(Json(StartInterviewResponse {
        message,
        application_id: application_id.to_string(),
        status: "started",
    }))
}

/// POST /api/v1/interviews/next
///
/// The caller tracks which questions remain; an empty list asks for the closing line.
pub async fn handle_next(
    State(state): State<AppState>,
    Json(request): Json<NextTurnRequest>,
) -> Result<Json<NextTurnResponse>, AppError> {
    let application_id = require_application_id(&request.application_id)?;

    let message = state
        .interviews
        .next(
            application_id,
            &request.previous_answer,
            &request.remaining_questions,
        )
        .await
        .into_value();

    Ok(Json(NextTurnResponse {
        message,
        questions_remaining: !request.remaining_questions.is_empty(),
        remaining_count: request.remaining_questions.len(),
    }))
}

/// POST /api/v1/interviews/finalize
pub async fn handle_finalize(
    State(state): State<AppState>,
    Json(request): Json<FinalizeRequest>,
) -> Result<Json<FinalizeResponse>, AppError> {
    let application_id = require_application_id(&request.application_id)?;

    let message = state.interviews.finalize(application_id).await.into_value();

    Ok(Json(FinalizeResponse {
        message,
        finished: true,
        application_id: application_id.to_string(),
    }))
}

/// DELETE /api/v1/interviews/:application_id
///
/// Drops an abandoned session. Succeeds whether or not the session existed.
pub async fn handle_clear(
    State(state): State<AppState>,
    Path(application_id): Path<String>,
) -> Result<Json<ClearResponse>, AppError> {
    let application_id = require_application_id(&application_id)?;

    state.interviews.clear(application_id).await;

    Ok(Json(ClearResponse {
        message: "Interview session cleared".to_string(),
        application_id: application_id.to_string(),
    }))
}
