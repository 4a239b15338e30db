//! Axum route handler for the chat endpoint.

use axum::{
    extract::{rejection::BytesRejection, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::chat::ChatTurn;
use crate::state::AppState;

/// Largest accepted request body, in bytes.
pub const MAX_BODY_BYTES: usize = 4096;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub history: Option<Vec<ChatTurn>>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
}

/// POST /chat
///
/// The router caps buffering at `MAX_BODY_BYTES`; an over-limit body surfaces
/// here as a rejection and is answered with the JSON 413. History is passed
/// to the driver as given.
pub async fn handle_chat(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    let body = body.map_err(|rejection| match rejection.status() {
        StatusCode::PAYLOAD_TOO_LARGE => AppError::PayloadTooLarge,
        _ => AppError::Validation(rejection.body_text()),
    })?;

    if body.len() > MAX_BODY_BYTES {
        return Err(AppError::PayloadTooLarge);
    }

    let request: ChatRequest = serde_json::from_slice(&body)
        .map_err(|e| AppError::Validation(format!("Invalid request body: {e}")))?;

    let message = request
        .message
        .filter(|m| !m.is_empty())
        .ok_or_else(AppError::missing_message)?;

    let response = state
        .driver
        .chat(&message, request.history.unwrap_or_default())
        .await?;

    Ok(Json(ChatResponse { response }))
}
