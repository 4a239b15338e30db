use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::chat::ChatError;

pub const MISSING_MESSAGE: &str = "Missing required 'message' field.";

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
/// Every variant renders as `{"error": "<message>"}`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("Request too large")]
    PayloadTooLarge,

    #[error("Rate limit exceeded: {limit} per 1 minute")]
    RateLimited { limit: u32 },

    #[error("Invalid host header")]
    InvalidHost,

    /// Conversation failures. The description is returned to the client
    /// verbatim, including upstream and tool-argument error text.
    #[error("{0}")]
    Chat(#[from] ChatError),
}

impl AppError {
    pub fn missing_message() -> Self {
        AppError::Validation(MISSING_MESSAGE.to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::InvalidHost => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::Chat(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            AppError::Chat(e) => tracing::error!("Chat error: {e}"),
            AppError::RateLimited { .. } => tracing::warn!("{}", self),
            _ => tracing::debug!("Rejected request: {}", self),
        }

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::ToolError;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::missing_message().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::PayloadTooLarge.status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            AppError::RateLimited { limit: 10 }.status(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(AppError::InvalidHost.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_chat_error_exposes_description() {
        let source = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let err = AppError::from(ChatError::from(ToolError::InvalidArguments {
            tool: "record_user_details".to_string(),
            source,
        }));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.to_string().contains("record_user_details"));
    }

    #[test]
    fn test_rate_limit_message() {
        assert_eq!(
            AppError::RateLimited { limit: 10 }.to_string(),
            "Rate limit exceeded: 10 per 1 minute"
        );
    }
}
