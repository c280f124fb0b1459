use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use carewise_chat::ChatError;
use carewise_records::RecordError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("record not found: {0}")]
    RecordNotFound(String),

    #[error("chat history not found")]
    HistoryNotFound,

    #[error("invalid request: {0}")]
    BadRequest(String),

    #[error("missing or empty X-User-Id header")]
    Unauthorized,

    #[error("assistant temporarily unavailable")]
    CompletionUnavailable,

    #[error("storage error: {0}")]
    Storage(String),
}

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::RecordNotFound(id) => ApiError::RecordNotFound(id),
            ChatError::ThreadNotFound(_) => ApiError::HistoryNotFound,
            ChatError::CompletionUnavailable => ApiError::CompletionUnavailable,
            ChatError::Validation(msg) => ApiError::BadRequest(msg),
            ChatError::Storage(msg) => ApiError::Storage(msg),
        }
    }
}

impl From<RecordError> for ApiError {
    fn from(err: RecordError) -> Self {
        ApiError::Storage(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::RecordNotFound(_) | ApiError::HistoryNotFound => {
                (StatusCode::NOT_FOUND, self.to_string())
            }
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
            ApiError::CompletionUnavailable => {
                tracing::warn!("completion unavailable, returning 503");
                (StatusCode::SERVICE_UNAVAILABLE, self.to_string())
            }
            ApiError::Storage(ref msg) => {
                tracing::error!("storage error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Storage error".to_string(),
                )
            }
        };

        let body = Json(json!({ "error": message }));
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
