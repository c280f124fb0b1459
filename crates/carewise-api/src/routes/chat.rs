use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use carewise_chat::{StoredMessage, ThreadSelector};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::{auth::AuthedUser, error::ApiResult, state::AppState};

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChatTurnRequest {
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub role: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ChatTurnResponse {
    /// The assistant's reply to this turn.
    pub response: String,
    /// The full updated transcript, oldest first.
    pub messages: Vec<MessageResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HistoryResponse {
    pub messages: Vec<MessageResponse>,
}

fn message_to_response(message: StoredMessage) -> MessageResponse {
    MessageResponse {
        role: match message.role {
            carewise_chat::MessageRole::User => "user".to_string(),
            carewise_chat::MessageRole::Assistant => "assistant".to_string(),
        },
        content: message.content,
        timestamp: message.timestamp,
    }
}

fn turn_response(transcript: Vec<StoredMessage>) -> ChatTurnResponse {
    let response = transcript
        .last()
        .map(|m| m.content.clone())
        .unwrap_or_default();

    ChatTurnResponse {
        response,
        messages: transcript.into_iter().map(message_to_response).collect(),
    }
}

/// Send a turn on the user's main thread
#[utoipa::path(
    post,
    path = "/chat",
    request_body = ChatTurnRequest,
    responses(
        (status = 200, description = "Assistant replied", body = ChatTurnResponse),
        (status = 400, description = "Empty message"),
        (status = 503, description = "Completion service unavailable")
    ),
    tag = "chat"
)]
pub async fn send_main_turn(
    State(state): State<Arc<AppState>>,
    AuthedUser(user_id): AuthedUser,
    Json(req): Json<ChatTurnRequest>,
) -> ApiResult<Json<ChatTurnResponse>> {
    let transcript = state
        .chat
        .send_turn(&user_id, ThreadSelector::Main, &req.message)
        .await?;

    Ok(Json(turn_response(transcript)))
}

/// Get the main thread's history
#[utoipa::path(
    get,
    path = "/chat/history",
    responses(
        (status = 200, description = "Transcript (empty if no turns yet)", body = HistoryResponse)
    ),
    tag = "chat"
)]
pub async fn get_main_history(
    State(state): State<Arc<AppState>>,
    AuthedUser(user_id): AuthedUser,
) -> ApiResult<Json<HistoryResponse>> {
    let messages = state
        .chat
        .get_history(&user_id, ThreadSelector::Main)
        .await?;

    Ok(Json(HistoryResponse {
        messages: messages.into_iter().map(message_to_response).collect(),
    }))
}

/// Clear the main thread's history
#[utoipa::path(
    delete,
    path = "/chat/history",
    responses(
        (status = 204, description = "History cleared"),
        (status = 404, description = "Thread was never created")
    ),
    tag = "chat"
)]
pub async fn clear_main_history(
    State(state): State<Arc<AppState>>,
    AuthedUser(user_id): AuthedUser,
) -> ApiResult<StatusCode> {
    state
        .chat
        .clear_history(&user_id, ThreadSelector::Main)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Send a turn on the thread bound to one health record
#[utoipa::path(
    post,
    path = "/records/{record_id}/chat",
    params(("record_id" = String, Path, description = "Health record id")),
    request_body = ChatTurnRequest,
    responses(
        (status = 200, description = "Assistant replied", body = ChatTurnResponse),
        (status = 404, description = "Record not found or not owned by the caller"),
        (status = 503, description = "Completion service unavailable")
    ),
    tag = "chat"
)]
pub async fn send_record_turn(
    State(state): State<Arc<AppState>>,
    AuthedUser(user_id): AuthedUser,
    Path(record_id): Path<String>,
    Json(req): Json<ChatTurnRequest>,
) -> ApiResult<Json<ChatTurnResponse>> {
    let transcript = state
        .chat
        .send_turn(
            &user_id,
            ThreadSelector::FormSpecific(record_id),
            &req.message,
        )
        .await?;

    Ok(Json(turn_response(transcript)))
}

/// Get a record-bound thread's history
#[utoipa::path(
    get,
    path = "/records/{record_id}/chat/history",
    params(("record_id" = String, Path, description = "Health record id")),
    responses(
        (status = 200, description = "Transcript (empty if no turns yet)", body = HistoryResponse)
    ),
    tag = "chat"
)]
pub async fn get_record_history(
    State(state): State<Arc<AppState>>,
    AuthedUser(user_id): AuthedUser,
    Path(record_id): Path<String>,
) -> ApiResult<Json<HistoryResponse>> {
    let messages = state
        .chat
        .get_history(&user_id, ThreadSelector::FormSpecific(record_id))
        .await?;

    Ok(Json(HistoryResponse {
        messages: messages.into_iter().map(message_to_response).collect(),
    }))
}

/// Clear a record-bound thread's history
#[utoipa::path(
    delete,
    path = "/records/{record_id}/chat/history",
    params(("record_id" = String, Path, description = "Health record id")),
    responses(
        (status = 204, description = "History cleared"),
        (status = 404, description = "Thread was never created")
    ),
    tag = "chat"
)]
pub async fn clear_record_history(
    State(state): State<Arc<AppState>>,
    AuthedUser(user_id): AuthedUser,
    Path(record_id): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .chat
        .clear_history(&user_id, ThreadSelector::FormSpecific(record_id))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
