//! Chat and note endpoints.
//!
//! - POST /api/v1/users/{id}/messages - Run one coach turn
//! - GET  /api/v1/users/{id}/messages - Chat history, oldest first
//! - GET  /api/v1/users/{id}/notes    - Notes recorded about the user

use std::time::Instant;

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;

use coach_core::service::CoachReply;
use coach_types::chat::ChatMessage;
use coach_types::note::UserNote;

use super::parse_user_id;
use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub text: String,
}

/// Query parameters for message listing.
#[derive(Debug, Deserialize)]
pub struct MessageListQuery {
    /// Most recent N messages; all when absent.
    pub limit: Option<i64>,
}

/// POST /api/v1/users/{id}/messages
pub async fn send_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<SendMessageRequest>,
) -> Result<Json<ApiResponse<CoachReply>>, AppError> {
    let start = Instant::now();
    let user_id = parse_user_id(&id)?;
    let reply = state
        .coach_service
        .handle_user_message(user_id, &body.text)
        .await?;

    Ok(Json(
        ApiResponse::success(reply, start)
            .with_link("state", &format!("/api/v1/users/{user_id}/state")),
    ))
}

/// GET /api/v1/users/{id}/messages
pub async fn list_messages(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<MessageListQuery>,
) -> Result<Json<ApiResponse<Vec<ChatMessage>>>, AppError> {
    let start = Instant::now();
    let user_id = parse_user_id(&id)?;
    if query.limit.is_some_and(|l| l < 1) {
        return Err(AppError::Validation("limit must be at least 1".to_string()));
    }
    let messages = state
        .coach_service
        .list_messages(user_id, query.limit)
        .await?;

    Ok(Json(ApiResponse::success(messages, start)))
}

/// GET /api/v1/users/{id}/notes
pub async fn list_notes(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Vec<UserNote>>>, AppError> {
    let start = Instant::now();
    let user_id = parse_user_id(&id)?;
    let notes = state.coach_service.list_notes(user_id).await?;

    Ok(Json(ApiResponse::success(notes, start)))
}
