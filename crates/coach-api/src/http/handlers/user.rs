//! User endpoints.
//!
//! - POST /api/v1/users            - Create a user and its coaching state
//! - GET  /api/v1/users/{id}/state - Current coaching state
//! - POST /api/v1/users/{id}/skipped-categories - Skip an identity category

use std::time::Instant;

use axum::Json;
use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};

use coach_types::coach::CoachState;
use coach_types::user::User;

use super::parse_user_id;
use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub display_name: String,
}

#[derive(Debug, Deserialize)]
pub struct SkipCategoryRequest {
    pub category: String,
}

#[derive(Debug, Serialize)]
pub struct CreatedUser {
    pub user: User,
    pub state: CoachState,
}

/// POST /api/v1/users
pub async fn create_user(
    State(state): State<AppState>,
    Json(body): Json<CreateUserRequest>,
) -> Result<Json<ApiResponse<CreatedUser>>, AppError> {
    let start = Instant::now();
    let (user, coach_state) = state.user_service.create_user(&body.display_name).await?;

    let base = format!("/api/v1/users/{}", user.id);
    let resp = ApiResponse::success(
        CreatedUser {
            user,
            state: coach_state,
        },
        start,
    )
    .with_link("state", &format!("{base}/state"))
    .with_link("messages", &format!("{base}/messages"));

    Ok(Json(resp))
}

/// GET /api/v1/users/{id}/state
pub async fn get_state(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<CoachState>>, AppError> {
    let start = Instant::now();
    let user_id = parse_user_id(&id)?;
    let coach_state = state.coach_service.get_state(user_id).await?;

    Ok(Json(
        ApiResponse::success(coach_state, start)
            .with_link("self", &format!("/api/v1/users/{user_id}/state")),
    ))
}

/// POST /api/v1/users/{id}/skipped-categories
pub async fn skip_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<SkipCategoryRequest>,
) -> Result<Json<ApiResponse<CoachState>>, AppError> {
    let start = Instant::now();
    let user_id = parse_user_id(&id)?;
    let coach_state = state
        .coach_service
        .skip_category(user_id, &body.category)
        .await?;

    Ok(Json(
        ApiResponse::success(coach_state, start)
            .with_link("state", &format!("/api/v1/users/{user_id}/state")),
    ))
}
