//! POST /api/v1/users/{id}/sentinel - run note extraction immediately.
//!
//! Extraction never fails from the caller's point of view: problems come
//! back as a `skipped` outcome with a reason.

use std::time::Instant;

use axum::Json;
use axum::extract::{Path, State};

use coach_core::sentinel::SentinelOutcome;

use super::parse_user_id;
use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

pub async fn run_extraction(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<SentinelOutcome>>, AppError> {
    let start = Instant::now();
    let user_id = parse_user_id(&id)?;
    let outcome = state.coach_service.run_sentinel_extraction(user_id).await?;

    Ok(Json(
        ApiResponse::success(outcome, start)
            .with_link("notes", &format!("/api/v1/users/{user_id}/notes")),
    ))
}
