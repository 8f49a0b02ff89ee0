//! GET /api/v1/health - liveness plus a database round trip.

use std::time::Instant;

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::http::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub version: &'static str,
    pub database: bool,
}

pub async fn health_check(State(state): State<AppState>) -> Json<ApiResponse<Health>> {
    let start = Instant::now();
    let database = state.db_pool.ping().await;
    if !database {
        tracing::warn!("health check: database unreachable");
    }

    Json(ApiResponse::success(
        Health {
            status: if database { "ok" } else { "degraded" },
            version: env!("CARGO_PKG_VERSION"),
            database,
        },
        start,
    ))
}
