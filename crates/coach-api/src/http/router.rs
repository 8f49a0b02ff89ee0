//! Axum router configuration with middleware.
//!
//! All routes are under `/api/v1/`.
//! Middleware: CORS, tracing.

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/users", post(handlers::user::create_user))
        .route("/users/{id}/state", get(handlers::user::get_state))
        .route(
            "/users/{id}/skipped-categories",
            post(handlers::user::skip_category),
        )
        .route(
            "/users/{id}/messages",
            get(handlers::chat::list_messages).post(handlers::chat::send_message),
        )
        .route("/users/{id}/notes", get(handlers::chat::list_notes))
        .route("/users/{id}/sentinel", post(handlers::sentinel::run_extraction));

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
