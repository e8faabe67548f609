//! HTTP route handlers for the auth API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Health check
//! POST /api/auth               - Register or log in ({"action": "register"|"login", ...})
//! ```
//!
//! Any other method on `/api/auth` answers 405 with a JSON error body.

pub mod auth;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::error::ApiError;
use crate::state::AppState;

/// Create the `/api` routes router.
pub fn api_routes() -> Router<AppState> {
    Router::new().route("/auth", post(auth::auth).fallback(method_not_allowed))
}

/// Create all routes for the auth API, bound to `state`.
///
/// Rate limiting and Sentry layers are added by the binary so that tests
/// can drive the router directly.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api", api_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running.
pub async fn health() -> &'static str {
    "ok"
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
