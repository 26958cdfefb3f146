//! Route definitions for the Open Floor endpoint.

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::cors::{apply_cors, CorsPolicy};
use super::handler;
use crate::agent::ParrotAgent;

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Create the full app router around one agent.
pub fn create_app_router(agent: Arc<ParrotAgent>, allowed_origin: &str) -> Router {
    Router::new()
        .route(
            "/",
            post(handler::openfloor_message).options(handler::preflight),
        )
        .route("/health", get(health_check))
        .with_state(agent)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(middleware::from_fn_with_state(
            CorsPolicy::new(allowed_origin),
            apply_cors,
        ))
        .layer(TraceLayer::new_for_http())
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
