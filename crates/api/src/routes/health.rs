//! Health check endpoints.

use axum::{Json, Router, routing::get};
use serde::Serialize;

use crate::AppState;

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: &'static str,
    /// Service version.
    pub version: &'static str,
}

/// Health check handler.
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn banner() -> &'static str {
    "Picpost API is running"
}

/// Creates health check routes mounted under `/api`.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

/// Creates the liveness banner served at the root path.
pub fn root_routes() -> Router<AppState> {
    Router::new().route("/", get(banner))
}
