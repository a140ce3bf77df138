//! Health check endpoints

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use super::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: String,
}

#[derive(Serialize)]
pub struct ReadyResponse {
    pub status: &'static str,
    pub architectures: usize,
    pub document_indexed: bool,
}

/// Simple health check - returns 200 if the service is running
pub async fn health_check() -> impl IntoResponse {
    let response = HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    (StatusCode::OK, Json(response))
}

/// Liveness probe
pub async fn live_check() -> impl IntoResponse {
    StatusCode::OK
}

/// Readiness probe reporting whether a comparison can start
pub async fn ready_check(State(state): State<AppState>) -> impl IntoResponse {
    let response = ReadyResponse {
        status: "ready",
        architectures: state.architectures.len(),
        document_indexed: state.session.has_document().await,
    };

    (StatusCode::OK, Json(response))
}
