//! Session inspection and reset endpoints

use axum::{extract::State, Json};
use serde::Serialize;
use tracing::info;

use crate::api::state::AppState;
use crate::domain::llm::Message;

#[derive(Serialize)]
pub struct SessionResponse {
    pub turns: Vec<Message>,
    pub document_indexed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_name: Option<String>,
}

#[derive(Serialize)]
pub struct ResetResponse {
    pub status: &'static str,
}

/// GET /v1/session
pub async fn get_session(State(state): State<AppState>) -> Json<SessionResponse> {
    let snapshot = state.session.history().snapshot().await;

    Json(SessionResponse {
        turns: snapshot.turns,
        document_indexed: state.session.has_document().await,
        index_name: state.session.index_name().await,
    })
}

/// POST /v1/reset
///
/// Clears the conversation. Streams dispatched before the reset keep
/// running but their commits are discarded by the history epoch guard.
pub async fn reset_session(State(state): State<AppState>) -> Json<ResetResponse> {
    state.session.reset().await;
    info!("session reset");

    Json(ResetResponse { status: "reset" })
}
