//! Document upload and indexing endpoint

use std::sync::Arc;

use axum::{body::Bytes, extract::State, Json};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::state::AppState;

#[derive(Serialize)]
pub struct UploadResponse {
    pub index_name: String,
    pub chunks: usize,
}

/// POST /v1/documents
///
/// Accepts the raw document text, builds a fresh index over it, and
/// attaches the resulting retriever to the session. Text extraction from
/// binary formats happens before this service is called.
pub async fn upload_document(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<UploadResponse>, ApiError> {
    if body.is_empty() {
        return Err(ApiError::bad_request("document body is empty"));
    }

    let index_name = format!("doc-{}", Uuid::new_v4().simple());
    let built = state.indexer.build_index(&body, &index_name).await?;

    state
        .session
        .attach_retriever(built.name.clone(), Arc::clone(&built.retriever))
        .await;

    info!(index = %built.name, chunks = built.chunks, "document indexed");

    Ok(Json(UploadResponse {
        index_name: built.name,
        chunks: built.chunks,
    }))
}
