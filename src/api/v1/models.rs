//! Configured architectures endpoint

use axum::{extract::State, Json};
use serde::Serialize;

use crate::api::state::AppState;
use crate::domain::model::ModelConfig;

#[derive(Serialize)]
pub struct ModelsResponse {
    pub models: Vec<ModelConfig>,
}

/// GET /v1/models
pub async fn list_models(State(state): State<AppState>) -> Json<ModelsResponse> {
    Json(ModelsResponse {
        models: state.architectures.as_ref().clone(),
    })
}
