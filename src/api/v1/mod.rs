//! Comparison API

pub mod compare;
pub mod documents;
pub mod models;
pub mod session;

use axum::routing::{get, post};
use axum::Router;

use super::state::AppState;

pub fn create_v1_router() -> Router<AppState> {
    Router::new()
        .route("/models", get(models::list_models))
        .route("/documents", post(documents::upload_document))
        .route("/compare", post(compare::compare))
        .route("/session", get(session::get_session))
        .route("/reset", post(session::reset_session))
}
