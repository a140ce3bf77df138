//! Comparison fan-out endpoint

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::Stream;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_stream::{wrappers::ReceiverStream, StreamExt};
use tracing::info;

use crate::api::error::ApiError;
use crate::api::state::{AppState, UnknownModelId};
use crate::domain::{Chatbot, ComparisonOrchestrator, ModelOutcome, TurnEvent};

#[derive(Debug, Deserialize)]
pub struct CompareRequest {
    pub query: String,
    /// Subset of configured architecture ids to compare; all of them when
    /// absent
    #[serde(default)]
    pub model_ids: Option<Vec<String>>,
}

/// One frame of the comparison event stream
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum StreamPayload {
    Turn(TurnEvent),
    Summary {
        kind: &'static str,
        outcomes: Vec<ModelOutcome>,
    },
    Error {
        kind: &'static str,
        error: String,
    },
}

impl StreamPayload {
    fn summary(outcomes: Vec<ModelOutcome>) -> Self {
        Self::Summary {
            kind: "summary",
            outcomes,
        }
    }

    fn error(error: impl Into<String>) -> Self {
        Self::Error {
            kind: "error",
            error: error.into(),
        }
    }

    fn into_event(self) -> Event {
        let name = match &self {
            Self::Turn(TurnEvent::Delta { .. }) => "delta",
            Self::Turn(TurnEvent::Completed { .. }) => "completed",
            Self::Turn(TurnEvent::Failed { .. }) => "failed",
            Self::Summary { .. } => "summary",
            Self::Error { .. } => "error",
        };

        let data = serde_json::to_string(&self).unwrap_or_default();
        Event::default().event(name).data(data)
    }
}

/// POST /v1/compare
///
/// Fans the query out to the selected architectures and streams each
/// model's progress as server-sent events: `delta` frames while tokens
/// arrive, a terminal `completed` or `failed` frame per slot, and one
/// `summary` frame with every outcome in configuration order.
pub async fn compare(
    State(state): State<AppState>,
    Json(request): Json<CompareRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let query = request.query.trim().to_string();
    if query.is_empty() {
        return Err(ApiError::bad_request("query cannot be empty"));
    }

    let models = state
        .select_models(request.model_ids.as_deref())
        .map_err(|UnknownModelId(id)| ApiError::bad_request(format!("unknown model id '{id}'")))?;

    info!(models = models.len(), "starting comparison");

    let chatbot = Arc::new(Chatbot::new(
        Arc::clone(&state.session),
        Arc::clone(&state.reranker),
        state.settings.rerank_top_n,
    ));
    let orchestrator = ComparisonOrchestrator::new(
        chatbot,
        Arc::clone(&state.client_factory),
        models,
        state.settings.turn_timeout,
    );

    let (sse_tx, sse_rx) = mpsc::channel::<StreamPayload>(256);

    tokio::spawn(async move {
        let (turn_tx, mut turn_rx) = mpsc::channel::<TurnEvent>(256);

        let runner =
            tokio::spawn(async move { orchestrator.compare(&query, turn_tx).await });

        while let Some(event) = turn_rx.recv().await {
            if sse_tx.send(StreamPayload::Turn(event)).await.is_err() {
                // client went away; let the runner finish on its own
                return;
            }
        }

        let payload = match runner.await {
            Ok(Ok(outcomes)) => StreamPayload::summary(outcomes),
            Ok(Err(error)) => StreamPayload::error(error.to_string()),
            Err(_) => StreamPayload::error("comparison aborted unexpectedly"),
        };
        let _ = sse_tx.send(payload).await;
    });

    let stream =
        ReceiverStream::new(sse_rx).map(|payload| Ok::<_, Infallible>(payload.into_event()));

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
