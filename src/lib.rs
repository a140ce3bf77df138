//! RAG Arena
//!
//! Side-by-side comparison of LLM architectures over a shared document:
//! - One uploaded document, indexed once per session
//! - One query fanned out to every configured architecture
//! - Optional retrieval and reranking per architecture
//! - Streaming responses routed to per-model output slots

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use tracing::info;

use api::{AppState, ComparisonSettings};
use config::IndexBackend;
use domain::retrieval::DocumentIndexer;
use domain::SessionContext;
use infrastructure::index::{InMemoryIndexer, RedisIndexer, TextChunker};
use infrastructure::llm::BackendClientFactory;
use infrastructure::rerank::OverlapReranker;

/// Create the application state with all capabilities wired up
pub async fn create_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let architectures = config.model_configs()?;
    let chunker = TextChunker::new(config.comparison.chunk_size, config.comparison.chunk_overlap)?;

    let indexer: Arc<dyn DocumentIndexer> = match config.index.backend {
        IndexBackend::InMemory => Arc::new(InMemoryIndexer::new(
            chunker,
            config.comparison.retrieval_top_k,
        )),
        IndexBackend::Redis => Arc::new(
            RedisIndexer::connect(
                &config.redis.connection_url(),
                chunker,
                config.comparison.retrieval_top_k,
            )
            .await?,
        ),
    };

    info!(
        backend = indexer.indexer_name(),
        architectures = architectures.len(),
        "application state ready"
    );

    Ok(AppState {
        architectures: Arc::new(architectures),
        session: Arc::new(SessionContext::new()),
        indexer,
        reranker: Arc::new(OverlapReranker::new()),
        client_factory: Arc::new(BackendClientFactory::new()),
        settings: ComparisonSettings {
            rerank_top_n: config.comparison.rerank_top_n,
            turn_timeout: config.comparison.turn_timeout(),
        },
    })
}
