use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::ConversationHistory;
use crate::domain::retrieval::PassageRetriever;

/// Session-scoped context shared by every component that reads or appends
/// conversation state.
///
/// Created when the service starts serving a session, passed explicitly to
/// the pipeline instead of living in ambient global state. `reset` clears
/// the conversation; the indexed document survives until a new upload
/// replaces it.
#[derive(Debug)]
pub struct SessionContext {
    history: Arc<ConversationHistory>,
    retriever: RwLock<Option<Arc<dyn PassageRetriever>>>,
    index_name: RwLock<Option<String>>,
    created_at: DateTime<Utc>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self {
            history: Arc::new(ConversationHistory::new()),
            retriever: RwLock::new(None),
            index_name: RwLock::new(None),
            created_at: Utc::now(),
        }
    }

    pub fn history(&self) -> Arc<ConversationHistory> {
        Arc::clone(&self.history)
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Attach the retriever for a freshly indexed document, replacing any
    /// previous document in this session.
    pub async fn attach_retriever(
        &self,
        index_name: impl Into<String>,
        retriever: Arc<dyn PassageRetriever>,
    ) {
        *self.retriever.write().await = Some(retriever);
        *self.index_name.write().await = Some(index_name.into());
    }

    pub async fn retriever(&self) -> Option<Arc<dyn PassageRetriever>> {
        self.retriever.read().await.clone()
    }

    pub async fn index_name(&self) -> Option<String> {
        self.index_name.read().await.clone()
    }

    pub async fn has_document(&self) -> bool {
        self.retriever.read().await.is_some()
    }

    /// Clear the conversation. In-flight streams dispatched before the
    /// reset will have their commits rejected by the history epoch guard.
    pub async fn reset(&self) {
        self.history.reset().await;
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}
