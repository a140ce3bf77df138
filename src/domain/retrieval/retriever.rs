use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;

use super::Passage;
use crate::domain::DomainError;

/// Capability wrapping a document index: given a query, return the top-k
/// passages in relevance order.
///
/// An empty result is a valid answer, not an error; implementations only
/// fail for hard backend problems (index unreachable, malformed reply).
#[async_trait]
pub trait PassageRetriever: Send + Sync + Debug {
    async fn retrieve(&self, query: &str) -> Result<Vec<Passage>, DomainError>;

    /// Get the retriever backend name
    fn retriever_name(&self) -> &'static str;
}

/// An index freshly built from one uploaded document
#[derive(Debug, Clone)]
pub struct BuiltIndex {
    /// Index name, unique per upload
    pub name: String,
    /// Number of chunks stored
    pub chunks: usize,
    /// Retriever bound to the new index
    pub retriever: Arc<dyn PassageRetriever>,
}

/// Capability that turns one uploaded document into a retrievable index
#[async_trait]
pub trait DocumentIndexer: Send + Sync + Debug {
    /// Build an index over the raw document bytes and return a retriever
    /// bound to it. One index per uploaded document per session.
    async fn build_index(&self, document: &[u8], index_name: &str)
        -> Result<BuiltIndex, DomainError>;

    /// Get the indexer backend name
    fn indexer_name(&self) -> &'static str;
}
