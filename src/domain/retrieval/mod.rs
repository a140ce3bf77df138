//! Retrieval capabilities consumed by the comparison pipeline

mod passage;
mod reranker;
mod retriever;

pub use passage::Passage;
pub use reranker::Reranker;
pub use retriever::{BuiltIndex, DocumentIndexer, PassageRetriever};

#[cfg(test)]
pub use reranker::mock::MockReranker;
#[cfg(test)]
pub use retriever::mock::MockRetriever;
