use std::fmt::Debug;

use async_trait::async_trait;

use super::Passage;
use crate::domain::DomainError;

/// Capability that reorders retrieved passages by relevance to the query.
///
/// The result is an ordered subsequence of the input of length at most
/// `top_n`; rerankers never introduce passages of their own.
#[async_trait]
pub trait Reranker: Send + Sync + Debug {
    async fn rerank(
        &self,
        query: &str,
        passages: Vec<Passage>,
        top_n: usize,
    ) -> Result<Vec<Passage>, DomainError>;

    /// Get the reranker name
    fn reranker_name(&self) -> &'static str;
}
