//! Lexical reranking of retrieved passages

use std::cmp::Ordering;
use std::collections::HashSet;

use async_trait::async_trait;
use unicode_segmentation::UnicodeSegmentation;

use crate::domain::retrieval::{Passage, Reranker};
use crate::domain::DomainError;

/// Reranker scoring passages by term overlap with the query.
///
/// Stable: passages with equal overlap keep their retrieval order. The
/// output is always a subsequence of the input, bounded by `top_n`.
#[derive(Debug, Clone, Default)]
pub struct OverlapReranker;

impl OverlapReranker {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Reranker for OverlapReranker {
    async fn rerank(
        &self,
        query: &str,
        passages: Vec<Passage>,
        top_n: usize,
    ) -> Result<Vec<Passage>, DomainError> {
        let query_terms = term_set(query);

        if query_terms.is_empty() {
            let mut unchanged = passages;
            unchanged.truncate(top_n);
            return Ok(unchanged);
        }

        let mut scored: Vec<(f32, Passage)> = passages
            .into_iter()
            .map(|passage| {
                let passage_terms = term_set(&passage.text);
                let matched = query_terms.intersection(&passage_terms).count();
                (matched as f32 / query_terms.len() as f32, passage)
            })
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));

        Ok(scored
            .into_iter()
            .take(top_n)
            .map(|(_, passage)| passage)
            .collect())
    }

    fn reranker_name(&self) -> &'static str {
        "overlap"
    }
}

fn term_set(text: &str) -> HashSet<String> {
    text.unicode_words().map(|word| word.to_lowercase()).collect()
}
