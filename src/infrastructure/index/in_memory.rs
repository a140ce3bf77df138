//! In-memory passage index for development and testing

use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;
use unicode_segmentation::UnicodeSegmentation;

use super::TextChunker;
use crate::domain::retrieval::{BuiltIndex, DocumentIndexer, Passage, PassageRetriever};
use crate::domain::DomainError;

/// Builds in-process keyword indexes, one per uploaded document
#[derive(Debug, Clone)]
pub struct InMemoryIndexer {
    chunker: TextChunker,
    top_k: usize,
}

impl InMemoryIndexer {
    pub fn new(chunker: TextChunker, top_k: usize) -> Self {
        Self { chunker, top_k }
    }
}

#[async_trait]
impl DocumentIndexer for InMemoryIndexer {
    async fn build_index(
        &self,
        document: &[u8],
        index_name: &str,
    ) -> Result<BuiltIndex, DomainError> {
        let text = std::str::from_utf8(document)
            .map_err(|_| DomainError::upload("document is not valid UTF-8 text"))?;

        let chunks = self.chunker.chunk(text);
        if chunks.is_empty() {
            return Err(DomainError::upload("document contained no indexable text"));
        }

        info!(index = index_name, chunks = chunks.len(), "built in-memory index");

        Ok(BuiltIndex {
            name: index_name.to_string(),
            chunks: chunks.len(),
            retriever: Arc::new(InMemoryRetriever {
                index_name: index_name.to_string(),
                chunks,
                top_k: self.top_k,
            }),
        })
    }

    fn indexer_name(&self) -> &'static str {
        "in_memory"
    }
}

/// Keyword-overlap retriever over the chunks of one document
#[derive(Debug)]
pub struct InMemoryRetriever {
    index_name: String,
    chunks: Vec<String>,
    top_k: usize,
}

#[async_trait]
impl PassageRetriever for InMemoryRetriever {
    async fn retrieve(&self, query: &str) -> Result<Vec<Passage>, DomainError> {
        let query_terms = term_set(query);
        if query_terms.is_empty() {
            return Ok(Vec::new());
        }

        let mut scored: Vec<Passage> = self
            .chunks
            .iter()
            .filter_map(|chunk| {
                let chunk_terms = term_set(chunk);
                let matched = query_terms.intersection(&chunk_terms).count();

                if matched == 0 {
                    return None;
                }

                let score = matched as f32 / query_terms.len() as f32;
                Some(Passage::new(chunk.clone(), score).with_source(&self.index_name))
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        scored.truncate(self.top_k);

        Ok(scored)
    }

    fn retriever_name(&self) -> &'static str {
        "in_memory"
    }
}

fn term_set(text: &str) -> HashSet<String> {
    text.unicode_words().map(|word| word.to_lowercase()).collect()
}
