use serde::{Deserialize, Serialize};

/// A document chunk returned by the retriever.
///
/// Normalized once at the retriever boundary; downstream code never inspects
/// backend-specific result shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passage {
    /// Chunk text
    pub text: String,
    /// Similarity score assigned by the index, higher is more relevant
    pub score: f32,
    /// Source reference, when the backend tracks one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl Passage {
    pub fn new(text: impl Into<String>, score: f32) -> Self {
        Self {
            text: text.into(),
            score,
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}
