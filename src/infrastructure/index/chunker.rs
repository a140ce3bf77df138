//! Fixed-size document chunking with overlap

use crate::domain::DomainError;

/// Splits document text into overlapping fixed-size chunks.
///
/// Sizes are character budgets; chunks break on whitespace so words are
/// never cut, and consecutive chunks share roughly `chunk_overlap`
/// characters of trailing context.
#[derive(Debug, Clone)]
pub struct TextChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextChunker {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self, DomainError> {
        if chunk_size == 0 {
            return Err(DomainError::configuration("chunk_size must be positive"));
        }
        if chunk_overlap >= chunk_size {
            return Err(DomainError::configuration(format!(
                "chunk_overlap ({chunk_overlap}) must be smaller than chunk_size ({chunk_size})"
            )));
        }

        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    pub fn chunk(&self, text: &str) -> Vec<String> {
        let text = text.trim();
        if text.is_empty() {
            return Vec::new();
        }

        let words: Vec<&str> = text.split_whitespace().collect();
        let mut chunks = Vec::new();
        let mut start = 0;

        while start < words.len() {
            let mut length = 0;
            let mut end = start;

            while end < words.len() {
                let word_length = words[end].chars().count();
                let separator = usize::from(end > start);

                if length + separator + word_length > self.chunk_size && end > start {
                    break;
                }

                length += separator + word_length;
                end += 1;
            }

            chunks.push(words[start..end].join(" "));

            if end >= words.len() {
                break;
            }

            // walk back to reuse trailing words as overlap context
            let mut next_start = end;
            let mut overlap_length = 0;

            while next_start > start + 1 {
                let word_length = words[next_start - 1].chars().count() + 1;
                if overlap_length + word_length > self.chunk_overlap {
                    break;
                }
                overlap_length += word_length;
                next_start -= 1;
            }

            start = next_start.max(start + 1);
        }

        chunks
    }
}
