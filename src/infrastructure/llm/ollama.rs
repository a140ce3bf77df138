//! Local-serving backend client for an Ollama daemon

use async_trait::async_trait;
use futures::StreamExt;
use serde::Deserialize;

use super::split_lines;
use crate::domain::llm::{ModelClient, TokenStream};
use crate::domain::DomainError;
use crate::infrastructure::http_client::HttpClientTrait;

/// Client for Ollama's `/api/generate` endpoint.
///
/// Responses stream as newline-delimited JSON objects, one token batch per
/// line, with a terminal `done` object carrying an empty response.
#[derive(Debug)]
pub struct OllamaClient<C: HttpClientTrait> {
    client: C,
    endpoint: String,
    model: String,
}

impl<C: HttpClientTrait> OllamaClient<C> {
    pub fn new(client: C, endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
        }
    }

    fn generate_url(&self) -> String {
        format!("{}/api/generate", self.endpoint)
    }
}

#[async_trait]
impl<C: HttpClientTrait> ModelClient for OllamaClient<C> {
    async fn stream(&self, prompt: &str) -> Result<TokenStream, DomainError> {
        let body = serde_json::json!({
            "model": self.model,
            "prompt": prompt,
            "stream": true,
        });

        let byte_stream = self
            .client
            .post_json_stream(
                &self.generate_url(),
                vec![("Content-Type", "application/json")],
                &body,
            )
            .await?;

        let stream = split_lines(byte_stream).filter_map(|line| async move {
            match line {
                Ok(line) => parse_generate_line(&line),
                Err(error) => Some(Err(error)),
            }
        });

        Ok(Box::pin(stream))
    }

    fn backend_name(&self) -> &'static str {
        "ollama"
    }
}

fn parse_generate_line(line: &str) -> Option<Result<String, DomainError>> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    match serde_json::from_str::<GenerateChunk>(line) {
        Ok(chunk) => {
            if let Some(error) = chunk.error {
                return Some(Err(DomainError::generation("ollama", error)));
            }
            if chunk.response.is_empty() {
                return None;
            }
            Some(Ok(chunk.response))
        }
        Err(e) => Some(Err(DomainError::generation(
            "ollama",
            format!("invalid stream chunk: {e}"),
        ))),
    }
}

#[derive(Debug, Deserialize)]
struct GenerateChunk {
    #[serde(default)]
    response: String,
    #[serde(default)]
    error: Option<String>,
}
