//! OpenAI-compatible backend client for instruct-tuned endpoints

use async_trait::async_trait;
use futures::StreamExt;
use serde::Deserialize;

use super::split_lines;
use crate::domain::llm::{ModelClient, TokenStream};
use crate::domain::DomainError;
use crate::infrastructure::http_client::HttpClientTrait;

// The wire format requires a bearer token even on endpoints that never
// check it, and client stacks reject an empty one.
const PLACEHOLDER_API_KEY: &str = "dummy";

/// Client for an OpenAI-compatible `/v1/chat/completions` endpoint.
///
/// The configured endpoint is used as the API base; deltas arrive as
/// server-sent events terminated by a `[DONE]` sentinel.
#[derive(Debug)]
pub struct OpenAiCompatClient<C: HttpClientTrait> {
    client: C,
    auth_header: String,
    base_url: String,
    model: String,
}

impl<C: HttpClientTrait> OpenAiCompatClient<C> {
    pub fn new(client: C, base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client,
            auth_header: format!("Bearer {PLACEHOLDER_API_KEY}"),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        }
    }

    fn chat_completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }
}

#[async_trait]
impl<C: HttpClientTrait> ModelClient for OpenAiCompatClient<C> {
    async fn stream(&self, prompt: &str) -> Result<TokenStream, DomainError> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [{"role": "user", "content": prompt}],
            "stream": true,
        });

        let byte_stream = self
            .client
            .post_json_stream(
                &self.chat_completions_url(),
                vec![
                    ("Authorization", self.auth_header.as_str()),
                    ("Content-Type", "application/json"),
                ],
                &body,
            )
            .await?;

        let stream = split_lines(byte_stream).filter_map(|line| async move {
            match line {
                Ok(line) => parse_sse_line(&line),
                Err(error) => Some(Err(error)),
            }
        });

        Ok(Box::pin(stream))
    }

    fn backend_name(&self) -> &'static str {
        "instruct"
    }
}

fn parse_sse_line(line: &str) -> Option<Result<String, DomainError>> {
    let data = line.strip_prefix("data:")?.trim_start();
    if data.is_empty() || data == "[DONE]" {
        return None;
    }

    match serde_json::from_str::<ChatStreamChunk>(data) {
        Ok(chunk) => {
            let delta = chunk
                .choices
                .into_iter()
                .next()
                .and_then(|choice| choice.delta.content)?;

            if delta.is_empty() {
                return None;
            }
            Some(Ok(delta))
        }
        Err(e) => Some(Err(DomainError::generation(
            "instruct",
            format!("invalid stream chunk: {e}"),
        ))),
    }
}

#[derive(Debug, Deserialize)]
struct ChatStreamChunk {
    choices: Vec<ChatStreamChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatStreamChoice {
    delta: ChatDelta,
}

#[derive(Debug, Deserialize)]
struct ChatDelta {
    #[serde(default)]
    content: Option<String>,
}
