//! Hosted-inference backend client for text-generation-inference endpoints

use async_trait::async_trait;
use futures::StreamExt;
use serde::Deserialize;

use super::split_lines;
use crate::domain::llm::{ModelClient, TokenStream};
use crate::domain::model::GenerationParams;
use crate::domain::DomainError;
use crate::infrastructure::http_client::HttpClientTrait;

/// Client for a text-generation-inference `/generate_stream` endpoint.
///
/// Token events arrive as server-sent events; special tokens are filtered
/// out so only visible text reaches the output slot.
#[derive(Debug)]
pub struct TgiClient<C: HttpClientTrait> {
    client: C,
    endpoint: String,
    params: GenerationParams,
}

impl<C: HttpClientTrait> TgiClient<C> {
    pub fn new(client: C, endpoint: impl Into<String>, params: GenerationParams) -> Self {
        Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            params,
        }
    }

    fn generate_stream_url(&self) -> String {
        format!("{}/generate_stream", self.endpoint)
    }
}

#[async_trait]
impl<C: HttpClientTrait> ModelClient for TgiClient<C> {
    async fn stream(&self, prompt: &str) -> Result<TokenStream, DomainError> {
        let body = serde_json::json!({
            "inputs": prompt,
            "parameters": {
                "max_new_tokens": self.params.max_new_tokens,
                "top_k": self.params.top_k,
                "top_p": self.params.top_p,
                "typical_p": self.params.typical_p,
                "temperature": self.params.temperature,
                "repetition_penalty": self.params.repetition_penalty,
            },
        });

        let byte_stream = self
            .client
            .post_json_stream(
                &self.generate_stream_url(),
                vec![("Content-Type", "application/json")],
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
        "hf"
    }
}

fn parse_sse_line(line: &str) -> Option<Result<String, DomainError>> {
    let data = line.strip_prefix("data:")?.trim_start();
    if data.is_empty() {
        return None;
    }

    match serde_json::from_str::<StreamEvent>(data) {
        Ok(event) => {
            if let Some(error) = event.error {
                return Some(Err(DomainError::generation("hf", error)));
            }

            let token = event.token?;
            if token.special || token.text.is_empty() {
                return None;
            }
            Some(Ok(token.text))
        }
        Err(e) => Some(Err(DomainError::generation(
            "hf",
            format!("invalid stream event: {e}"),
        ))),
    }
}

#[derive(Debug, Deserialize)]
struct StreamEvent {
    #[serde(default)]
    token: Option<TokenEvent>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenEvent {
    text: String,
    #[serde(default)]
    special: bool,
}
