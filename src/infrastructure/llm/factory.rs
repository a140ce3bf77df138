//! Backend dispatch for model client construction

use std::sync::Arc;

use tracing::debug;

use super::{OllamaClient, OpenAiCompatClient, TgiClient};
use crate::domain::llm::{ModelClient, ModelClientFactory};
use crate::domain::model::{ModelConfig, ModelType};
use crate::domain::DomainError;
use crate::infrastructure::http_client::HttpClient;

/// Builds streaming clients for configured architectures.
///
/// Dispatches on the architecture's backend type; configurations with an
/// unknown type never reach this point because the type enum rejects them
/// at load time. Construction performs no network calls.
#[derive(Debug, Default)]
pub struct BackendClientFactory {
    http: HttpClient,
}

impl BackendClientFactory {
    pub fn new() -> Self {
        Self {
            http: HttpClient::new(),
        }
    }
}

impl ModelClientFactory for BackendClientFactory {
    fn create(&self, config: &ModelConfig) -> Result<Arc<dyn ModelClient>, DomainError> {
        debug!(
            model_id = %config.id,
            backend = %config.model_type,
            endpoint = %config.endpoint,
            "creating model client"
        );

        match config.model_type {
            ModelType::Ollama => Ok(Arc::new(OllamaClient::new(
                self.http.clone(),
                config.endpoint.clone(),
                config.model_name.clone(),
            ))),
            ModelType::Hf => Ok(Arc::new(TgiClient::new(
                self.http.clone(),
                config.endpoint.clone(),
                config.generation.clone(),
            ))),
            ModelType::Instruct => Ok(Arc::new(OpenAiCompatClient::new(
                self.http.clone(),
                config.endpoint.clone(),
                config.model_name.clone(),
            ))),
        }
    }
}
