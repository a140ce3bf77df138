//! Application state for shared services

use std::sync::Arc;
use std::time::Duration;

use crate::domain::llm::ModelClientFactory;
use crate::domain::model::ModelConfig;
use crate::domain::retrieval::{DocumentIndexer, Reranker};
use crate::domain::SessionContext;

/// Pipeline tunables shared by every request
#[derive(Debug, Clone)]
pub struct ComparisonSettings {
    pub rerank_top_n: usize,
    pub turn_timeout: Duration,
}

/// Application state containing the session and the capabilities the
/// comparison pipeline consumes
#[derive(Clone)]
pub struct AppState {
    pub architectures: Arc<Vec<ModelConfig>>,
    pub session: Arc<SessionContext>,
    pub indexer: Arc<dyn DocumentIndexer>,
    pub reranker: Arc<dyn Reranker>,
    pub client_factory: Arc<dyn ModelClientFactory>,
    pub settings: ComparisonSettings,
}

impl AppState {
    /// Resolve the architectures taking part in a comparison.
    ///
    /// With no explicit selection every configured architecture runs, in
    /// configuration order. An unknown id is a caller error.
    pub fn select_models(
        &self,
        model_ids: Option<&[String]>,
    ) -> Result<Vec<ModelConfig>, UnknownModelId> {
        match model_ids {
            None => Ok(self.architectures.as_ref().clone()),
            Some(ids) => {
                let mut selected = Vec::with_capacity(ids.len());
                for id in ids {
                    let model = self
                        .architectures
                        .iter()
                        .find(|m| &m.id == id)
                        .ok_or_else(|| UnknownModelId(id.clone()))?;
                    selected.push(model.clone());
                }
                Ok(selected)
            }
        }
    }
}

/// A requested model id that matches no configured architecture
#[derive(Debug)]
pub struct UnknownModelId(pub String);
