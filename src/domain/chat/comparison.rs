use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use super::{Chatbot, HistorySnapshot, TurnEvent};
use crate::domain::llm::ModelClientFactory;
use crate::domain::model::ModelConfig;
use crate::domain::DomainError;

/// One comparison dispatch: the query, the history snapshot every model
/// shares, and the participating architectures in slot order.
#[derive(Debug, Clone)]
pub struct ComparisonRun {
    pub query: String,
    pub snapshot: HistorySnapshot,
    pub models: Vec<ModelConfig>,
}

/// Outcome of one model's turn within a comparison
#[derive(Debug, Clone, Serialize)]
pub struct ModelOutcome {
    pub model_id: String,
    pub model_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ModelOutcome {
    fn success(config: &ModelConfig, response: String) -> Self {
        Self {
            model_id: config.id.clone(),
            model_name: config.name.clone(),
            response: Some(response),
            error: None,
        }
    }

    fn failure(config: &ModelConfig, error: impl Into<String>) -> Self {
        Self {
            model_id: config.id.clone(),
            model_name: config.name.clone(),
            response: None,
            error: Some(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.response.is_some()
    }
}

/// Fans one user query out to every configured model and collects one
/// outcome per model.
///
/// Turns run as independent tasks with independent timeouts; a failing or
/// hung backend is reported in its own slot and never blocks siblings.
/// All turns share the pre-turn history snapshot and only append their own
/// completed turn afterward.
#[derive(Debug)]
pub struct ComparisonOrchestrator {
    chatbot: Arc<Chatbot>,
    factory: Arc<dyn ModelClientFactory>,
    models: Vec<ModelConfig>,
    turn_timeout: Duration,
}

impl ComparisonOrchestrator {
    pub fn new(
        chatbot: Arc<Chatbot>,
        factory: Arc<dyn ModelClientFactory>,
        models: Vec<ModelConfig>,
        turn_timeout: Duration,
    ) -> Self {
        Self {
            chatbot,
            factory,
            models,
            turn_timeout,
        }
    }

    pub fn models(&self) -> &[ModelConfig] {
        &self.models
    }

    /// Run one comparison: append the user turn once, dispatch one turn per
    /// model, and return outcomes in configuration order.
    ///
    /// Per-model progress is streamed through `events`; terminal events for
    /// each slot are emitted as its turn resolves.
    pub async fn compare(
        &self,
        query: &str,
        events: mpsc::Sender<TurnEvent>,
    ) -> Result<Vec<ModelOutcome>, DomainError> {
        if self.models.is_empty() {
            return Err(DomainError::configuration(
                "no model architectures are configured for comparison",
            ));
        }

        let session = self.chatbot.session();
        if !session.has_document().await && self.models.iter().all(|m| m.uses_rag) {
            return Err(DomainError::upload(
                "every configured model requires RAG but no document has been indexed",
            ));
        }

        let snapshot = session.history().push_user(query).await;
        let run = ComparisonRun {
            query: query.to_string(),
            snapshot,
            models: self.models.clone(),
        };

        info!(models = run.models.len(), "dispatching comparison run");

        let mut handles = Vec::with_capacity(run.models.len());
        for config in run.models.iter().cloned() {
            let chatbot = Arc::clone(&self.chatbot);
            let factory = Arc::clone(&self.factory);
            let events = events.clone();
            let query = run.query.clone();
            let epoch = run.snapshot.epoch;
            let timeout = self.turn_timeout;

            handles.push(tokio::spawn(async move {
                let client = factory.create(&config)?;
                match tokio::time::timeout(
                    timeout,
                    chatbot.run_turn(&query, &config, client, epoch, events),
                )
                .await
                {
                    Ok(result) => result,
                    Err(_) => Err(DomainError::generation(
                        config.model_type.to_string(),
                        format!("no response within {}s", timeout.as_secs()),
                    )),
                }
            }));
        }

        let mut outcomes = Vec::with_capacity(run.models.len());
        for (config, handle) in run.models.iter().zip(handles) {
            let outcome = match handle.await {
                Ok(Ok(response)) => {
                    let _ = events
                        .send(TurnEvent::Completed {
                            model_id: config.id.clone(),
                            text: response.clone(),
                        })
                        .await;
                    ModelOutcome::success(config, response)
                }
                Ok(Err(turn_error)) => {
                    warn!(model_id = %config.id, error = %turn_error, "model turn failed");
                    let _ = events
                        .send(TurnEvent::Failed {
                            model_id: config.id.clone(),
                            error: turn_error.to_string(),
                        })
                        .await;
                    ModelOutcome::failure(config, turn_error.to_string())
                }
                Err(join_error) => {
                    error!(model_id = %config.id, error = %join_error, "model turn aborted");
                    let _ = events
                        .send(TurnEvent::Failed {
                            model_id: config.id.clone(),
                            error: "model turn aborted unexpectedly".to_string(),
                        })
                        .await;
                    ModelOutcome::failure(config, "model turn aborted unexpectedly")
                }
            };
            outcomes.push(outcome);
        }

        Ok(outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chat::SessionContext;
    use crate::domain::llm::{MockClientFactory, MockModelClient};
    use crate::domain::retrieval::{MockReranker, MockRetriever, Passage};
    use futures::stream;

    fn orchestrator_with(
        session: Arc<SessionContext>,
        factory: MockClientFactory,
        models: Vec<ModelConfig>,
    ) -> ComparisonOrchestrator {
        let chatbot = Arc::new(Chatbot::new(session, Arc::new(MockReranker::new()), 3));
        ComparisonOrchestrator::new(
            chatbot,
            Arc::new(factory),
            models,
            Duration::from_secs(5),
        )
    }

    async fn rag_session() -> Arc<SessionContext> {
        let session = Arc::new(SessionContext::new());
        let retriever = Arc::new(
            MockRetriever::new().with_passages(vec![Passage::new("indexed chunk", 0.9)]),
        );
        session.attach_retriever("doc-test", retriever).await;
        session
    }

    #[tokio::test]
    async fn test_one_outcome_per_model_in_input_order() {
        let session = rag_session().await;
        let models = vec![
            ModelConfig::new("a", "First", "http://localhost"),
            ModelConfig::new("b", "Second", "http://localhost").with_rag(true),
            ModelConfig::new("c", "Third", "http://localhost"),
        ];
        let factory = MockClientFactory::new()
            .with_client("a", MockModelClient::new("answer a"))
            .with_client("b", MockModelClient::new("answer b"))
            .with_client("c", MockModelClient::new("answer c"));

        let orchestrator = orchestrator_with(session, factory, models);
        let (tx, _rx) = mpsc::channel(256);
        let outcomes = orchestrator.compare("What is X?", tx).await.unwrap();

        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[0].model_id, "a");
        assert_eq!(outcomes[1].model_id, "b");
        assert_eq!(outcomes[2].model_id, "c");
        assert!(outcomes.iter().all(|o| o.is_success()));
    }

    #[tokio::test]
    async fn test_failure_is_isolated_to_its_slot() {
        let session = Arc::new(SessionContext::new());
        let models = vec![
            ModelConfig::new("a", "Broken", "http://localhost"),
            ModelConfig::new("b", "Healthy", "http://localhost"),
        ];
        let factory = MockClientFactory::new()
            .with_client("a", MockModelClient::new("x").with_error("backend down"))
            .with_client("b", MockModelClient::new("fine answer"));

        let orchestrator = orchestrator_with(Arc::clone(&session), factory, models);
        let (tx, _rx) = mpsc::channel(256);
        let outcomes = orchestrator.compare("query", tx).await.unwrap();

        assert!(!outcomes[0].is_success());
        assert!(outcomes[1].is_success());
        assert_eq!(outcomes[1].response.as_deref(), Some("fine answer"));

        // only the healthy model committed; history = user turn + one answer
        let turns = session.history().snapshot().await.turns;
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[1].text, "fine answer");
    }

    #[tokio::test]
    async fn test_client_construction_failure_is_per_slot() {
        let session = Arc::new(SessionContext::new());
        let models = vec![
            ModelConfig::new("a", "Unbuildable", "http://localhost"),
            ModelConfig::new("b", "Fine", "http://localhost"),
        ];
        let factory = MockClientFactory::new()
            .with_construction_failure("a")
            .with_client("b", MockModelClient::new("ok"));

        let orchestrator = orchestrator_with(session, factory, models);
        let (tx, _rx) = mpsc::channel(256);
        let outcomes = orchestrator.compare("query", tx).await.unwrap();

        assert!(!outcomes[0].is_success());
        assert!(outcomes[1].is_success());
    }

    #[tokio::test]
    async fn test_empty_model_list_is_a_configuration_error() {
        let session = Arc::new(SessionContext::new());
        let orchestrator =
            orchestrator_with(session, MockClientFactory::new(), Vec::new());
        let (tx, _rx) = mpsc::channel(256);

        let result = orchestrator.compare("query", tx).await;
        assert!(matches!(
            result,
            Err(DomainError::Configuration { .. })
        ));
    }

    #[tokio::test]
    async fn test_all_rag_models_without_document_aborts_before_dispatch() {
        let session = Arc::new(SessionContext::new());
        let models = vec![
            ModelConfig::new("a", "Rag", "http://localhost").with_rag(true),
            ModelConfig::new("b", "AlsoRag", "http://localhost").with_rag(true),
        ];
        let factory = MockClientFactory::new()
            .with_client("a", MockModelClient::new("x"))
            .with_client("b", MockModelClient::new("y"));

        let orchestrator = orchestrator_with(Arc::clone(&session), factory, models);
        let (tx, _rx) = mpsc::channel(256);

        let result = orchestrator.compare("query", tx).await;
        assert!(matches!(result, Err(DomainError::Upload { .. })));
        // comparison never started, so no user turn was appended
        assert!(session.history().is_empty().await);
    }

    #[tokio::test]
    async fn test_hung_backend_times_out_without_stalling_siblings() {
        #[derive(Debug)]
        struct HungClient;

        #[async_trait::async_trait]
        impl crate::domain::llm::ModelClient for HungClient {
            async fn stream(
                &self,
                _prompt: &str,
            ) -> Result<crate::domain::llm::TokenStream, DomainError> {
                Ok(Box::pin(stream::pending()))
            }

            fn backend_name(&self) -> &'static str {
                "hung"
            }
        }

        #[derive(Debug)]
        struct MixedFactory;

        impl ModelClientFactory for MixedFactory {
            fn create(
                &self,
                config: &ModelConfig,
            ) -> Result<Arc<dyn crate::domain::llm::ModelClient>, DomainError> {
                if config.id == "hung" {
                    Ok(Arc::new(HungClient))
                } else {
                    Ok(Arc::new(MockModelClient::new("quick answer")))
                }
            }
        }

        let session = Arc::new(SessionContext::new());
        let chatbot = Arc::new(Chatbot::new(
            Arc::clone(&session),
            Arc::new(MockReranker::new()),
            3,
        ));
        let orchestrator = ComparisonOrchestrator::new(
            chatbot,
            Arc::new(MixedFactory),
            vec![
                ModelConfig::new("hung", "Hung", "http://localhost"),
                ModelConfig::new("quick", "Quick", "http://localhost"),
            ],
            Duration::from_millis(100),
        );

        let (tx, _rx) = mpsc::channel(256);
        let outcomes = orchestrator.compare("query", tx).await.unwrap();

        assert!(!outcomes[0].is_success());
        assert!(outcomes[0].error.as_ref().unwrap().contains("no response"));
        assert!(outcomes[1].is_success());
    }

    #[tokio::test]
    async fn test_terminal_events_reach_the_right_slots() {
        let session = Arc::new(SessionContext::new());
        let models = vec![
            ModelConfig::new("a", "Ok", "http://localhost"),
            ModelConfig::new("b", "Broken", "http://localhost"),
        ];
        let factory = MockClientFactory::new()
            .with_client("a", MockModelClient::new("hi"))
            .with_client("b", MockModelClient::new("x").with_error("down"));

        let orchestrator = orchestrator_with(session, factory, models);
        let (tx, mut rx) = mpsc::channel(256);
        orchestrator.compare("query", tx).await.unwrap();

        let mut completed = Vec::new();
        let mut failed = Vec::new();
        while let Ok(event) = rx.try_recv() {
            match event {
                TurnEvent::Completed { model_id, .. } => completed.push(model_id),
                TurnEvent::Failed { model_id, .. } => failed.push(model_id),
                TurnEvent::Delta { .. } => {}
            }
        }

        assert_eq!(completed, vec!["a".to_string()]);
        assert_eq!(failed, vec!["b".to_string()]);
    }
}
