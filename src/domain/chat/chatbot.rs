use std::sync::Arc;

use futures::StreamExt;
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::{prompt, SessionContext};
use crate::domain::llm::ModelClient;
use crate::domain::model::ModelConfig;
use crate::domain::retrieval::{Passage, Reranker};
use crate::domain::DomainError;

/// Streamed progress of one model's turn, routed to that model's output slot
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TurnEvent {
    Delta { model_id: String, text: String },
    Completed { model_id: String, text: String },
    Failed { model_id: String, error: String },
}

impl TurnEvent {
    pub fn model_id(&self) -> &str {
        match self {
            Self::Delta { model_id, .. }
            | Self::Completed { model_id, .. }
            | Self::Failed { model_id, .. } => model_id,
        }
    }
}

/// Runs one conversational turn against a single model.
///
/// A turn moves through retrieval (when the model uses RAG), reranking
/// (when enabled and retrieval produced passages), prompt assembly, and
/// streaming. The full response text is committed to the shared history
/// exactly once, after the stream finishes; an interrupted stream commits
/// nothing.
#[derive(Debug)]
pub struct Chatbot {
    session: Arc<SessionContext>,
    reranker: Arc<dyn Reranker>,
    rerank_top_n: usize,
}

impl Chatbot {
    pub fn new(
        session: Arc<SessionContext>,
        reranker: Arc<dyn Reranker>,
        rerank_top_n: usize,
    ) -> Self {
        Self {
            session,
            reranker,
            rerank_top_n,
        }
    }

    pub fn session(&self) -> &Arc<SessionContext> {
        &self.session
    }

    /// Run one turn for `config`, forwarding fragments to `events` as they
    /// arrive and committing the full text under `epoch` on completion.
    ///
    /// Errors are scoped to this model; callers report them to the matching
    /// output slot without touching sibling turns.
    pub async fn run_turn(
        &self,
        query: &str,
        config: &ModelConfig,
        client: Arc<dyn ModelClient>,
        epoch: u64,
        events: mpsc::Sender<TurnEvent>,
    ) -> Result<String, DomainError> {
        let passages = self.gather_passages(query, config).await?;
        let prompt = prompt::assemble(query, &passages);
        debug!(
            model_id = %config.id,
            passages = passages.len(),
            prompt_chars = prompt.len(),
            "prompt assembled"
        );

        let mut stream = client.stream(&prompt).await?;
        let mut response = String::new();

        while let Some(fragment) = stream.next().await {
            let fragment = fragment?;
            if fragment.is_empty() {
                continue;
            }
            response.push_str(&fragment);
            let _ = events
                .send(TurnEvent::Delta {
                    model_id: config.id.clone(),
                    text: fragment,
                })
                .await;
        }

        self.session
            .history()
            .commit_assistant(epoch, response.clone())
            .await?;

        info!(model_id = %config.id, chars = response.len(), "turn completed");
        Ok(response)
    }

    /// Retrieve and optionally rerank passages for this turn.
    ///
    /// A missing retriever is a turn failure for RAG models; a failing
    /// retrieval call or a failing rerank degrades gracefully instead.
    async fn gather_passages(
        &self,
        query: &str,
        config: &ModelConfig,
    ) -> Result<Vec<Passage>, DomainError> {
        if !config.uses_rag {
            return Ok(Vec::new());
        }

        let Some(retriever) = self.session.retriever().await else {
            return Err(DomainError::retrieval(
                "no document has been indexed for this session",
            ));
        };

        let passages = match retriever.retrieve(query).await {
            Ok(passages) => passages,
            Err(error) => {
                warn!(model_id = %config.id, %error, "retrieval failed, continuing without documents");
                Vec::new()
            }
        };

        if config.uses_reranking && !passages.is_empty() {
            match self
                .reranker
                .rerank(query, passages.clone(), self.rerank_top_n)
                .await
            {
                Ok(reranked) => return Ok(reranked),
                Err(error) => {
                    warn!(model_id = %config.id, %error, "rerank failed, using retrieval order");
                    return Ok(passages);
                }
            }
        }

        Ok(passages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::llm::MockModelClient;
    use crate::domain::retrieval::{MockReranker, MockRetriever, PassageRetriever};
    use std::sync::Mutex;
    use tokio::sync::Notify;

    fn numbered_passages(n: usize) -> Vec<Passage> {
        (0..n)
            .map(|i| Passage::new(format!("chunk {i}"), 1.0 - i as f32 * 0.1))
            .collect()
    }

    async fn session_with(retriever: Arc<dyn PassageRetriever>) -> Arc<SessionContext> {
        let session = Arc::new(SessionContext::new());
        session.attach_retriever("doc-test", retriever).await;
        session
    }

    fn chatbot(session: &Arc<SessionContext>) -> Chatbot {
        Chatbot::new(Arc::clone(session), Arc::new(MockReranker::new()), 3)
    }

    fn logging_client(
        response: &str,
    ) -> (Arc<MockModelClient>, Arc<Mutex<Vec<String>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let client =
            Arc::new(MockModelClient::new(response).with_prompt_log(Arc::clone(&log)));
        (client, log)
    }

    #[tokio::test]
    async fn test_turn_without_rag_never_includes_docs() {
        let retriever =
            Arc::new(MockRetriever::new().with_passages(numbered_passages(3)));
        let session = session_with(retriever).await;
        let bot = chatbot(&session);
        let (client, log) = logging_client("hi");
        let (tx, _rx) = mpsc::channel(64);

        let snapshot = session.history().push_user("What is X?").await;
        let config = ModelConfig::new("a", "Plain", "http://localhost");
        let response = bot
            .run_turn("What is X?", &config, client, snapshot.epoch, tx)
            .await
            .unwrap();

        assert_eq!(response, "hi");
        let prompts = log.lock().unwrap();
        assert!(!prompts[0].contains("BEGIN DOCS"));
        assert!(!prompts[0].contains("chunk 0"));
    }

    #[tokio::test]
    async fn test_rag_turn_embeds_passages_in_retrieval_order() {
        let retriever =
            Arc::new(MockRetriever::new().with_passages(numbered_passages(5)));
        let session = session_with(retriever).await;
        let bot = chatbot(&session);
        let (client, log) = logging_client("ok");
        let (tx, _rx) = mpsc::channel(64);

        let snapshot = session.history().push_user("query").await;
        let config = ModelConfig::new("b", "Rag", "http://localhost").with_rag(true);
        bot.run_turn("query", &config, client, snapshot.epoch, tx)
            .await
            .unwrap();

        let prompts = log.lock().unwrap();
        assert!(prompts[0].contains("BEGIN DOCS"));
        for i in 0..5 {
            assert!(prompts[0].contains(&format!("chunk {i}")));
        }
    }

    #[tokio::test]
    async fn test_reranking_bounds_passages_to_top_n() {
        let retriever =
            Arc::new(MockRetriever::new().with_passages(numbered_passages(5)));
        let session = session_with(retriever).await;
        let bot = chatbot(&session);
        let (client, log) = logging_client("ok");
        let (tx, _rx) = mpsc::channel(64);

        let snapshot = session.history().push_user("query").await;
        let config = ModelConfig::new("c", "Reranked", "http://localhost")
            .with_rag(true)
            .with_reranking(true);
        bot.run_turn("query", &config, client, snapshot.epoch, tx)
            .await
            .unwrap();

        // the mock reranker reverses, so top-3 is chunks 4, 3, 2
        let prompts = log.lock().unwrap();
        assert!(prompts[0].contains("chunk 4"));
        assert!(prompts[0].contains("chunk 2"));
        assert!(!prompts[0].contains("chunk 0"));
        assert!(!prompts[0].contains("chunk 1"));
    }

    #[tokio::test]
    async fn test_retrieval_error_degrades_to_plain_prompt() {
        let retriever = Arc::new(MockRetriever::new().with_error("index unavailable"));
        let session = session_with(retriever).await;
        let bot = chatbot(&session);
        let (client, log) = logging_client("still fine");
        let (tx, _rx) = mpsc::channel(64);

        let snapshot = session.history().push_user("query").await;
        let config = ModelConfig::new("d", "Rag", "http://localhost").with_rag(true);
        let response = bot
            .run_turn("query", &config, client, snapshot.epoch, tx)
            .await
            .unwrap();

        assert_eq!(response, "still fine");
        assert!(!log.lock().unwrap()[0].contains("BEGIN DOCS"));
    }

    #[tokio::test]
    async fn test_rerank_error_falls_back_to_retrieval_order() {
        let retriever =
            Arc::new(MockRetriever::new().with_passages(numbered_passages(5)));
        let session = session_with(retriever).await;
        let bot = Chatbot::new(
            Arc::clone(&session),
            Arc::new(MockReranker::new().with_error("model not loaded")),
            3,
        );
        let (client, log) = logging_client("ok");
        let (tx, _rx) = mpsc::channel(64);

        let snapshot = session.history().push_user("query").await;
        let config = ModelConfig::new("e", "Reranked", "http://localhost")
            .with_rag(true)
            .with_reranking(true);
        bot.run_turn("query", &config, client, snapshot.epoch, tx)
            .await
            .unwrap();

        // all five passages survive, un-reranked
        let prompts = log.lock().unwrap();
        for i in 0..5 {
            assert!(prompts[0].contains(&format!("chunk {i}")));
        }
    }

    #[tokio::test]
    async fn test_missing_retriever_fails_rag_turn() {
        let session = Arc::new(SessionContext::new());
        let bot = chatbot(&session);
        let (client, _log) = logging_client("unused");
        let (tx, _rx) = mpsc::channel(64);

        let snapshot = session.history().push_user("query").await;
        let config = ModelConfig::new("f", "Rag", "http://localhost").with_rag(true);
        let result = bot
            .run_turn("query", &config, client, snapshot.epoch, tx)
            .await;

        assert!(result.is_err());
        assert_eq!(session.history().len().await, 1);
    }

    #[tokio::test]
    async fn test_interrupted_stream_commits_nothing() {
        let session = Arc::new(SessionContext::new());
        let bot = chatbot(&session);
        let client =
            Arc::new(MockModelClient::new("abcdef").with_failure_after(3, "reset by peer"));
        let (tx, mut rx) = mpsc::channel(64);

        let snapshot = session.history().push_user("query").await;
        let config = ModelConfig::new("g", "Flaky", "http://localhost");
        let result = bot
            .run_turn("query", &config, client, snapshot.epoch, tx)
            .await;

        assert!(result.is_err());
        assert_eq!(session.history().len().await, 1);

        // fragments before the failure still reached the slot
        let mut deltas = 0;
        while let Ok(event) = rx.try_recv() {
            assert!(matches!(event, TurnEvent::Delta { .. }));
            deltas += 1;
        }
        assert_eq!(deltas, 3);
    }

    #[tokio::test]
    async fn test_completed_turn_commits_exactly_once() {
        let session = Arc::new(SessionContext::new());
        let bot = chatbot(&session);
        let (client, _log) = logging_client("full answer");
        let (tx, _rx) = mpsc::channel(64);

        let snapshot = session.history().push_user("query").await;
        let config = ModelConfig::new("h", "Ok", "http://localhost");
        let response = bot
            .run_turn("query", &config, client, snapshot.epoch, tx)
            .await
            .unwrap();

        assert_eq!(response, "full answer");
        let after = session.history().snapshot().await;
        assert_eq!(after.turns.len(), 2);
        assert_eq!(after.turns[1].text, "full answer");
    }

    #[tokio::test]
    async fn test_reset_mid_stream_discards_the_turn() {
        let session = Arc::new(SessionContext::new());
        let bot = Arc::new(chatbot(&session));
        let gate = Arc::new(Notify::new());
        let client = Arc::new(MockModelClient::new("ok").with_gate(Arc::clone(&gate)));
        let (tx, mut rx) = mpsc::channel(64);

        let snapshot = session.history().push_user("query").await;
        let config = ModelConfig::new("i", "Slow", "http://localhost");
        let epoch = snapshot.epoch;

        let task = {
            let bot = Arc::clone(&bot);
            tokio::spawn(async move { bot.run_turn("query", &config, client, epoch, tx).await })
        };

        // wait until the stream has started producing, then reset
        let first = rx.recv().await.unwrap();
        assert!(matches!(first, TurnEvent::Delta { .. }));
        session.reset().await;
        gate.notify_one();

        let result = task.await.unwrap();
        assert!(result.is_err());
        assert!(session.history().is_empty().await);
    }
}
