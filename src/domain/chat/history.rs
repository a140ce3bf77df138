use tokio::sync::RwLock;

use crate::domain::llm::{Message, MessageRole};
use crate::domain::DomainError;

/// Point-in-time copy of the conversation taken when a comparison run is
/// dispatched. The epoch ties later commits back to the history generation
/// they were started against.
#[derive(Debug, Clone)]
pub struct HistorySnapshot {
    pub turns: Vec<Message>,
    pub epoch: u64,
}

/// Ordered, append-only log of conversation turns shared across every model
/// in a comparison session.
///
/// Writes are epoch-guarded: `reset` bumps the epoch, and a commit carrying
/// a stale epoch is rejected. A stream that was in flight when the user reset
/// the conversation can therefore never resurrect its turn.
#[derive(Debug, Default)]
pub struct ConversationHistory {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    turns: Vec<Message>,
    epoch: u64,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the user's query and return the post-append snapshot all
    /// model turns of this comparison run share.
    pub async fn push_user(&self, text: impl Into<String>) -> HistorySnapshot {
        let mut inner = self.inner.write().await;
        inner.turns.push(Message::user(text));
        HistorySnapshot {
            turns: inner.turns.clone(),
            epoch: inner.epoch,
        }
    }

    /// Commit one completed assistant turn.
    ///
    /// Rejected when the history was reset after the turn was dispatched;
    /// nothing is appended in that case.
    pub async fn commit_assistant(
        &self,
        epoch: u64,
        text: impl Into<String>,
    ) -> Result<(), DomainError> {
        let mut inner = self.inner.write().await;

        if inner.epoch != epoch {
            return Err(DomainError::session(
                "conversation was reset while the response was streaming",
            ));
        }

        inner.turns.push(Message::assistant(text));
        Ok(())
    }

    pub async fn snapshot(&self) -> HistorySnapshot {
        let inner = self.inner.read().await;
        HistorySnapshot {
            turns: inner.turns.clone(),
            epoch: inner.epoch,
        }
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.turns.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.turns.is_empty()
    }

    /// Format the last `n` turns as context for a follow-up query
    pub async fn recent_context(&self, n: usize) -> String {
        let inner = self.inner.read().await;
        let start = inner.turns.len().saturating_sub(n);

        inner.turns[start..]
            .iter()
            .map(|turn| {
                let speaker = match turn.role {
                    MessageRole::User => "user",
                    MessageRole::Assistant => "assistant",
                };
                format!("{speaker}: {}", turn.text)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Clear all turns and invalidate outstanding commits
    pub async fn reset(&self) {
        let mut inner = self.inner.write().await;
        inner.turns.clear();
        inner.epoch += 1;
    }
}
