use std::fmt::Debug;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use futures::Stream;

use crate::domain::model::ModelConfig;
use crate::domain::DomainError;

/// Lazy, finite, non-restartable sequence of response text fragments
pub type TokenStream = Pin<Box<dyn Stream<Item = Result<String, DomainError>> + Send>>;

/// A streamable client bound to one model backend
#[async_trait]
pub trait ModelClient: Send + Sync + Debug {
    /// Start generating a response for the given prompt.
    ///
    /// Fragments arrive in generation order; dropping the stream releases
    /// the underlying connection.
    async fn stream(&self, prompt: &str) -> Result<TokenStream, DomainError>;

    /// Get the backend name
    fn backend_name(&self) -> &'static str;
}

/// Constructs a [`ModelClient`] for a model configuration.
///
/// Construction has no side effects beyond building the client object; no
/// network traffic happens until the client streams.
pub trait ModelClientFactory: Send + Sync + Debug {
    fn create(&self, config: &ModelConfig) -> Result<Arc<dyn ModelClient>, DomainError>;
}


#[cfg(test)]
mod tests {
    use super::mock::MockModelClient;
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn test_mock_client_streams_fragments_in_order() {
        let client = MockModelClient::new("abc");
        let mut stream = client.stream("prompt").await.unwrap();

        let mut collected = String::new();
        while let Some(fragment) = stream.next().await {
            collected.push_str(&fragment.unwrap());
        }

        assert_eq!(collected, "abc");
    }

    #[tokio::test]
    async fn test_mock_client_stream_error() {
        let client = MockModelClient::new("abc").with_error("backend down");
        let result = client.stream("prompt").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_mock_client_mid_stream_failure() {
        let client = MockModelClient::new("abcdef").with_failure_after(3, "reset by peer");
        let mut stream = client.stream("prompt").await.unwrap();

        let mut collected = String::new();
        let mut failed = false;
        while let Some(fragment) = stream.next().await {
            match fragment {
                Ok(text) => collected.push_str(&text),
                Err(_) => {
                    failed = true;
                    break;
                }
            }
        }

        assert_eq!(collected, "abc");
        assert!(failed);
    }
}
