use thiserror::Error;

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Upload error: {message}")]
    Upload { message: String },

    #[error("Retrieval error: {message}")]
    Retrieval { message: String },

    #[error("Rerank error: {message}")]
    Rerank { message: String },

    #[error("Generation error: {backend} - {message}")]
    Generation { backend: String, message: String },

    #[error("Session error: {message}")]
    Session { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn upload(message: impl Into<String>) -> Self {
        Self::Upload {
            message: message.into(),
        }
    }

    pub fn retrieval(message: impl Into<String>) -> Self {
        Self::Retrieval {
            message: message.into(),
        }
    }

    pub fn rerank(message: impl Into<String>) -> Self {
        Self::Rerank {
            message: message.into(),
        }
    }

    pub fn generation(backend: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Generation {
            backend: backend.into(),
            message: message.into(),
        }
    }

    pub fn session(message: impl Into<String>) -> Self {
        Self::Session {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether the error is scoped to a single model's turn rather than
    /// the comparison as a whole.
    pub fn is_turn_scoped(&self) -> bool {
        matches!(
            self,
            Self::Retrieval { .. }
                | Self::Rerank { .. }
                | Self::Generation { .. }
                | Self::Session { .. }
        )
    }
}
