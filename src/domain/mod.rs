//! Domain layer - core comparison pipeline and its capability traits

pub mod chat;
pub mod error;
pub mod llm;
pub mod model;
pub mod retrieval;

pub use chat::{
    Chatbot, ComparisonOrchestrator, ComparisonRun, ConversationHistory, HistorySnapshot,
    ModelOutcome, SessionContext, TurnEvent,
};
pub use error::DomainError;
pub use llm::{Message, MessageRole, ModelClient, ModelClientFactory, TokenStream};
pub use model::{GenerationParams, ModelConfig, ModelType};
pub use retrieval::{BuiltIndex, DocumentIndexer, Passage, PassageRetriever, Reranker};
