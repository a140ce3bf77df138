//! Conversation state and the comparison pipeline

mod chatbot;
mod comparison;
mod history;
pub mod prompt;
mod session;

pub use chatbot::{Chatbot, TurnEvent};
pub use comparison::{ComparisonOrchestrator, ComparisonRun, ModelOutcome};
pub use history::{ConversationHistory, HistorySnapshot};
pub use session::SessionContext;
