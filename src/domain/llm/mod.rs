//! Model client traits and conversation message types

mod client;
mod message;

pub use client::{ModelClient, ModelClientFactory, TokenStream};
pub use message::{Message, MessageRole};

#[cfg(test)]
pub use client::mock::{MockClientFactory, MockModelClient};
