//! Document index backends

mod chunker;
mod in_memory;
mod redis;

pub use self::redis::{RedisIndexer, RedisRetriever};
pub use chunker::TextChunker;
pub use in_memory::{InMemoryIndexer, InMemoryRetriever};
