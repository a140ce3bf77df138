//! Redis-backed passage index using RediSearch

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use tracing::info;

use super::TextChunker;
use crate::domain::retrieval::{BuiltIndex, DocumentIndexer, Passage, PassageRetriever};
use crate::domain::DomainError;

/// Builds one RediSearch index per uploaded document.
///
/// Chunks are stored as hashes under the index name prefix and searched
/// with full-text scoring; embedding generation stays inside Redis.
#[derive(Clone)]
pub struct RedisIndexer {
    connection: ConnectionManager,
    chunker: TextChunker,
    top_k: usize,
}

impl fmt::Debug for RedisIndexer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisIndexer")
            .field("chunker", &self.chunker)
            .field("top_k", &self.top_k)
            .finish_non_exhaustive()
    }
}

impl RedisIndexer {
    /// Connect to Redis and return an indexer bound to that server
    pub async fn connect(
        url: &str,
        chunker: TextChunker,
        top_k: usize,
    ) -> Result<Self, DomainError> {
        let client = redis::Client::open(url)
            .map_err(|e| DomainError::configuration(format!("invalid redis url: {e}")))?;

        let connection = ConnectionManager::new(client)
            .await
            .map_err(|e| DomainError::retrieval(format!("redis connection failed: {e}")))?;

        Ok(Self {
            connection,
            chunker,
            top_k,
        })
    }
}

#[async_trait]
impl DocumentIndexer for RedisIndexer {
    async fn build_index(
        &self,
        document: &[u8],
        index_name: &str,
    ) -> Result<BuiltIndex, DomainError> {
        let text = std::str::from_utf8(document)
            .map_err(|_| DomainError::upload("document is not valid UTF-8 text"))?;

        let chunks = self.chunker.chunk(text);
        if chunks.is_empty() {
            return Err(DomainError::upload("document contained no indexable text"));
        }

        let mut connection = self.connection.clone();

        let _: () = redis::cmd("FT.CREATE")
            .arg(index_name)
            .arg("ON")
            .arg("HASH")
            .arg("PREFIX")
            .arg(1)
            .arg(format!("{index_name}:"))
            .arg("SCHEMA")
            .arg("text")
            .arg("TEXT")
            .query_async(&mut connection)
            .await
            .map_err(|e| DomainError::retrieval(format!("failed to create index: {e}")))?;

        for (position, chunk) in chunks.iter().enumerate() {
            let _: () = redis::cmd("HSET")
                .arg(format!("{index_name}:{position}"))
                .arg("text")
                .arg(chunk)
                .query_async(&mut connection)
                .await
                .map_err(|e| DomainError::retrieval(format!("failed to store chunk: {e}")))?;
        }

        info!(index = index_name, chunks = chunks.len(), "built redis index");

        Ok(BuiltIndex {
            name: index_name.to_string(),
            chunks: chunks.len(),
            retriever: Arc::new(RedisRetriever {
                connection: self.connection.clone(),
                index_name: index_name.to_string(),
                top_k: self.top_k,
            }),
        })
    }

    fn indexer_name(&self) -> &'static str {
        "redis"
    }
}

/// Full-text retriever over one document's RediSearch index
#[derive(Clone)]
pub struct RedisRetriever {
    connection: ConnectionManager,
    index_name: String,
    top_k: usize,
}

impl fmt::Debug for RedisRetriever {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisRetriever")
            .field("index_name", &self.index_name)
            .field("top_k", &self.top_k)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl PassageRetriever for RedisRetriever {
    async fn retrieve(&self, query: &str) -> Result<Vec<Passage>, DomainError> {
        let search = build_search_query(query);
        if search.is_empty() {
            return Ok(Vec::new());
        }

        let mut connection = self.connection.clone();
        let reply: redis::Value = redis::cmd("FT.SEARCH")
            .arg(&self.index_name)
            .arg(&search)
            .arg("WITHSCORES")
            .arg("RETURN")
            .arg(1)
            .arg("text")
            .arg("LIMIT")
            .arg(0)
            .arg(self.top_k)
            .query_async(&mut connection)
            .await
            .map_err(|e| DomainError::retrieval(format!("index search failed: {e}")))?;

        parse_search_reply(reply, &self.index_name)
    }

    fn retriever_name(&self) -> &'static str {
        "redis"
    }
}

/// Turn free-form user text into a RediSearch OR query of its words
fn build_search_query(query: &str) -> String {
    query
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .collect::<Vec<_>>()
        .join("|")
}

/// Decode an FT.SEARCH WITHSCORES reply: a leading hit count followed by
/// (key, score, fields) triples.
fn parse_search_reply(reply: redis::Value, index_name: &str) -> Result<Vec<Passage>, DomainError> {
    let redis::Value::Array(items) = reply else {
        return Err(DomainError::retrieval("unexpected search reply shape"));
    };

    let entries: Vec<redis::Value> = items.into_iter().skip(1).collect();
    let mut passages = Vec::new();

    for entry in entries.chunks(3) {
        if entry.len() < 3 {
            break;
        }

        let score = value_as_f32(&entry[1]).unwrap_or(0.0);
        if let Some(text) = field_value(&entry[2], "text") {
            passages.push(Passage::new(text, score).with_source(index_name));
        }
    }

    Ok(passages)
}

fn value_as_string(value: &redis::Value) -> Option<String> {
    match value {
        redis::Value::BulkString(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
        redis::Value::SimpleString(s) => Some(s.clone()),
        _ => None,
    }
}

fn value_as_f32(value: &redis::Value) -> Option<f32> {
    match value {
        redis::Value::Double(d) => Some(*d as f32),
        redis::Value::Int(i) => Some(*i as f32),
        other => value_as_string(other)?.parse().ok(),
    }
}

fn field_value(fields: &redis::Value, name: &str) -> Option<String> {
    match fields {
        redis::Value::Array(pairs) => pairs.chunks(2).find_map(|pair| {
            if pair.len() == 2 && value_as_string(&pair[0]).as_deref() == Some(name) {
                value_as_string(&pair[1])
            } else {
                None
            }
        }),
        redis::Value::Map(pairs) => pairs.iter().find_map(|(key, value)| {
            if value_as_string(key).as_deref() == Some(name) {
                value_as_string(value)
            } else {
                None
            }
        }),
        _ => None,
    }
}
