//! Model backend clients and their factory

mod factory;
mod ollama;
mod openai_compat;
mod tgi;

pub use factory::BackendClientFactory;
pub use ollama::OllamaClient;
pub use openai_compat::OpenAiCompatClient;
pub use tgi::TgiClient;

use std::collections::VecDeque;
use std::pin::Pin;

use futures::{stream, Stream, StreamExt};

use crate::domain::DomainError;
use crate::infrastructure::http_client::ByteStream;

pub(crate) type LineStream = Pin<Box<dyn Stream<Item = Result<String, DomainError>> + Send>>;

struct LineState {
    bytes: ByteStream,
    buffer: String,
    ready: VecDeque<String>,
    done: bool,
}

/// Reassemble a byte stream into complete lines.
///
/// Backends chunk their responses at arbitrary byte boundaries; both the
/// NDJSON and SSE wire formats are line-delimited, so every client parses
/// on top of this.
pub(crate) fn split_lines(byte_stream: ByteStream) -> LineStream {
    let state = LineState {
        bytes: byte_stream,
        buffer: String::new(),
        ready: VecDeque::new(),
        done: false,
    };

    Box::pin(stream::unfold(state, |mut state| async move {
        loop {
            if let Some(line) = state.ready.pop_front() {
                return Some((Ok(line), state));
            }

            if state.done {
                if state.buffer.is_empty() {
                    return None;
                }
                let line = std::mem::take(&mut state.buffer);
                return Some((Ok(line), state));
            }

            match state.bytes.next().await {
                Some(Ok(chunk)) => {
                    state.buffer.push_str(&String::from_utf8_lossy(&chunk));

                    while let Some(pos) = state.buffer.find('\n') {
                        let line: String = state.buffer.drain(..=pos).collect();
                        state.ready.push_back(
                            line.trim_end_matches('\n').trim_end_matches('\r').to_string(),
                        );
                    }
                }
                Some(Err(error)) => return Some((Err(error), state)),
                None => state.done = true,
            }
        }
    }))
}
