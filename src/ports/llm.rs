//! Chat provider port: a prompt in, a stream of text chunks out.

use std::pin::Pin;

use futures::Stream;
use serde::{Deserialize, Serialize};

use crate::error::StudioError;
use crate::session::model::Role;

/// Boxed chunk stream returned by [`ChatProvider::stream_completion`].
///
/// Yields zero or more text chunks, then ends. An `Err` item ends the
/// stream early.
pub type ChunkStream<'a> = Pin<Box<dyn Stream<Item = Result<String, StudioError>> + Send + 'a>>;

/// One prior turn of the conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatTurn {
    /// Who said it.
    pub role: Role,
    /// What was said.
    pub content: String,
}

/// A request for a streamed completion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatRequest {
    /// Provider-local model identifier (e.g. `"gpt-4o"`).
    pub model: String,
    /// Instructions describing the response format and current files.
    pub system_prompt: String,
    /// Prior turns, oldest first.
    pub history: Vec<ChatTurn>,
    /// The new user message.
    pub prompt: String,
}

/// A language-model backend that streams its answer.
pub trait ChatProvider: Send + Sync {
    /// Registry name of the provider (e.g. `"openai"`).
    fn name(&self) -> &str;

    /// Starts a completion and returns its chunk stream.
    ///
    /// Transport failures, non-success statuses and missing credentials are
    /// reported as `Err` items on the stream.
    fn stream_completion(&self, request: &ChatRequest) -> ChunkStream<'_>;
}
