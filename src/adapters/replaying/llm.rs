//! Replaying adapter for the `ChatProvider` port.

use std::sync::{Arc, Mutex};

use futures::{stream, StreamExt};

use super::next_output;
use crate::cassette::format::RecordedStream;
use crate::cassette::replayer::CassetteReplayer;
use crate::error::StudioError;
use crate::ports::{ChatProvider, ChatRequest, ChunkStream};

/// Streams recorded chunks back under a provider name.
///
/// Several providers may share one replayer; recorded streams are served in
/// the order they were captured regardless of which provider asks.
pub struct ReplayingChatProvider {
    name: String,
    replayer: Arc<Mutex<CassetteReplayer>>,
}

impl ReplayingChatProvider {
    /// Creates a replaying provider named `name`.
    pub fn new(name: impl Into<String>, replayer: Arc<Mutex<CassetteReplayer>>) -> Self {
        Self { name: name.into(), replayer }
    }

    fn next_stream(&self) -> Result<RecordedStream, String> {
        let output = next_output(&self.replayer, "llm", "stream_completion")?;
        serde_json::from_value(output).map_err(|e| format!("malformed recorded stream: {e}"))
    }
}

impl ChatProvider for ReplayingChatProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn stream_completion(&self, request: &ChatRequest) -> ChunkStream<'_> {
        tracing::debug!(provider = %self.name, model = %request.model, "replaying completion");
        match self.next_stream() {
            Ok(recorded) => {
                let chunks = stream::iter(recorded.chunks.into_iter().map(Ok));
                let error = recorded.error.map(|e| Err(StudioError::transport(&self.name, e)));
                Box::pin(chunks.chain(stream::iter(error)))
            }
            Err(e) => Box::pin(stream::once(async move { Err(StudioError::transport("cassette", e)) })),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use serde_json::json;

    use super::*;
    use crate::cassette::format::{Cassette, Interaction};

    fn provider(outputs: Vec<serde_json::Value>) -> ReplayingChatProvider {
        let interactions = outputs
            .into_iter()
            .zip(0..)
            .map(|(output, seq)| Interaction {
                seq,
                port: "llm".into(),
                method: "stream_completion".into(),
                input: json!(null),
                output,
            })
            .collect();
        let cassette = Cassette {
            name: "test".into(),
            recorded_at: Utc::now(),
            studio_version: String::new(),
            interactions,
        };
        ReplayingChatProvider::new("openai", Arc::new(Mutex::new(CassetteReplayer::new(&cassette))))
    }

    fn request() -> ChatRequest {
        ChatRequest {
            model: "gpt-4o".into(),
            system_prompt: String::new(),
            history: Vec::new(),
            prompt: "hi".into(),
        }
    }

    #[tokio::test]
    async fn replays_chunks_and_recorded_error() {
        let provider = provider(vec![json!({"chunks": ["a", "b"], "error": "connection reset"})]);

        let items: Vec<_> = provider.stream_completion(&request()).collect().await;

        assert_eq!(items.len(), 3);
        assert_eq!(items[0].as_ref().unwrap(), "a");
        let err = items[2].as_ref().unwrap_err().to_string();
        assert_eq!(err, "openai request failed: connection reset");
    }

    #[tokio::test]
    async fn exhausted_cassette_yields_transport_error() {
        let provider = provider(vec![]);

        let items: Vec<_> = provider.stream_completion(&request()).collect().await;

        assert_eq!(items.len(), 1);
        assert!(items[0].as_ref().unwrap_err().to_string().contains("cassette exhausted"));
    }
}
