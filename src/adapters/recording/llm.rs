//! Recording adapter for the `ChatProvider` port.

use futures::{stream, StreamExt};
use serde_json::json;

use super::{record_interaction, SharedRecorder};
use crate::cassette::format::RecordedStream;
use crate::ports::{ChatProvider, ChatRequest, ChunkStream};

/// Records every chunk a provider streams while passing it through.
pub struct RecordingChatProvider {
    inner: Box<dyn ChatProvider>,
    recorder: SharedRecorder,
}

impl RecordingChatProvider {
    /// Creates a recording provider wrapping `inner`.
    pub fn new(inner: Box<dyn ChatProvider>, recorder: SharedRecorder) -> Self {
        Self { inner, recorder }
    }
}

/// Accumulates a stream's output and records it when dropped, so streams
/// abandoned by cancellation are still captured.
struct Tape {
    recorder: SharedRecorder,
    input: serde_json::Value,
    output: RecordedStream,
}

impl Drop for Tape {
    fn drop(&mut self) {
        record_interaction(&self.recorder, "llm", "stream_completion", &self.input, &self.output);
    }
}

impl ChatProvider for RecordingChatProvider {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn stream_completion(&self, request: &ChatRequest) -> ChunkStream<'_> {
        let tape = Tape {
            recorder: SharedRecorder::clone(&self.recorder),
            input: json!({ "provider": self.inner.name(), "request": request }),
            output: RecordedStream::default(),
        };
        let inner = self.inner.stream_completion(request);

        Box::pin(stream::unfold(Some((inner, tape)), |state| async move {
            let (mut inner, mut tape) = state?;
            match inner.next().await? {
                Ok(chunk) => {
                    tape.output.chunks.push(chunk.clone());
                    Some((Ok(chunk), Some((inner, tape))))
                }
                Err(err) => {
                    tape.output.error = Some(err.to_string());
                    Some((Err(err), None))
                }
            }
        }))
    }
}
