//! Drives one assistant response from token stream to applied files.

use std::time::Duration;

use futures::StreamExt;
use tokio_util::sync::CancellationToken;

use super::extractor::ConversationExtractor;
use super::observer::GenerationObserver;
use super::parser::parse_response;
use super::sequencer::{planned_files, Sequencer};
use crate::error::StudioError;
use crate::ports::{ChatProvider, ChatRequest, Clock, IdGenerator};
use crate::session::model::{ChatSession, GenerationInfo, GenerationStatus, Message};

/// Provider calls give up after this long unless configured otherwise.
pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(120);

/// How a generation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    /// The response parsed and every file operation was applied.
    Completed {
        /// Number of file operations applied.
        applied: usize,
    },
    /// The response was not JSON; its raw text was shown and no files changed.
    Degraded,
    /// The stream failed; a synthetic assistant message describes why.
    StreamFailed(String),
    /// No provider could serve the model; an assistant message says so.
    ProviderUnavailable(String),
    /// The caller cancelled; already applied operations remain.
    Cancelled {
        /// Number of file operations applied before cancellation.
        applied: usize,
    },
}

/// Summary returned to the caller after a generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationReport {
    /// ID of the assistant message appended to the session.
    pub message_id: String,
    /// How the generation ended.
    pub outcome: GenerationOutcome,
    /// Full raw response text when it could not be parsed.
    pub raw_fallback: Option<String>,
}

struct StreamEnd {
    text: String,
    displayed: String,
    error: Option<StudioError>,
}

/// Streams a response, shows its conversation live, then materializes files.
pub struct GenerationPipeline<'a> {
    ids: &'a dyn IdGenerator,
    clock: &'a dyn Clock,
    sequencer: Sequencer,
    timeout: Duration,
}

impl<'a> GenerationPipeline<'a> {
    /// Creates a pipeline using the given ports and timing.
    #[must_use]
    pub fn new(
        ids: &'a dyn IdGenerator,
        clock: &'a dyn Clock,
        sequencer: Sequencer,
        timeout: Duration,
    ) -> Self {
        Self { ids, clock, sequencer, timeout }
    }

    /// Runs one generation against `session`.
    ///
    /// Never fails: transport problems, malformed responses and
    /// cancellation all end with an assistant message in the session and a
    /// matching [`GenerationOutcome`].
    pub async fn run(
        &self,
        session: &mut ChatSession,
        provider: &dyn ChatProvider,
        request: &ChatRequest,
        observer: &dyn GenerationObserver,
        cancel: &CancellationToken,
    ) -> GenerationReport {
        tracing::info!(provider = provider.name(), model = %request.model, "starting generation");
        let end = self.consume(provider, request, observer, cancel).await;

        match end.error {
            None => {}
            Some(StudioError::Cancelled) => {
                let content = if end.displayed.is_empty() {
                    "Generation cancelled.".to_string()
                } else {
                    end.displayed
                };
                let message_id = self.push_message(session, Message::assistant("", content), observer);
                return GenerationReport {
                    message_id,
                    outcome: GenerationOutcome::Cancelled { applied: 0 },
                    raw_fallback: None,
                };
            }
            Some(err) => {
                tracing::warn!(provider = provider.name(), error = %err, "generation stream failed");
                let content = format!("Sorry, the request to {} failed: {err}", provider.name());
                let message_id = self.push_message(session, Message::assistant("", content), observer);
                return GenerationReport {
                    message_id,
                    outcome: GenerationOutcome::StreamFailed(err.to_string()),
                    raw_fallback: None,
                };
            }
        }

        let parsed = parse_response(&end.text);
        let mut message = Message::assistant("", parsed.conversation);
        message.intent_analysis = parsed.intent_analysis;
        message.commands = parsed.commands;
        if !parsed.files.is_empty() {
            message.generation_info = Some(GenerationInfo {
                status: GenerationStatus::Generating,
                files: planned_files(&parsed.files),
            });
        }
        message.id = self.ids.generate_id();
        let message_id = message.id.clone();
        session.messages.push(message);
        session.last_updated = self.clock.now();

        if let Some(info) = session.latest_generation() {
            observer.on_files_planned(&info.files);
        }
        let outcome =
            self.sequencer.materialize(session, &message_id, &parsed.files, observer, cancel).await;
        session.last_updated = self.clock.now();
        if let Some(message) = session.messages.last() {
            observer.on_finished(message);
        }

        let outcome = if outcome.cancelled {
            GenerationOutcome::Cancelled { applied: outcome.applied }
        } else if parsed.raw_fallback.is_some() {
            GenerationOutcome::Degraded
        } else {
            GenerationOutcome::Completed { applied: outcome.applied }
        };
        GenerationReport { message_id, outcome, raw_fallback: parsed.raw_fallback }
    }

    /// Records that no provider could serve the request.
    pub fn report_unavailable(
        &self,
        session: &mut ChatSession,
        err: &StudioError,
        observer: &dyn GenerationObserver,
    ) -> GenerationReport {
        tracing::warn!(error = %err, "no provider available");
        let content = match err {
            StudioError::UnsupportedProvider(name) => {
                format!("The {name} provider is not implemented yet. Pick a model from another provider.")
            }
            other => format!("Cannot start generation: {other}"),
        };
        let message_id = self.push_message(session, Message::assistant("", content), observer);
        GenerationReport {
            message_id,
            outcome: GenerationOutcome::ProviderUnavailable(err.to_string()),
            raw_fallback: None,
        }
    }

    fn push_message(
        &self,
        session: &mut ChatSession,
        mut message: Message,
        observer: &dyn GenerationObserver,
    ) -> String {
        message.id = self.ids.generate_id();
        let id = message.id.clone();
        observer.on_finished(&message);
        session.messages.push(message);
        session.last_updated = self.clock.now();
        id
    }

    /// Reads the stream to its end, re-running extraction on every chunk.
    async fn consume(
        &self,
        provider: &dyn ChatProvider,
        request: &ChatRequest,
        observer: &dyn GenerationObserver,
        cancel: &CancellationToken,
    ) -> StreamEnd {
        let mut stream = provider.stream_completion(request);
        let deadline = tokio::time::Instant::now() + self.timeout;
        let mut extractor = ConversationExtractor::new();
        let mut text = String::new();

        let error = loop {
            let next = tokio::select! {
                () = cancel.cancelled() => break Some(StudioError::Cancelled),
                next = tokio::time::timeout_at(deadline, stream.next()) => next,
            };
            match next {
                Err(_) => break Some(StudioError::Timeout(self.timeout)),
                Ok(None) => break None,
                Ok(Some(Err(err))) => break Some(err),
                Ok(Some(Ok(chunk))) => {
                    text.push_str(&chunk);
                    if let Some(displayed) = extractor.update(&text) {
                        observer.on_conversation(displayed);
                    }
                }
            }
        };

        tracing::debug!(bytes = text.len(), "stream finished");
        StreamEnd { displayed: extractor.displayed().to_string(), text, error }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::Utc;

    use super::*;
    use crate::generation::observer::NoopObserver;
    use crate::session::model::{FileNode, FileStatus, Role};
    use crate::testing::{FixedClock, ScriptedProvider, SequentialIds};

    fn request() -> ChatRequest {
        ChatRequest {
            model: "test-model".into(),
            system_prompt: String::new(),
            history: Vec::new(),
            prompt: "build it".into(),
        }
    }

    fn pipeline<'a>(ids: &'a SequentialIds, clock: &'a FixedClock) -> GenerationPipeline<'a> {
        GenerationPipeline::new(ids, clock, Sequencer::new(Duration::ZERO), Duration::from_secs(5))
    }

    #[derive(Default)]
    struct ConversationLog {
        texts: Mutex<Vec<String>>,
    }

    impl GenerationObserver for ConversationLog {
        fn on_conversation(&self, text: &str) {
            self.texts.lock().unwrap().push(text.to_string());
        }
    }

    #[tokio::test]
    async fn streamed_response_is_materialized() {
        let provider = ScriptedProvider::new(vec![
            r#"{"conversation": "Creating "#,
            r#"your app", "files": [{"path": "index.html", "action": "created", "#,
            r#""content": "<h1>hi</h1>"}, {"action": "created"}]}"#,
        ]);
        let ids = SequentialIds::default();
        let clock = FixedClock::default();
        let log = ConversationLog::default();
        let mut session = ChatSession::new("s1", Utc::now());

        let report = pipeline(&ids, &clock)
            .run(&mut session, &provider, &request(), &log, &CancellationToken::new())
            .await;

        assert_eq!(report.outcome, GenerationOutcome::Completed { applied: 1 });
        assert_eq!(session.file_tree, vec![FileNode::new("index.html", "<h1>hi</h1>")]);
        assert_eq!(session.active_file.as_deref(), Some("index.html"));

        let reply = session.messages.last().unwrap();
        assert_eq!(reply.role, Role::Assistant);
        assert_eq!(reply.content, "Creating your app");
        let info = reply.generation_info.as_ref().unwrap();
        assert_eq!(info.status, GenerationStatus::Complete);
        assert_eq!(info.files[0].status, FileStatus::Complete);

        let texts = log.texts.into_inner().unwrap();
        assert_eq!(texts, vec!["Creating ".to_string(), "Creating your app".to_string()]);
    }

    #[tokio::test]
    async fn transport_error_becomes_assistant_message() {
        let provider = ScriptedProvider::failing(
            vec![r#"{"conversation": "Wor"#],
            StudioError::Api { provider: "scripted".into(), status: 503, body: "overloaded".into() },
        );
        let ids = SequentialIds::default();
        let clock = FixedClock::default();
        let mut session = ChatSession::new("s1", Utc::now());
        session.file_tree.push(FileNode::new("a.ts", "keep me"));

        let report = pipeline(&ids, &clock)
            .run(&mut session, &provider, &request(), &NoopObserver, &CancellationToken::new())
            .await;

        assert!(matches!(report.outcome, GenerationOutcome::StreamFailed(ref m) if m.contains("503")));
        assert_eq!(session.file_tree, vec![FileNode::new("a.ts", "keep me")]);
        let reply = session.messages.last().unwrap();
        assert!(reply.content.contains("overloaded"));
        assert!(reply.generation_info.is_none());
    }

    #[tokio::test]
    async fn non_json_reply_degrades_to_raw_text() {
        let provider = ScriptedProvider::new(vec!["I cannot ", "comply"]);
        let ids = SequentialIds::default();
        let clock = FixedClock::default();
        let log = ConversationLog::default();
        let mut session = ChatSession::new("s1", Utc::now());

        let report = pipeline(&ids, &clock)
            .run(&mut session, &provider, &request(), &log, &CancellationToken::new())
            .await;

        assert_eq!(report.outcome, GenerationOutcome::Degraded);
        assert_eq!(report.raw_fallback.as_deref(), Some("I cannot comply"));
        assert_eq!(session.messages.last().unwrap().content, "I cannot comply");
        assert!(session.file_tree.is_empty());
        assert_eq!(log.texts.into_inner().unwrap().last().unwrap(), "I cannot comply");
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_provider_times_out() {
        let provider = ScriptedProvider::stalled(vec![r#"{"conversation": "thinking"#]);
        let ids = SequentialIds::default();
        let clock = FixedClock::default();
        let mut session = ChatSession::new("s1", Utc::now());

        let report = pipeline(&ids, &clock)
            .run(&mut session, &provider, &request(), &NoopObserver, &CancellationToken::new())
            .await;

        assert_eq!(report.outcome, GenerationOutcome::StreamFailed("provider timed out after 5s".into()));
    }

    #[tokio::test]
    async fn cancelled_stream_keeps_partial_text() {
        let provider = ScriptedProvider::stalled(vec![r#"{"conversation": "Half a thou"#]);
        let ids = SequentialIds::default();
        let clock = FixedClock::default();
        let cancel = CancellationToken::new();
        let mut session = ChatSession::new("s1", Utc::now());

        struct CancelOnText<'a>(&'a CancellationToken);
        impl GenerationObserver for CancelOnText<'_> {
            fn on_conversation(&self, _text: &str) {
                self.0.cancel();
            }
        }

        let report = pipeline(&ids, &clock)
            .run(&mut session, &provider, &request(), &CancelOnText(&cancel), &cancel)
            .await;

        assert_eq!(report.outcome, GenerationOutcome::Cancelled { applied: 0 });
        assert_eq!(session.messages.last().unwrap().content, "Half a thou");
    }

    #[test]
    fn unsupported_provider_is_reported_conversationally() {
        let ids = SequentialIds::default();
        let clock = FixedClock::default();
        let mut session = ChatSession::new("s1", Utc::now());

        let report = pipeline(&ids, &clock).report_unavailable(
            &mut session,
            &StudioError::UnsupportedProvider("anthropic".into()),
            &NoopObserver,
        );

        assert!(matches!(report.outcome, GenerationOutcome::ProviderUnavailable(_)));
        assert!(session.messages[0].content.contains("anthropic provider is not implemented"));
    }
}
