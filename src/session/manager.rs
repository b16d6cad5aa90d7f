//! Owns live sessions and serializes generations per session.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::model::{ChatSession, Message, Role};
use super::prompt;
use crate::config::StudioConfig;
use crate::context::ServiceContext;
use crate::error::{StudioError, StudioResult};
use crate::generation::{GenerationObserver, GenerationPipeline, GenerationReport, Sequencer};

type SessionHandle = Arc<tokio::sync::Mutex<ChatSession>>;

/// Knobs applied to every generation a manager runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationSettings {
    /// Model used when a send does not name one.
    pub default_model: String,
    /// Delay before each file operation.
    pub pacing: Duration,
    /// Deadline for a whole provider stream.
    pub timeout: Duration,
}

impl From<&StudioConfig> for GenerationSettings {
    fn from(config: &StudioConfig) -> Self {
        Self {
            default_model: config.default_model.clone(),
            pacing: config.pacing,
            timeout: config.provider_timeout,
        }
    }
}

/// Removes the in-flight entry for a session when its generation ends,
/// however it ends.
struct InFlight<'m> {
    map: &'m Mutex<HashMap<String, CancellationToken>>,
    id: String,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.map.lock().unwrap_or_else(PoisonError::into_inner).remove(&self.id);
    }
}

/// In-memory registry of sessions with at most one generation in flight
/// per session.
///
/// A second `send` for a busy session is rejected with
/// [`StudioError::SessionBusy`] rather than queued.
pub struct SessionManager<'a> {
    ctx: &'a ServiceContext,
    settings: GenerationSettings,
    sessions: Mutex<BTreeMap<String, SessionHandle>>,
    in_flight: Mutex<HashMap<String, CancellationToken>>,
}

impl<'a> SessionManager<'a> {
    /// Creates an empty manager.
    #[must_use]
    pub fn new(ctx: &'a ServiceContext, settings: GenerationSettings) -> Self {
        Self {
            ctx,
            settings,
            sessions: Mutex::new(BTreeMap::new()),
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Creates an empty session and returns its ID.
    pub fn create_session(&self) -> String {
        let session = ChatSession::new(self.ctx.id_gen.generate_id(), self.ctx.clock.now());
        let id = session.id.clone();
        tracing::info!(session = %id, "created session");
        self.insert(session);
        id
    }

    /// Adds an existing session, replacing one with the same ID.
    pub fn insert(&self, session: ChatSession) {
        let id = session.id.clone();
        self.lock_sessions().insert(id, Arc::new(tokio::sync::Mutex::new(session)));
    }

    /// Returns a copy of a session, waiting for any running generation step.
    ///
    /// # Errors
    ///
    /// Returns [`StudioError::SessionNotFound`] for unknown IDs.
    pub async fn snapshot(&self, id: &str) -> StudioResult<ChatSession> {
        let handle = self.handle(id)?;
        let session = handle.lock().await;
        Ok(session.clone())
    }

    /// Applies `edit` to an idle session and refreshes its timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`StudioError::SessionNotFound`] for unknown IDs,
    /// [`StudioError::SessionBusy`] while a generation runs, or whatever
    /// `edit` returns.
    pub async fn edit<T>(
        &self,
        id: &str,
        edit: impl FnOnce(&mut ChatSession) -> StudioResult<T>,
    ) -> StudioResult<T> {
        let handle = self.handle(id)?;
        if self.is_busy(id) {
            return Err(StudioError::SessionBusy(id.to_string()));
        }
        let mut session = handle.lock().await;
        let value = edit(&mut session)?;
        session.last_updated = self.ctx.clock.now();
        Ok(value)
    }

    /// Sets a session's display title.
    ///
    /// # Errors
    ///
    /// Same as [`SessionManager::edit`]; blank titles are rejected.
    pub async fn rename_session(&self, id: &str, title: &str) -> StudioResult<()> {
        let title = title.trim();
        if title.is_empty() {
            return Err(StudioError::EmptyTitle);
        }
        self.edit(id, |session| {
            session.title = title.to_string();
            Ok(())
        })
        .await
    }

    /// Returns `true` while a generation runs for the session.
    #[must_use]
    pub fn is_busy(&self, id: &str) -> bool {
        self.lock_in_flight().contains_key(id)
    }

    /// Cancels the session's running generation. Returns `false` if none.
    pub fn cancel(&self, id: &str) -> bool {
        match self.lock_in_flight().get(id) {
            Some(token) => {
                tracing::info!(session = %id, "cancelling generation");
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Sends a user message and runs the assistant's response to completion.
    ///
    /// The user message is appended immediately. Provider failures,
    /// unroutable models and cancellation all end with an assistant message
    /// in the session and are reported through the returned outcome.
    ///
    /// # Errors
    ///
    /// Returns [`StudioError::SessionNotFound`] for unknown IDs and
    /// [`StudioError::SessionBusy`] if a generation is already running.
    pub async fn send(
        &self,
        id: &str,
        text: &str,
        model: Option<&str>,
        observer: &dyn GenerationObserver,
    ) -> StudioResult<GenerationReport> {
        let handle = self.handle(id)?;
        let (cancel, _in_flight) = self.begin(id)?;
        let mut session = handle.lock().await;

        let model = model.unwrap_or(&self.settings.default_model);
        let mut request = prompt::build_request(&session, model, text);
        self.append_user_message(&mut session, text);

        let pipeline = GenerationPipeline::new(
            self.ctx.id_gen.as_ref(),
            self.ctx.clock.as_ref(),
            Sequencer::new(self.settings.pacing),
            self.settings.timeout,
        );
        let report = match self.ctx.providers.resolve(model) {
            Ok((provider, model_id)) => {
                request.model = model_id;
                pipeline.run(&mut session, provider, &request, observer, &cancel).await
            }
            Err(err) => pipeline.report_unavailable(&mut session, &err, observer),
        };
        tracing::info!(session = %id, outcome = ?report.outcome, "generation finished");
        Ok(report)
    }

    fn append_user_message(&self, session: &mut ChatSession, text: &str) {
        let first = !session.messages.iter().any(|m| m.role == Role::User);
        if first && session.title == ChatSession::DEFAULT_TITLE {
            session.title = prompt::derive_title(text);
        }
        session.messages.push(Message::user(self.ctx.id_gen.generate_id(), text));
        session.last_updated = self.ctx.clock.now();
    }

    fn begin(&self, id: &str) -> StudioResult<(CancellationToken, InFlight<'_>)> {
        let mut in_flight = self.lock_in_flight();
        if in_flight.contains_key(id) {
            tracing::warn!(session = %id, "rejecting send while generation in flight");
            return Err(StudioError::SessionBusy(id.to_string()));
        }
        let token = CancellationToken::new();
        in_flight.insert(id.to_string(), token.clone());
        Ok((token, InFlight { map: &self.in_flight, id: id.to_string() }))
    }

    fn handle(&self, id: &str) -> StudioResult<SessionHandle> {
        self.lock_sessions()
            .get(id)
            .cloned()
            .ok_or_else(|| StudioError::SessionNotFound(id.to_string()))
    }

    fn lock_sessions(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, SessionHandle>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_in_flight(&self) -> std::sync::MutexGuard<'_, HashMap<String, CancellationToken>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
