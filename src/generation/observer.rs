//! Progress callbacks for a running generation.

use crate::session::model::{ChatSession, GenerationFile, Message};

/// Receives progressive updates while a response streams and applies.
///
/// Every method has a no-op default so hosts only override what they show.
pub trait GenerationObserver: Send + Sync {
    /// The displayed conversational text changed.
    fn on_conversation(&self, _text: &str) {}

    /// The response was parsed; these files will be applied in order.
    fn on_files_planned(&self, _files: &[GenerationFile]) {}

    /// One file operation was applied; `session` shows the new tree.
    fn on_file_applied(&self, _file: &GenerationFile, _session: &ChatSession) {}

    /// The assistant message reached its final state.
    fn on_finished(&self, _message: &Message) {}
}

/// Observer that ignores every update.
pub struct NoopObserver;

impl GenerationObserver for NoopObserver {}
