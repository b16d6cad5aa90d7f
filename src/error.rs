//! Error types shared across the studio library.

use std::time::Duration;

use thiserror::Error;

/// Typed error for generation, provider and session operations.
///
/// Command handlers flatten these into strings; library callers can match
/// on the variant to decide how to recover.
#[derive(Debug, Error)]
pub enum StudioError {
    /// Network-level failure talking to a provider.
    #[error("{provider} request failed: {message}")]
    Transport {
        /// Provider name.
        provider: String,
        /// Underlying failure.
        message: String,
    },

    /// The provider answered with a non-success HTTP status.
    #[error("{provider} API error ({status}): {body}")]
    Api {
        /// Provider name.
        provider: String,
        /// HTTP status code.
        status: u16,
        /// Response body or extracted error message.
        body: String,
    },

    /// The provider stopped responding.
    #[error("provider timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// The generation was cancelled by the caller.
    #[error("generation cancelled")]
    Cancelled,

    /// No adapter is registered for the provider.
    #[error("provider '{0}' is not implemented")]
    UnsupportedProvider(String),

    /// The model ID does not map to any provider.
    #[error("unknown model '{0}'")]
    UnknownModel(String),

    /// A credential required by a provider is missing.
    #[error("missing credential: {0}")]
    MissingCredential(String),

    /// A generation is already running for the session.
    #[error("session '{0}' already has a generation in flight")]
    SessionBusy(String),

    /// The session does not exist.
    #[error("session '{0}' not found")]
    SessionNotFound(String),

    /// A session title was blank.
    #[error("session title must not be empty")]
    EmptyTitle,

    /// A file tree path is empty or otherwise unusable.
    #[error("invalid path '{0}'")]
    InvalidPath(String),

    /// A file tree path does not exist.
    #[error("file '{0}' not found")]
    FileNotFound(String),

    /// A file tree path is already taken.
    #[error("file '{0}' already exists")]
    PathExists(String),

    /// Session persistence failed.
    #[error("store error: {0}")]
    Store(String),
}

impl StudioError {
    /// Creates a transport error for the given provider.
    pub fn transport(provider: &str, message: impl std::fmt::Display) -> Self {
        Self::Transport { provider: provider.to_string(), message: message.to_string() }
    }
}

/// Convenience alias for library results.
pub type StudioResult<T> = Result<T, StudioError>;
