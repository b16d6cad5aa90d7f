//! ID generator port for session and message identifiers.

/// Generates unique identifiers.
///
/// Replaying a cassette substitutes the recorded sequence so that message
/// IDs are stable across runs.
pub trait IdGenerator: Send + Sync {
    /// Generates a new unique identifier string.
    fn generate_id(&self) -> String;
}
