//! Replaying adapter for the `IdGenerator` port.

use std::sync::Mutex;

use super::next_output;
use crate::cassette::replayer::CassetteReplayer;
use crate::ports::IdGenerator;

/// Serves recorded IDs from a cassette.
///
/// Falls back to fresh UUIDs once the recording runs out.
pub struct ReplayingIdGenerator {
    replayer: Mutex<CassetteReplayer>,
}

impl ReplayingIdGenerator {
    /// Creates a replaying ID generator from a cassette replayer.
    #[must_use]
    pub fn new(replayer: CassetteReplayer) -> Self {
        Self { replayer: Mutex::new(replayer) }
    }
}

impl IdGenerator for ReplayingIdGenerator {
    fn generate_id(&self) -> String {
        match next_output(&self.replayer, "id_gen", "generate_id") {
            Ok(serde_json::Value::String(id)) => id,
            Ok(other) => {
                tracing::warn!(output = %other, "recorded id is not a string; generating one");
                uuid::Uuid::new_v4().to_string()
            }
            Err(e) => {
                tracing::warn!(error = %e, "id replay unavailable; generating one");
                uuid::Uuid::new_v4().to_string()
            }
        }
    }
}
