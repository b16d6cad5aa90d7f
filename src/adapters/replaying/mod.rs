//! Replaying adapters that serve recorded interactions from a cassette.

pub mod clock;
pub mod id_gen;
pub mod llm;

use std::sync::{Mutex, PoisonError};

use crate::cassette::replayer::CassetteReplayer;

pub use clock::ReplayingClock;
pub use id_gen::ReplayingIdGenerator;
pub use llm::ReplayingChatProvider;

/// Pops the next recorded output for `port`/`method`.
pub(crate) fn next_output(
    replayer: &Mutex<CassetteReplayer>,
    port: &str,
    method: &str,
) -> Result<serde_json::Value, String> {
    let mut replayer = replayer.lock().unwrap_or_else(PoisonError::into_inner);
    replayer.next_interaction(port, method).map(|interaction| interaction.output)
}
