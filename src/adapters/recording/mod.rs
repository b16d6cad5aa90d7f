//! Recording adapters that capture interactions to a cassette.

pub mod clock;
pub mod id_gen;
pub mod llm;

use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;

use crate::cassette::recorder::CassetteRecorder;

pub use clock::RecordingClock;
pub use id_gen::RecordingIdGenerator;
pub use llm::RecordingChatProvider;

/// Shared handle to the recorder every adapter writes into.
pub type SharedRecorder = Arc<Mutex<CassetteRecorder>>;

/// Records one interaction.
///
/// Values that fail to serialize are recorded as `null` with a warning;
/// recording never interrupts the call being recorded.
pub(crate) fn record_interaction<I, O>(
    recorder: &SharedRecorder,
    port: &str,
    method: &str,
    input: &I,
    output: &O,
) where
    I: Serialize,
    O: Serialize,
{
    let input = serde_json::to_value(input).unwrap_or_else(|e| {
        tracing::warn!(port, method, error = %e, "failed to serialize recorded input");
        serde_json::Value::Null
    });
    let output = serde_json::to_value(output).unwrap_or_else(|e| {
        tracing::warn!(port, method, error = %e, "failed to serialize recorded output");
        serde_json::Value::Null
    });
    recorder.lock().unwrap_or_else(PoisonError::into_inner).record(port, method, input, output);
}
