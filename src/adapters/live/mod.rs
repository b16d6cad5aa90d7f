//! Live adapters for real external interactions.

pub mod clock;
pub mod filesystem;
pub mod gemini;
pub mod huggingface;
pub mod id_gen;
pub mod openai;
pub mod sse;
pub mod transpiler;

use serde_json::Value;

use crate::error::StudioError;

/// Turns a non-success response into an API error, preferring the
/// `error.message` field providers put in their JSON bodies.
pub(crate) async fn api_error(provider: &str, response: reqwest::Response) -> StudioError {
    let status = response.status().as_u16();
    let text = response.text().await.unwrap_or_default();
    StudioError::Api { provider: provider.to_string(), status, body: error_message(&text) }
}

/// Extracts a provider error message from a JSON body, else the raw text.
pub(crate) fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .or_else(|| v.get("error"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}
