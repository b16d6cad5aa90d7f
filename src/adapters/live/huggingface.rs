//! Live adapter for the Hugging Face inference API.
//!
//! The endpoint does not stream; the whole answer arrives as one chunk.

use std::fmt::Write as _;

use futures::{future, stream, StreamExt};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use super::api_error;
use crate::error::StudioError;
use crate::ports::{ChatProvider, ChatRequest, ChunkStream};

const HUGGINGFACE_BASE_URL: &str = "https://api-inference.huggingface.co/models";
const PROVIDER: &str = "huggingface";
const MAX_NEW_TOKENS: u32 = 4096;

/// Non-streaming Hugging Face text-generation client.
pub struct HuggingFaceProvider {
    api_key: Option<String>,
    client: Client,
}

impl HuggingFaceProvider {
    /// Creates a Hugging Face provider.
    #[must_use]
    pub fn new(api_key: Option<String>) -> Self {
        Self { api_key, client: Client::new() }
    }

    async fn generate(&self, model: String, body: GenerateBody) -> Result<String, StudioError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| StudioError::MissingCredential("HUGGINGFACE_API_KEY".into()))?;
        tracing::debug!(provider = PROVIDER, %model, "requesting completion");

        let response = self
            .client
            .post(format!("{HUGGINGFACE_BASE_URL}/{model}"))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| StudioError::transport(PROVIDER, e))?;
        if !response.status().is_success() {
            return Err(api_error(PROVIDER, response).await);
        }

        let value: Value = response.json().await.map_err(|e| StudioError::transport(PROVIDER, e))?;
        generated_text(&value).ok_or_else(|| {
            StudioError::transport(PROVIDER, "response did not contain generated_text")
        })
    }
}

#[derive(Debug, Serialize)]
struct GenerateBody {
    inputs: String,
    parameters: Parameters,
}

#[derive(Debug, Serialize)]
struct Parameters {
    max_new_tokens: u32,
    return_full_text: bool,
}

/// Flattens the conversation into a single prompt string.
fn flatten_prompt(request: &ChatRequest) -> String {
    let mut text = format!("{}\n\n", request.system_prompt);
    for turn in &request.history {
        let _ = write!(text, "{}: {}\n\n", turn.role.as_str(), turn.content);
    }
    let _ = write!(text, "user: {}\n\nassistant:", request.prompt);
    text
}

fn generated_text(value: &Value) -> Option<String> {
    let entry = value.as_array().and_then(|items| items.first()).unwrap_or(value);
    entry.get("generated_text").and_then(Value::as_str).map(str::to_string)
}

impl ChatProvider for HuggingFaceProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn stream_completion(&self, request: &ChatRequest) -> ChunkStream<'_> {
        let body = GenerateBody {
            inputs: flatten_prompt(request),
            parameters: Parameters { max_new_tokens: MAX_NEW_TOKENS, return_full_text: false },
        };
        let model = request.model.clone();
        Box::pin(
            stream::once(self.generate(model, body))
                .filter(|result| future::ready(!matches!(result, Ok(text) if text.is_empty()))),
        )
    }
}
