//! Live adapter for OpenAI-compatible chat-completions APIs.
//!
//! Serves both OpenAI itself and OpenRouter, which speaks the same wire
//! format behind a different base URL.

use futures::{future, stream, StreamExt};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use super::{api_error, sse};
use crate::error::StudioError;
use crate::ports::{ChatProvider, ChatRequest, ChunkStream};

/// Default OpenAI API root.
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
/// OpenRouter API root.
pub const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Streaming client for `/chat/completions`.
pub struct OpenAiCompatibleProvider {
    name: &'static str,
    base_url: String,
    api_key: Option<String>,
    key_var: &'static str,
    client: Client,
}

impl OpenAiCompatibleProvider {
    /// Creates the OpenAI provider. `base_url` overrides the API root.
    #[must_use]
    pub fn openai(api_key: Option<String>, base_url: Option<String>) -> Self {
        Self {
            name: "openai",
            base_url: base_url.unwrap_or_else(|| OPENAI_BASE_URL.to_string()),
            api_key,
            key_var: "OPENAI_API_KEY",
            client: Client::new(),
        }
    }

    /// Creates the OpenRouter provider.
    #[must_use]
    pub fn openrouter(api_key: Option<String>) -> Self {
        Self {
            name: "openrouter",
            base_url: OPENROUTER_BASE_URL.to_string(),
            api_key,
            key_var: "OPENROUTER_API_KEY",
            client: Client::new(),
        }
    }

    async fn open(&self, body: CompletionBody) -> ChunkStream<'_> {
        let Some(api_key) = self.api_key.as_deref() else {
            return failed(StudioError::MissingCredential(self.key_var.to_string()));
        };
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        tracing::debug!(provider = self.name, %url, model = %body.model, "opening completion stream");

        let mut builder = self.client.post(&url).bearer_auth(api_key).json(&body);
        if self.name == "openrouter" {
            builder = builder.header("X-Title", "Codegen Studio");
        }
        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => return failed(StudioError::transport(self.name, e)),
        };
        if !response.status().is_success() {
            return failed(api_error(self.name, response).await);
        }

        let name = self.name;
        Box::pin(
            sse::data_events(response, name)
                .take_while(|event| future::ready(!matches!(event, Ok(data) if data.trim() == "[DONE]")))
                .filter_map(move |event| future::ready(event.map_or_else(|e| Some(Err(e)), |data| delta(name, &data)))),
        )
    }
}

/// Request body for `/chat/completions`.
#[derive(Debug, Serialize)]
struct CompletionBody {
    model: String,
    messages: Vec<WireMessage>,
    stream: bool,
}

/// One message in the request body.
#[derive(Debug, Serialize)]
struct WireMessage {
    role: &'static str,
    content: String,
}

impl CompletionBody {
    fn from_request(request: &ChatRequest) -> Self {
        let mut messages = vec![WireMessage { role: "system", content: request.system_prompt.clone() }];
        messages.extend(
            request
                .history
                .iter()
                .map(|turn| WireMessage { role: turn.role.as_str(), content: turn.content.clone() }),
        );
        messages.push(WireMessage { role: "user", content: request.prompt.clone() });
        Self { model: request.model.clone(), messages, stream: true }
    }
}

/// Extracts the text delta from one streamed event.
fn delta(provider: &str, data: &str) -> Option<Result<String, StudioError>> {
    let value: Value = match serde_json::from_str(data) {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!(provider, error = %e, "skipping undecodable stream event");
            return None;
        }
    };
    if let Some(message) = value.pointer("/error/message").and_then(Value::as_str) {
        return Some(Err(StudioError::transport(provider, message)));
    }
    value
        .pointer("/choices/0/delta/content")
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
        .map(|text| Ok(text.to_string()))
}

fn failed(err: StudioError) -> ChunkStream<'static> {
    Box::pin(stream::once(future::ready(Err(err))))
}

impl ChatProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        self.name
    }

    fn stream_completion(&self, request: &ChatRequest) -> ChunkStream<'_> {
        let body = CompletionBody::from_request(request);
        Box::pin(stream::once(self.open(body)).flatten())
    }
}
