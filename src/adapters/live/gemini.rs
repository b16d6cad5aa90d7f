//! Live adapter for the Gemini `streamGenerateContent` API.

use futures::{future, stream, StreamExt};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use super::{api_error, sse};
use crate::error::StudioError;
use crate::ports::{ChatProvider, ChatRequest, ChunkStream};
use crate::session::model::Role;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const PROVIDER: &str = "gemini";

/// Streaming Gemini client using server-sent events.
pub struct GeminiProvider {
    api_key: Option<String>,
    client: Client,
}

impl GeminiProvider {
    /// Creates a Gemini provider.
    #[must_use]
    pub fn new(api_key: Option<String>) -> Self {
        Self { api_key, client: Client::new() }
    }

    async fn open(&self, model: String, body: GenerateBody) -> ChunkStream<'_> {
        let Some(api_key) = self.api_key.as_deref() else {
            return failed(StudioError::MissingCredential("GEMINI_API_KEY".into()));
        };
        let url = format!("{GEMINI_BASE_URL}/models/{model}:streamGenerateContent?alt=sse");
        tracing::debug!(provider = PROVIDER, %model, "opening completion stream");

        let response =
            match self.client.post(&url).header("x-goog-api-key", api_key).json(&body).send().await {
                Ok(response) => response,
                Err(e) => return failed(StudioError::transport(PROVIDER, e)),
            };
        if !response.status().is_success() {
            return failed(api_error(PROVIDER, response).await);
        }

        Box::pin(sse::data_events(response, PROVIDER).filter_map(|event| {
            future::ready(event.map_or_else(|e| Some(Err(e)), |data| candidate_text(&data)))
        }))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateBody {
    system_instruction: Content,
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

impl Content {
    fn text(role: Option<&'static str>, text: &str) -> Self {
        Self { role, parts: vec![Part { text: text.to_string() }] }
    }
}

impl GenerateBody {
    fn from_request(request: &ChatRequest) -> Self {
        let mut contents: Vec<Content> = request
            .history
            .iter()
            .map(|turn| {
                let role = match turn.role {
                    Role::User => "user",
                    Role::Assistant => "model",
                };
                Content::text(Some(role), &turn.content)
            })
            .collect();
        contents.push(Content::text(Some("user"), &request.prompt));
        Self { system_instruction: Content::text(None, &request.system_prompt), contents }
    }
}

/// Concatenates the text parts of the first candidate in one event.
fn candidate_text(data: &str) -> Option<Result<String, StudioError>> {
    let value: Value = match serde_json::from_str(data) {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!(provider = PROVIDER, error = %e, "skipping undecodable stream event");
            return None;
        }
    };
    if let Some(message) = value.pointer("/error/message").and_then(Value::as_str) {
        return Some(Err(StudioError::transport(PROVIDER, message)));
    }
    let text: String = value
        .pointer("/candidates/0/content/parts")
        .and_then(Value::as_array)?
        .iter()
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect();
    (!text.is_empty()).then_some(Ok(text))
}

fn failed(err: StudioError) -> ChunkStream<'static> {
    Box::pin(stream::once(future::ready(Err(err))))
}

impl ChatProvider for GeminiProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn stream_completion(&self, request: &ChatRequest) -> ChunkStream<'_> {
        let body = GenerateBody::from_request(request);
        Box::pin(stream::once(self.open(request.model.clone(), body)).flatten())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::ChatTurn;

    #[test]
    fn assistant_turns_use_model_role() {
        let request = ChatRequest {
            model: "gemini-1.5-flash".into(),
            system_prompt: "rules".into(),
            history: vec![
                ChatTurn { role: Role::User, content: "make a page".into() },
                ChatTurn { role: Role::Assistant, content: "done".into() },
            ],
            prompt: "add a footer".into(),
        };

        let body = serde_json::to_value(GenerateBody::from_request(&request)).unwrap();

        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "rules");
        assert!(body["systemInstruction"].get("role").is_none());
        assert_eq!(body["contents"][1]["role"], "model");
        assert_eq!(body["contents"][2]["parts"][0]["text"], "add a footer");
    }

    #[test]
    fn candidate_parts_are_joined() {
        let data = r#"{"candidates":[{"content":{"parts":[{"text":"Hel"},{"text":"lo"}]}}]}"#;
        assert_eq!(candidate_text(data).unwrap().unwrap(), "Hello");

        let finish_only = r#"{"candidates":[{"finishReason":"STOP"}]}"#;
        assert!(candidate_text(finish_only).is_none());
    }
}
