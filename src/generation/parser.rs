//! Final parsing of a completed model response.
//!
//! Parsing never fails: anything that does not yield a JSON object degrades
//! to "show the raw text, change no files".

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::session::model::FileAction;
use crate::session::tree::normalize_path;

/// One file operation requested by the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GeneratedFileOp {
    /// Normalized target path.
    pub path: String,
    /// What to do with the path.
    pub action: FileAction,
    /// New contents (empty for deletions).
    pub content: String,
}

/// Structured view of a model response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedResponse {
    /// Text shown to the user.
    pub conversation: String,
    /// The model's description of what it understood the request to be.
    pub intent_analysis: Option<String>,
    /// Shell commands the model suggests running.
    pub commands: Vec<String>,
    /// Accepted file operations, in response order.
    pub files: Vec<GeneratedFileOp>,
    /// Full raw text when no JSON could be parsed.
    pub raw_fallback: Option<String>,
}

/// Parses the complete streamed text of a response.
///
/// Tries a ```` ```json ```` fenced block first, then the span between the
/// first `{` and the last `}`. Entries in `files` without a usable path or a
/// known action are dropped individually.
#[must_use]
pub fn parse_response(text: &str) -> ParsedResponse {
    let object = candidates(text)
        .into_iter()
        .find_map(|candidate| match serde_json::from_str::<Value>(candidate) {
            Ok(Value::Object(map)) => Some(map),
            Ok(_) => None,
            Err(e) => {
                tracing::debug!(error = %e, "response candidate is not valid JSON");
                None
            }
        });

    let Some(object) = object else {
        tracing::warn!(len = text.len(), "model response is not JSON; showing raw text");
        return ParsedResponse {
            conversation: text.to_string(),
            raw_fallback: Some(text.to_string()),
            ..ParsedResponse::default()
        };
    };

    let conversation =
        object.get("conversation").and_then(Value::as_str).unwrap_or_default().to_string();
    let intent_analysis = object
        .get("intent_analysis")
        .or_else(|| object.get("intentAnalysis"))
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string);
    let commands = object
        .get("commands")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_str).map(str::to_string).collect())
        .unwrap_or_default();
    let files = object
        .get("files")
        .and_then(Value::as_array)
        .map(|entries| entries.iter().filter_map(file_op).collect())
        .unwrap_or_default();

    ParsedResponse { conversation, intent_analysis, commands, files, raw_fallback: None }
}

/// Substrings worth handing to the JSON parser, in priority order.
fn candidates(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    if let Some(start) = text.find("```json") {
        let body = &text[start + "```json".len()..];
        let end = body.find("```").unwrap_or(body.len());
        out.push(body[..end].trim());
    }
    if let (Some(first), Some(last)) = (text.find('{'), text.rfind('}')) {
        if first < last {
            out.push(&text[first..=last]);
        }
    }
    out
}

fn file_op(entry: &Value) -> Option<GeneratedFileOp> {
    let raw_path = entry.get("path").and_then(Value::as_str).unwrap_or_default();
    let Some(path) = normalize_path(raw_path) else {
        tracing::debug!(?entry, "dropping file entry without a path");
        return None;
    };
    let Some(action) = entry.get("action").and_then(Value::as_str).and_then(FileAction::parse)
    else {
        tracing::debug!(path = %path, "dropping file entry with unknown action");
        return None;
    };
    let content = entry.get("content").and_then(Value::as_str).unwrap_or_default().to_string();
    Some(GeneratedFileOp { path, action, content })
}
