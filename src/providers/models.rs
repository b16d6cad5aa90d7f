//! Catalog of selectable models and the provider serving each.

/// OpenAI chat-completions.
pub const OPENAI: &str = "openai";
/// OpenRouter (OpenAI-compatible).
pub const OPENROUTER: &str = "openrouter";
/// Google Gemini.
pub const GEMINI: &str = "gemini";
/// Hugging Face inference.
pub const HUGGINGFACE: &str = "huggingface";
/// Listed for selection but not backed by an adapter.
pub const ANTHROPIC: &str = "anthropic";

/// Every provider name a model can be routed to.
pub const PROVIDER_NAMES: &[&str] = &[OPENAI, OPENROUTER, GEMINI, HUGGINGFACE, ANTHROPIC];

/// Model used when neither the CLI nor the environment picks one.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// A model offered in the selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelInfo {
    /// Identifier sent to the provider.
    pub id: &'static str,
    /// Provider that serves the model.
    pub provider: &'static str,
    /// Display name.
    pub label: &'static str,
}

/// Built-in model list.
pub const CATALOG: &[ModelInfo] = &[
    ModelInfo { id: "gpt-4o", provider: OPENAI, label: "GPT-4o" },
    ModelInfo { id: "gpt-4o-mini", provider: OPENAI, label: "GPT-4o mini" },
    ModelInfo { id: "gemini-1.5-pro", provider: GEMINI, label: "Gemini 1.5 Pro" },
    ModelInfo { id: "gemini-1.5-flash", provider: GEMINI, label: "Gemini 1.5 Flash" },
    ModelInfo {
        id: "meta-llama/llama-3.1-70b-instruct",
        provider: OPENROUTER,
        label: "Llama 3.1 70B (OpenRouter)",
    },
    ModelInfo {
        id: "deepseek/deepseek-chat",
        provider: OPENROUTER,
        label: "DeepSeek Chat (OpenRouter)",
    },
    ModelInfo {
        id: "mistralai/Mistral-7B-Instruct-v0.3",
        provider: HUGGINGFACE,
        label: "Mistral 7B Instruct (Hugging Face)",
    },
    ModelInfo { id: "claude-3-5-sonnet-latest", provider: ANTHROPIC, label: "Claude 3.5 Sonnet" },
];

/// Looks a model up by its exact catalog ID.
#[must_use]
pub fn lookup(id: &str) -> Option<&'static ModelInfo> {
    CATALOG.iter().find(|model| model.id == id)
}

/// Maps a model reference to `(provider, provider-local model id)`.
///
/// Catalog IDs win; otherwise a `provider/model` prefix naming a known
/// provider routes the remainder to that provider.
#[must_use]
pub fn route(reference: &str) -> Option<(&'static str, String)> {
    if let Some(model) = lookup(reference) {
        return Some((model.provider, model.id.to_string()));
    }
    let (prefix, rest) = reference.split_once('/')?;
    let provider = PROVIDER_NAMES.iter().find(|name| **name == prefix)?;
    (!rest.is_empty()).then(|| (*provider, rest.to_string()))
}
