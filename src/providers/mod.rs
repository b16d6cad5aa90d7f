//! Provider registry: which adapter answers for which model.

pub mod models;

use std::collections::BTreeMap;

use crate::error::{StudioError, StudioResult};
use crate::ports::ChatProvider;

/// Chat providers keyed by name.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: BTreeMap<String, Box<dyn ChatProvider>>,
}

impl ProviderRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `provider` under its own name, replacing any previous one.
    pub fn register(&mut self, provider: Box<dyn ChatProvider>) {
        self.providers.insert(provider.name().to_string(), provider);
    }

    /// Names of the registered providers, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.providers.keys().map(String::as_str).collect()
    }

    /// Returns `true` if a provider with this name is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.providers.contains_key(name)
    }

    /// Resolves a model reference to a provider and its local model ID.
    ///
    /// # Errors
    ///
    /// Returns [`StudioError::UnknownModel`] when the reference routes
    /// nowhere and [`StudioError::UnsupportedProvider`] when it routes to a
    /// provider without an adapter.
    pub fn resolve(&self, model: &str) -> StudioResult<(&dyn ChatProvider, String)> {
        let (provider, model_id) =
            models::route(model).ok_or_else(|| StudioError::UnknownModel(model.to_string()))?;
        let adapter = self
            .providers
            .get(provider)
            .ok_or_else(|| StudioError::UnsupportedProvider(provider.to_string()))?;
        Ok((adapter.as_ref(), model_id))
    }
}
