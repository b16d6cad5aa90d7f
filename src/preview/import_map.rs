//! Browser import map assembled from transpiled modules.

use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Serialize;

/// CDN serving bare package specifiers as ES modules.
pub const CDN_BASE: &str = "https://esm.sh/";

/// The `{"imports": {...}}` document placed in `<script type="importmap">`.
#[derive(Debug, Default, Serialize)]
pub struct ImportMap {
    imports: BTreeMap<String, String>,
}

impl ImportMap {
    /// Registers a module's JavaScript under `id` as a data URL.
    pub fn add_module(&mut self, id: String, javascript: &str) {
        let url = format!("data:text/javascript;base64,{}", STANDARD.encode(javascript));
        self.imports.insert(id, url);
    }

    /// Maps a package specifier to the CDN unless already mapped.
    pub fn add_package(&mut self, specifier: &str) {
        self.imports
            .entry(specifier.to_string())
            .or_insert_with(|| format!("{CDN_BASE}{specifier}"));
    }

    /// Serializes the map for embedding inside a `<script>` element.
    #[must_use]
    pub fn to_script_json(&self) -> String {
        serde_json::to_string_pretty(self)
            .unwrap_or_else(|_| String::from("{\"imports\":{}}"))
            .replace("</", "<\\/")
    }
}

/// Decodes a data URL produced by [`ImportMap::add_module`].
#[cfg(test)]
pub(crate) fn decode_module_url(url: &str) -> Option<String> {
    let payload = url.strip_prefix("data:text/javascript;base64,")?;
    let bytes = STANDARD.decode(payload).ok()?;
    String::from_utf8(bytes).ok()
}
