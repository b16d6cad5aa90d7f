//! Virtual preview builder: turns a session's file tree into one HTML page.
//!
//! Static sites (`index.html` at the root) are served verbatim. Script
//! projects are stitched together in the browser: each module is
//! transpiled separately, relative imports are rewritten to import-map
//! keys, and packages come from a CDN.

pub mod document;
pub mod import_map;
pub mod resolve;

use std::collections::HashSet;

use crate::ports::Transpiler;
use crate::session::model::FileNode;
use crate::session::tree;

use self::import_map::ImportMap;

/// Entry files tried, in order, when there is no root `index.html`.
pub const ENTRY_CANDIDATES: [&str; 16] = [
    "index.tsx",
    "index.jsx",
    "index.ts",
    "index.js",
    "src/index.tsx",
    "src/index.jsx",
    "src/index.ts",
    "src/index.js",
    "src/main.tsx",
    "src/main.jsx",
    "src/main.ts",
    "src/main.js",
    "main.tsx",
    "main.jsx",
    "main.ts",
    "main.js",
];

const SOURCE_EXTENSIONS: [&str; 4] = [".ts", ".tsx", ".js", ".jsx"];

/// A renderable preview page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewDocument {
    /// Complete HTML document.
    pub html: String,
    /// `true` when `html` is the error page.
    pub is_error: bool,
}

impl PreviewDocument {
    fn error(message: &str) -> Self {
        tracing::warn!(%message, "preview failed");
        Self { html: document::error_document(message), is_error: true }
    }
}

/// Builds the preview document for `files`.
///
/// Never fails: a missing entry point or a module that will not transpile
/// yields the error page.
#[must_use]
pub fn build_preview(files: &[FileNode], transpiler: &dyn Transpiler) -> PreviewDocument {
    if let Some(index) = files.iter().find(|node| node.path == "index.html") {
        return PreviewDocument { html: index.content.clone(), is_error: false };
    }

    let paths: HashSet<&str> = files.iter().map(|node| node.path.as_str()).collect();
    let Some(entry) = ENTRY_CANDIDATES.iter().find(|candidate| paths.contains(**candidate)) else {
        return PreviewDocument::error(&format!(
            "No entry point found. Add index.html or one of: {}.",
            ENTRY_CANDIDATES[..4].join(", ")
        ));
    };

    let sources: Vec<&FileNode> = files.iter().filter(|node| is_source(&node.path)).collect();
    let local_ids: HashSet<String> = sources.iter().map(|node| resolve::module_id(&node.path)).collect();

    let mut imports = ImportMap::default();
    for node in sources {
        let source = resolve::strip_css_imports(&node.content);
        let source = resolve::rewrite_imports(&source, &node.path, &paths);
        let javascript = match transpiler.transpile(&node.path, &source) {
            Ok(javascript) => javascript,
            Err(message) => {
                return PreviewDocument::error(&format!("Failed to compile {}:\n{message}", node.path));
            }
        };
        for package in resolve::bare_specifiers(&javascript) {
            if !local_ids.contains(&package) {
                imports.add_package(&package);
            }
        }
        imports.add_module(resolve::module_id(&node.path), &javascript);
    }

    let styles: Vec<&str> = files
        .iter()
        .filter(|node| node.path.ends_with(".css"))
        .map(|node| node.content.as_str())
        .collect();

    tracing::debug!(entry = *entry, modules = paths.len(), "built preview");
    PreviewDocument {
        html: document::app_document(&imports.to_script_json(), &resolve::module_id(entry), &styles),
        is_error: false,
    }
}

fn is_source(path: &str) -> bool {
    !tree::is_placeholder(path) && SOURCE_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}
