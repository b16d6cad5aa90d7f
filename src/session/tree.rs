//! Operations on a session's virtual file tree.
//!
//! The tree is a flat, insertion-ordered list of [`FileNode`]s. Directories
//! are derived from paths; an empty folder is kept alive by a zero-length
//! `<folder>/.keep` placeholder.

use std::collections::BTreeSet;

use super::model::{ChatSession, FileNode};
use crate::error::{StudioError, StudioResult};

/// File name of the placeholder that keeps an empty folder visible.
pub const FOLDER_PLACEHOLDER: &str = ".keep";

/// Entry-point names preferred when choosing a default active file.
const DEFAULT_ACTIVE_NAMES: [&str; 5] =
    ["index.tsx", "index.jsx", "index.ts", "index.js", "index.html"];

/// Normalizes a model- or user-supplied path.
///
/// Backslashes become `/`, leading `./` and `/` are stripped and empty
/// segments collapse. Returns `None` when nothing usable remains.
#[must_use]
pub fn normalize_path(raw: &str) -> Option<String> {
    let replaced = raw.trim().replace('\\', "/");
    let segments: Vec<&str> =
        replaced.split('/').filter(|s| !s.is_empty() && *s != ".").collect();
    if segments.is_empty() {
        None
    } else {
        Some(segments.join("/"))
    }
}

/// Inserts a file or replaces the contents of the node with the same path.
///
/// Returns `true` when a new node was appended.
pub fn upsert(session: &mut ChatSession, path: &str, content: &str) -> bool {
    if let Some(node) = session.file_tree.iter_mut().find(|n| n.path == path) {
        content.clone_into(&mut node.content);
        false
    } else {
        session.file_tree.push(FileNode::new(path, content));
        true
    }
}

/// Removes the node at `path`, clearing the active file if it pointed there.
///
/// Returns `true` when a node was removed.
pub fn remove(session: &mut ChatSession, path: &str) -> bool {
    let before = session.file_tree.len();
    session.file_tree.retain(|n| n.path != path);
    if session.active_file.as_deref() == Some(path) {
        session.active_file = None;
    }
    session.file_tree.len() != before
}

/// Picks a default active file when none is set.
///
/// Prefers the first node whose file name is `index.(tsx|jsx|ts|js|html)`,
/// otherwise the first node in tree order.
pub fn select_default_active(session: &mut ChatSession) {
    if session.active_node().is_some() {
        return;
    }
    session.active_file = session
        .file_tree
        .iter()
        .find(|n| DEFAULT_ACTIVE_NAMES.contains(&file_name(&n.path)))
        .or_else(|| session.file_tree.first())
        .map(|n| n.path.clone());
}

/// Makes `path` the active file.
///
/// # Errors
///
/// Returns [`StudioError::FileNotFound`] when no node has that path.
pub fn set_active(session: &mut ChatSession, path: &str) -> StudioResult<()> {
    let path = existing_path(session, path)?;
    session.active_file = Some(path);
    Ok(())
}

/// Normalizes `raw` and checks that a node has the result as its path.
fn existing_path(session: &ChatSession, raw: &str) -> StudioResult<String> {
    normalize_path(raw)
        .filter(|path| session.file_tree.iter().any(|n| &n.path == path))
        .ok_or_else(|| StudioError::FileNotFound(raw.to_string()))
}

/// Creates an empty folder by adding its placeholder file.
///
/// # Errors
///
/// Returns [`StudioError::InvalidPath`] for an empty folder name.
pub fn create_folder(session: &mut ChatSession, folder: &str) -> StudioResult<String> {
    let folder =
        normalize_path(folder).ok_or_else(|| StudioError::InvalidPath(folder.to_string()))?;
    let placeholder = format!("{folder}/{FOLDER_PLACEHOLDER}");
    upsert(session, &placeholder, "");
    Ok(placeholder)
}

/// Moves a file to a new path.
///
/// The active file is cleared when it was the renamed file.
///
/// # Errors
///
/// Returns an error when the source is missing, the target is invalid, or
/// the target path is already taken.
pub fn rename(session: &mut ChatSession, from: &str, to: &str) -> StudioResult<()> {
    let from = existing_path(session, from)?;
    let to = normalize_path(to).ok_or_else(|| StudioError::InvalidPath(to.to_string()))?;
    if session.file_tree.iter().any(|n| n.path == to) {
        return Err(StudioError::PathExists(to));
    }
    if let Some(node) = session.file_tree.iter_mut().find(|n| n.path == from) {
        node.path = to;
    }
    if session.active_file.as_deref() == Some(from.as_str()) {
        session.active_file = None;
    }
    Ok(())
}

/// Lists every directory implied by the tree's paths, sorted.
#[must_use]
pub fn folders(session: &ChatSession) -> BTreeSet<String> {
    let mut out = BTreeSet::new();
    for node in &session.file_tree {
        let mut prefix = String::new();
        let segments: Vec<&str> = node.path.split('/').collect();
        for segment in &segments[..segments.len().saturating_sub(1)] {
            if !prefix.is_empty() {
                prefix.push('/');
            }
            prefix.push_str(segment);
            out.insert(prefix.clone());
        }
    }
    out
}

/// Returns `true` for folder placeholder nodes.
#[must_use]
pub fn is_placeholder(path: &str) -> bool {
    file_name(path) == FOLDER_PLACEHOLDER
}

fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
