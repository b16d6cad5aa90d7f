//! Session data model: chat sessions, messages and the virtual file tree.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single file in a session's virtual file tree.
///
/// Identity is the `path`; directories are implied by `/` separators.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileNode {
    /// Forward-slash separated path, unique within a tree.
    pub path: String,
    /// Full file contents.
    pub content: String,
}

impl FileNode {
    /// Creates a node from a path and its contents.
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self { path: path.into(), content: content.into() }
    }
}

/// What a generated file operation does to its target path.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FileAction {
    /// The model created a new file.
    Created,
    /// The model rewrote an existing file.
    Modified,
    /// The model removed a file.
    Deleted,
}

impl FileAction {
    /// Parses the action names emitted by the model.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "created" => Some(Self::Created),
            "modified" => Some(Self::Modified),
            "deleted" => Some(Self::Deleted),
            _ => None,
        }
    }

    /// Returns the wire name of the action.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Modified => "modified",
            Self::Deleted => "deleted",
        }
    }
}

/// Progress of a single file within one assistant response.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    /// Waiting to be applied.
    Generating,
    /// Applied to the file tree.
    Complete,
    /// Never applied (the generation was cancelled first).
    Error,
}

/// Per-file status badge attached to an assistant message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenerationFile {
    /// Target path.
    pub path: String,
    /// Operation applied to the path.
    pub action: FileAction,
    /// Current progress.
    pub status: FileStatus,
}

/// Overall progress of an assistant response.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GenerationStatus {
    /// Stream or materialization still running (or was interrupted).
    Generating,
    /// Every file operation has been applied.
    Complete,
}

/// File generation state recorded on an assistant message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenerationInfo {
    /// Overall status.
    pub status: GenerationStatus,
    /// Files touched by this response, in application order.
    pub files: Vec<GenerationFile>,
}

/// Who authored a message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The human.
    User,
    /// The model (or a synthetic error reply).
    Assistant,
}

impl Role {
    /// Returns the role name used by chat-completion APIs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// One chat message. Messages are append-only within a session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    /// Unique message ID.
    pub id: String,
    /// Author.
    pub role: Role,
    /// Displayed text.
    pub content: String,
    /// The model's intent analysis, when it provided one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent_analysis: Option<String>,
    /// Shell commands the model suggested running.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub commands: Vec<String>,
    /// File generation progress for assistant messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation_info: Option<GenerationInfo>,
}

impl Message {
    /// Creates a plain user message.
    pub fn user(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: Role::User,
            content: content.into(),
            intent_analysis: None,
            commands: Vec::new(),
            generation_info: None,
        }
    }

    /// Creates a plain assistant message without generation info.
    pub fn assistant(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, ..Self::user(id, content) }
    }
}

/// An independent conversation and the virtual file tree it owns.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatSession {
    /// Unique session ID.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Conversation history.
    pub messages: Vec<Message>,
    /// Flat path -> content list in insertion order.
    pub file_tree: Vec<FileNode>,
    /// Path of the file currently shown in the editor.
    pub active_file: Option<String>,
    /// Time of the last change.
    pub last_updated: DateTime<Utc>,
}

impl ChatSession {
    /// Title given to sessions before their first message.
    pub const DEFAULT_TITLE: &'static str = "New Project";

    /// Creates an empty session.
    pub fn new(id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            title: Self::DEFAULT_TITLE.to_string(),
            messages: Vec::new(),
            file_tree: Vec::new(),
            active_file: None,
            last_updated: now,
        }
    }

    /// Returns the node the active file points at.
    #[must_use]
    pub fn active_node(&self) -> Option<&FileNode> {
        let path = self.active_file.as_deref()?;
        self.file_tree.iter().find(|node| node.path == path)
    }

    /// Returns the most recent assistant message's generation info.
    #[must_use]
    pub fn latest_generation(&self) -> Option<&GenerationInfo> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::Assistant)
            .and_then(|m| m.generation_info.as_ref())
    }
}
