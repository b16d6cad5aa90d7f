//! Chat sessions: data model, file tree edits, prompts and the manager.

pub mod manager;
pub mod model;
pub mod prompt;
pub mod tree;

pub use manager::{GenerationSettings, SessionManager};
pub use model::{ChatSession, FileNode, Message};
