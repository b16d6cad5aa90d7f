//! Assembles the provider request for a new user message.

use std::fmt::Write as _;

use super::model::ChatSession;
use super::tree;
use crate::ports::{ChatRequest, ChatTurn};

/// Per-file cap on contents embedded in the system prompt.
pub const MAX_FILE_BYTES: usize = 8 * 1024;

/// Maximum title length derived from the first user message.
pub const TITLE_CHARS: usize = 40;

const RESPONSE_FORMAT: &str = r#"You are an expert web developer working inside a browser code studio.
Reply with a single JSON object and nothing else:

{
  "conversation": "short message shown to the user",
  "intent_analysis": "one sentence describing what the user asked for",
  "commands": ["optional shell commands the user should run"],
  "files": [
    {"path": "src/App.js", "action": "created", "content": "full file contents"}
  ]
}

Rules:
- "action" is one of "created", "modified" or "deleted".
- Always send the complete contents of created and modified files.
- Paths use forward slashes and are relative to the project root.
- Put "conversation" first so it can be shown while you write the files.
- Write plain JavaScript ES modules with an index.js entry point. Use React through
  React.createElement (no JSX, no TypeScript) unless told otherwise."#;

/// Builds the system prompt: response format plus the current files.
#[must_use]
pub fn system_prompt(session: &ChatSession) -> String {
    let mut prompt = RESPONSE_FORMAT.to_string();
    let files: Vec<_> =
        session.file_tree.iter().filter(|node| !tree::is_placeholder(&node.path)).collect();

    if files.is_empty() {
        prompt.push_str("\n\nThe project is empty.");
        return prompt;
    }

    prompt.push_str("\n\nCurrent project files:\n");
    for node in files {
        let (content, truncated) = truncate(&node.content, MAX_FILE_BYTES);
        let _ = write!(prompt, "\n--- {} ---\n{content}", node.path);
        if truncated {
            let _ = write!(prompt, "\n[truncated, {} bytes total]", node.content.len());
        }
        prompt.push('\n');
    }
    prompt
}

/// Converts prior messages into provider turns.
#[must_use]
pub fn history(session: &ChatSession) -> Vec<ChatTurn> {
    session
        .messages
        .iter()
        .filter(|m| !m.content.is_empty())
        .map(|m| ChatTurn { role: m.role, content: m.content.clone() })
        .collect()
}

/// Builds the request for `prompt` before it is appended to the session.
#[must_use]
pub fn build_request(session: &ChatSession, model: &str, prompt: &str) -> ChatRequest {
    ChatRequest {
        model: model.to_string(),
        system_prompt: system_prompt(session),
        history: history(session),
        prompt: prompt.to_string(),
    }
}

/// Derives a session title from the first user message.
#[must_use]
pub fn derive_title(prompt: &str) -> String {
    let line = prompt.lines().map(str::trim).find(|l| !l.is_empty()).unwrap_or_default();
    if line.is_empty() {
        return ChatSession::DEFAULT_TITLE.to_string();
    }
    let mut title: String = line.chars().take(TITLE_CHARS).collect();
    if line.chars().count() > TITLE_CHARS {
        title = title.trim_end().to_string();
        title.push_str("...");
    }
    title
}

/// Cuts `text` to at most `max` bytes on a char boundary.
fn truncate(text: &str, max: usize) -> (&str, bool) {
    if text.len() <= max {
        return (text, false);
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    (&text[..end], true)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::session::model::{FileNode, Message, Role};

    #[test]
    fn empty_project_is_mentioned() {
        let session = ChatSession::new("s1", Utc::now());
        assert!(system_prompt(&session).ends_with("The project is empty."));
    }

    #[test]
    fn files_are_embedded_and_placeholders_skipped() {
        let mut session = ChatSession::new("s1", Utc::now());
        session.file_tree.push(FileNode::new("src/App.tsx", "export default 1;"));
        session.file_tree.push(FileNode::new("assets/.keep", ""));

        let prompt = system_prompt(&session);
        assert!(prompt.contains("--- src/App.tsx ---\nexport default 1;"));
        assert!(!prompt.contains(".keep"));
    }

    #[test]
    fn large_files_are_truncated() {
        let mut session = ChatSession::new("s1", Utc::now());
        session.file_tree.push(FileNode::new("big.js", "é".repeat(MAX_FILE_BYTES)));

        let prompt = system_prompt(&session);
        assert!(prompt.contains(&format!("[truncated, {} bytes total]", 2 * MAX_FILE_BYTES)));
        assert!(prompt.len() < RESPONSE_FORMAT.len() + MAX_FILE_BYTES + 200);
    }

    #[test]
    fn history_keeps_roles_in_order() {
        let mut session = ChatSession::new("s1", Utc::now());
        session.messages.push(Message::user("m1", "make a todo app"));
        session.messages.push(Message::assistant("m2", "Done"));
        session.messages.push(Message::assistant("m3", ""));

        let turns = build_request(&session, "gpt-4o", "add dark mode").history;
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role, Role::User);
        assert_eq!(turns[1].content, "Done");
    }

    #[test]
    fn title_is_first_line_capped() {
        assert_eq!(derive_title("  Build a landing page\nwith a hero"), "Build a landing page");
        assert_eq!(
            derive_title("Create a dashboard with charts, filters and a sidebar"),
            "Create a dashboard with charts, filters..."
        );
        assert_eq!(derive_title("   "), ChatSession::DEFAULT_TITLE);
    }
}
