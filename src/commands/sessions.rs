//! `studio sessions` and `studio show` commands.

use super::{load, store};
use crate::config::StudioConfig;
use crate::context::ServiceContext;
use crate::session::model::{ChatSession, FileStatus, Message, Role};
use crate::session::tree;

/// Execute the `sessions` command.
///
/// # Errors
///
/// Returns an error string if the session directory cannot be listed.
pub fn list(ctx: &ServiceContext, config: &StudioConfig) -> Result<(), String> {
    let summaries = store(ctx, config).list().map_err(|e| e.to_string())?;
    if summaries.is_empty() {
        println!("No sessions found. Use `studio new` to start one.");
        return Ok(());
    }
    for summary in summaries {
        println!(
            "{}  {}  {} messages, {} files  {}",
            summary.id,
            summary.last_updated.format("%Y-%m-%d %H:%M"),
            summary.messages,
            summary.files,
            summary.title
        );
    }
    Ok(())
}

/// Execute the `show` command.
///
/// Prints the whole session, or one file's contents when `file` is given.
///
/// # Errors
///
/// Returns an error string if the session or file does not exist.
pub fn show(
    ctx: &ServiceContext,
    config: &StudioConfig,
    session_id: &str,
    file: Option<&str>,
) -> Result<(), String> {
    let session = load(ctx, config, session_id)?;

    if let Some(path) = file {
        let path = tree::normalize_path(path).unwrap_or_default();
        let node = session
            .file_tree
            .iter()
            .find(|node| node.path == path)
            .ok_or_else(|| format!("file '{path}' not found in session {session_id}"))?;
        print!("{}", node.content);
        return Ok(());
    }

    print_session(&session);
    Ok(())
}

fn print_session(session: &ChatSession) {
    println!("Session: {}", session.id);
    println!("Title: {}", session.title);
    println!("Updated: {}", session.last_updated.to_rfc3339());

    println!("\nConversation:");
    if session.messages.is_empty() {
        println!("  (no messages)");
    }
    for message in &session.messages {
        print_message(message);
    }

    println!("\nFiles:");
    if session.file_tree.is_empty() {
        println!("  (empty)");
    }
    let folders: Vec<String> = tree::folders(session).into_iter().collect();
    if !folders.is_empty() {
        println!("  folders: {}", folders.join(", "));
    }
    for node in &session.file_tree {
        let marker = if session.active_file.as_deref() == Some(node.path.as_str()) { "*" } else { " " };
        println!("{marker} {} ({} bytes)", node.path, node.content.len());
    }
}

fn print_message(message: &Message) {
    let author = match message.role {
        Role::User => "you",
        Role::Assistant => "assistant",
    };
    println!("\n[{author}] {}", message.content);

    if let Some(intent) = &message.intent_analysis {
        println!("  intent: {intent}");
    }
    for command in &message.commands {
        println!("  $ {command}");
    }
    if let Some(info) = &message.generation_info {
        for file in &info.files {
            let status = match file.status {
                FileStatus::Generating => "pending",
                FileStatus::Complete => "done",
                FileStatus::Error => "not applied",
            };
            println!("  {} {} [{status}]", file.action.as_str(), file.path);
        }
    }
}
