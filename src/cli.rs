//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI parser for `studio`.
#[derive(Debug, Parser)]
#[command(name = "studio", version, about = "Chat with a model to generate and preview web projects")]
pub struct Cli {
    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create an empty session and print its ID.
    New {
        /// Initial title instead of one derived from the first message.
        #[arg(long)]
        title: Option<String>,
    },
    /// Send a message and stream the response into the session.
    Chat(ChatArgs),
    /// List saved sessions, most recent first.
    Sessions,
    /// Print a session's conversation and file tree.
    Show {
        /// Session ID.
        session: String,
        /// Print the contents of this file instead.
        #[arg(long)]
        file: Option<String>,
    },
    /// Render a session's files into a single HTML preview page.
    Preview {
        /// Session ID.
        session: String,
        /// Write the page here instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List known models and whether their provider is available.
    Models,
    /// Change a session's title.
    Rename {
        /// Session ID.
        session: String,
        /// New title.
        title: String,
    },
    /// Create an empty folder in a session's file tree.
    Mkdir {
        /// Session ID.
        session: String,
        /// Folder path.
        folder: String,
    },
    /// Rename a file in a session's file tree.
    Mv {
        /// Session ID.
        session: String,
        /// Current path.
        from: String,
        /// New path.
        to: String,
    },
    /// Make a file the session's active file.
    Open {
        /// Session ID.
        session: String,
        /// File path.
        path: String,
    },
}

/// Arguments for `studio chat`.
#[derive(Debug, Args)]
pub struct ChatArgs {
    /// Session ID.
    pub session: String,
    /// Message to send.
    pub prompt: String,
    /// Model ID or `provider/model` reference.
    #[arg(long)]
    pub model: Option<String>,
    /// Delay before each file is applied, in milliseconds.
    #[arg(long)]
    pub pacing_ms: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command};
    use clap::Parser;

    #[test]
    fn parses_chat_with_overrides() {
        let cli = Cli::parse_from([
            "studio",
            "chat",
            "s1",
            "make a todo app",
            "--model",
            "openrouter/mistralai/mistral-7b-instruct",
            "--pacing-ms",
            "0",
        ]);
        let Command::Chat(args) = cli.command else { panic!("expected chat") };
        assert_eq!(args.session, "s1");
        assert_eq!(args.prompt, "make a todo app");
        assert_eq!(args.model.as_deref(), Some("openrouter/mistralai/mistral-7b-instruct"));
        assert_eq!(args.pacing_ms, Some(0));
    }

    #[test]
    fn parses_preview_output() {
        let cli = Cli::parse_from(["studio", "preview", "s1", "-o", "out.html"]);
        assert!(matches!(
            cli.command,
            Command::Preview { ref session, output: Some(ref path) } if session == "s1" && path.ends_with("out.html")
        ));
    }

    #[test]
    fn chat_requires_a_prompt() {
        assert!(Cli::try_parse_from(["studio", "chat", "s1"]).is_err());
    }
}
