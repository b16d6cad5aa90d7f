//! Core library entry for the `studio` CLI.
//!
//! A chat-driven code generation studio: each session pairs a conversation
//! with a virtual file tree. Model replies stream in, their conversational
//! text is shown as it arrives, and the files they carry are applied to the
//! tree one at a time. Any session can be rendered into a single-page
//! preview.

pub mod adapters;
pub mod cassette;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod generation;
pub mod logging;
pub mod ports;
pub mod preview;
pub mod providers;
pub mod session;
pub mod store;

#[cfg(test)]
mod testing;

use clap::Parser;

/// Run the CLI with the provided arguments.
///
/// # Errors
///
/// Returns an error string when argument parsing fails or command execution fails.
pub fn run<I, T>(args: I) -> Result<(), String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = cli::Cli::try_parse_from(args).map_err(|err| err.to_string())?;
    commands::dispatch(&cli.command)
}
