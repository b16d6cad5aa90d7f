//! `studio chat` command.

use std::io::Write as _;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use super::{block_on, load, save};
use crate::cli::ChatArgs;
use crate::config::StudioConfig;
use crate::context::ServiceContext;
use crate::error::StudioError;
use crate::generation::{GenerationObserver, GenerationOutcome};
use crate::session::model::{ChatSession, GenerationFile, Message};
use crate::session::{GenerationSettings, SessionManager};

/// Prints a generation as it happens.
///
/// Conversation text is written incrementally; each file line appears when
/// the operation is applied to the tree.
#[derive(Default)]
pub struct CliObserver {
    printed: Mutex<String>,
}

impl CliObserver {
    fn printed(&self) -> std::sync::MutexGuard<'_, String> {
        self.printed.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl GenerationObserver for CliObserver {
    fn on_conversation(&self, text: &str) {
        let mut printed = self.printed();
        if let Some(delta) = text.strip_prefix(printed.as_str()) {
            print!("{delta}");
            let _ = std::io::stdout().flush();
            printed.push_str(delta);
        }
    }

    fn on_files_planned(&self, files: &[GenerationFile]) {
        println!("\n\nApplying {} file operation(s):", files.len());
    }

    fn on_file_applied(&self, file: &GenerationFile, _session: &ChatSession) {
        println!("  {} {}", file.action.as_str(), file.path);
    }

    fn on_finished(&self, message: &Message) {
        let printed = self.printed();
        match message.content.strip_prefix(printed.as_str()) {
            Some(rest) if !rest.is_empty() => println!("{rest}"),
            Some(_) if message.generation_info.is_none() => println!(),
            Some(_) => {}
            None => println!("\n{}", message.content),
        }
        if !message.commands.is_empty() {
            println!("\nSuggested commands:");
            for command in &message.commands {
                println!("  $ {command}");
            }
        }
    }
}

/// Execute the `chat` command.
///
/// Loads the session, streams the model's reply, applies its files and
/// saves the result. Ctrl-C cancels the stream; files already applied stay.
///
/// # Errors
///
/// Returns an error string if the session cannot be loaded or saved.
/// Provider failures are reported in the conversation, not as errors.
pub fn run(ctx: &ServiceContext, config: &StudioConfig, args: &ChatArgs) -> Result<(), String> {
    let mut settings = GenerationSettings::from(config);
    if let Some(ms) = args.pacing_ms {
        settings.pacing = Duration::from_millis(ms);
    }
    let manager = SessionManager::new(ctx, settings);
    manager.insert(load(ctx, config, &args.session)?);

    let observer = CliObserver::default();
    let id = args.session.as_str();
    let (report, session) = block_on(async {
        let send = manager.send(id, &args.prompt, args.model.as_deref(), &observer);
        tokio::pin!(send);
        let report = tokio::select! {
            report = &mut send => report,
            Ok(()) = tokio::signal::ctrl_c() => {
                manager.cancel(id);
                send.await
            }
        };
        Ok::<_, StudioError>((report?, manager.snapshot(id).await?))
    })?
    .map_err(|e| e.to_string())?;

    save(ctx, config, &session)?;

    match report.outcome {
        GenerationOutcome::Completed { .. } => {}
        GenerationOutcome::Degraded => {
            eprintln!("The response was not in the expected format; no files were changed.");
        }
        GenerationOutcome::StreamFailed(reason) | GenerationOutcome::ProviderUnavailable(reason) => {
            tracing::warn!(session = %id, %reason, "generation did not complete");
        }
        GenerationOutcome::Cancelled { applied } => {
            eprintln!("Generation cancelled; {applied} file operation(s) were applied.");
        }
    }
    Ok(())
}
