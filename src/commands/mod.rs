//! Command dispatch and handlers.

pub mod chat;
pub mod files;
pub mod models;
pub mod new;
pub mod preview;
pub mod sessions;

use std::future::Future;
use std::sync::PoisonError;

use chrono::Utc;

use crate::cli::Command;
use crate::config::StudioConfig;
use crate::context::ServiceContext;
use crate::session::model::ChatSession;
use crate::store::SessionStore;

/// Dispatch a parsed command to its handler.
///
/// `STUDIO_REPLAY=<file>` serves provider, clock and ID traffic from a
/// cassette. `STUDIO_RECORD=<dir>` captures that traffic into a new
/// cassette in the directory.
///
/// # Errors
///
/// Returns an error string if configuration is invalid or the selected
/// command handler fails.
pub fn dispatch(command: &Command) -> Result<(), String> {
    let config = StudioConfig::from_env()?;

    if let Some(path) = &config.replay_cassette {
        let ctx = ServiceContext::replaying(path)?;
        return dispatch_with_context(command, &ctx, &config);
    }

    if let Some(dir) = &config.record_dir {
        let path = dir.join(format!("{}.cassette.yaml", Utc::now().format("%Y%m%dT%H%M%S")));
        let (ctx, recorder) = ServiceContext::recording(&config, &path);
        let result = dispatch_with_context(command, &ctx, &config);

        // Drop context first to release the recorder's other references
        drop(ctx);
        let recorder = recorder.lock().unwrap_or_else(PoisonError::into_inner);
        let saved = recorder
            .save()
            .map_err(|e| format!("Failed to save cassette {}: {e}", recorder.path().display()))?;
        eprintln!("Recording saved to: {}", saved.display());
        return result;
    }

    let ctx = ServiceContext::live(&config);
    dispatch_with_context(command, &ctx, &config)
}

/// Dispatch a command with the given service context.
fn dispatch_with_context(
    command: &Command,
    ctx: &ServiceContext,
    config: &StudioConfig,
) -> Result<(), String> {
    match command {
        Command::New { title } => new::run(ctx, config, title.as_deref()),
        Command::Chat(args) => chat::run(ctx, config, args),
        Command::Sessions => sessions::list(ctx, config),
        Command::Show { session, file } => sessions::show(ctx, config, session, file.as_deref()),
        Command::Preview { session, output } => {
            preview::run(ctx, config, session, output.as_deref())
        }
        Command::Models => models::run(ctx, config),
        Command::Rename { session, title } => files::rename_session(ctx, config, session, title),
        Command::Mkdir { session, folder } => files::mkdir(ctx, config, session, folder),
        Command::Mv { session, from, to } => files::mv(ctx, config, session, from, to),
        Command::Open { session, path } => files::open(ctx, config, session, path),
    }
}

/// Runs `future` to completion on a current-thread runtime.
fn block_on<F: Future>(future: F) -> Result<F::Output, String> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("Failed to start async runtime: {e}"))?;
    Ok(runtime.block_on(future))
}

fn store<'a>(ctx: &'a ServiceContext, config: &StudioConfig) -> SessionStore<'a> {
    SessionStore::new(ctx.fs.as_ref(), &config.home)
}

fn load(ctx: &ServiceContext, config: &StudioConfig, id: &str) -> Result<ChatSession, String> {
    store(ctx, config).load(id).map_err(|e| e.to_string())
}

fn save(ctx: &ServiceContext, config: &StudioConfig, session: &ChatSession) -> Result<(), String> {
    store(ctx, config).save(session).map_err(|e| e.to_string())
}
