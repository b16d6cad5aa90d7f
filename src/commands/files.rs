//! Session edits outside of generation: title and file tree.

use super::{block_on, load, save};
use crate::config::StudioConfig;
use crate::context::ServiceContext;
use crate::error::{StudioError, StudioResult};
use crate::session::model::ChatSession;
use crate::session::{tree, GenerationSettings, SessionManager};

/// Execute the `rename` command.
///
/// # Errors
///
/// Returns an error string if the session is missing or the title blank.
pub fn rename_session(
    ctx: &ServiceContext,
    config: &StudioConfig,
    session_id: &str,
    title: &str,
) -> Result<(), String> {
    let manager = loaded_manager(ctx, config, session_id)?;
    let session = block_on(async {
        manager.rename_session(session_id, title).await?;
        manager.snapshot(session_id).await
    })?
    .map_err(|e| e.to_string())?;
    save(ctx, config, &session)?;
    println!("Renamed {session_id} to \"{}\"", session.title);
    Ok(())
}

/// Execute the `mkdir` command.
///
/// # Errors
///
/// Returns an error string if the session is missing or the folder invalid.
pub fn mkdir(
    ctx: &ServiceContext,
    config: &StudioConfig,
    session_id: &str,
    folder: &str,
) -> Result<(), String> {
    let created = edit(ctx, config, session_id, |session| tree::create_folder(session, folder))?;
    println!("Created {created}");
    Ok(())
}

/// Execute the `mv` command.
///
/// # Errors
///
/// Returns an error string if the session or source file is missing, or
/// the target already exists.
pub fn mv(
    ctx: &ServiceContext,
    config: &StudioConfig,
    session_id: &str,
    from: &str,
    to: &str,
) -> Result<(), String> {
    edit(ctx, config, session_id, |session| tree::rename(session, from, to))?;
    println!("Moved {from} -> {to}");
    Ok(())
}

/// Execute the `open` command.
///
/// # Errors
///
/// Returns an error string if the session or file is missing.
pub fn open(
    ctx: &ServiceContext,
    config: &StudioConfig,
    session_id: &str,
    path: &str,
) -> Result<(), String> {
    edit(ctx, config, session_id, |session| tree::set_active(session, path))?;
    println!("Active file: {path}");
    Ok(())
}

fn loaded_manager<'a>(
    ctx: &'a ServiceContext,
    config: &StudioConfig,
    session_id: &str,
) -> Result<SessionManager<'a>, String> {
    let manager = SessionManager::new(ctx, GenerationSettings::from(config));
    manager.insert(load(ctx, config, session_id)?);
    Ok(manager)
}

/// Loads a session, applies `change` through the manager and saves it.
fn edit<T>(
    ctx: &ServiceContext,
    config: &StudioConfig,
    session_id: &str,
    change: impl FnOnce(&mut ChatSession) -> StudioResult<T>,
) -> Result<T, String> {
    let manager = loaded_manager(ctx, config, session_id)?;
    let (value, session) = block_on(async {
        let value = manager.edit(session_id, change).await?;
        Ok::<_, StudioError>((value, manager.snapshot(session_id).await?))
    })?
    .map_err(|e| e.to_string())?;
    save(ctx, config, &session)?;
    Ok(value)
}
