//! `studio new` command.

use super::{block_on, save};
use crate::config::StudioConfig;
use crate::context::ServiceContext;
use crate::session::{GenerationSettings, SessionManager};

/// Execute the `new` command: create, save and print a session ID.
///
/// # Errors
///
/// Returns an error string if the title is blank or saving fails.
pub fn run(ctx: &ServiceContext, config: &StudioConfig, title: Option<&str>) -> Result<(), String> {
    let manager = SessionManager::new(ctx, GenerationSettings::from(config));
    let id = manager.create_session();
    let session = block_on(async {
        if let Some(title) = title {
            manager.rename_session(&id, title).await?;
        }
        manager.snapshot(&id).await
    })?
    .map_err(|e| e.to_string())?;

    save(ctx, config, &session)?;
    println!("{id}");
    Ok(())
}
