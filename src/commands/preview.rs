//! `studio preview` command.

use std::path::Path;

use super::load;
use crate::config::StudioConfig;
use crate::context::ServiceContext;
use crate::preview::build_preview;

/// Execute the `preview` command.
///
/// Writes the page to `output` (or stdout). An error page is still written
/// so it can be opened, but the command then fails.
///
/// # Errors
///
/// Returns an error string if the session cannot be loaded, the page
/// cannot be written, or the preview could not be built.
pub fn run(
    ctx: &ServiceContext,
    config: &StudioConfig,
    session_id: &str,
    output: Option<&Path>,
) -> Result<(), String> {
    let session = load(ctx, config, session_id)?;
    let document = build_preview(&session.file_tree, ctx.transpiler.as_ref());

    match output {
        Some(path) => {
            ctx.fs
                .write(path, &document.html)
                .map_err(|e| format!("Failed to write {}: {e}", path.display()))?;
            eprintln!("Preview written to: {}", path.display());
        }
        None => print!("{}", document.html),
    }

    if document.is_error {
        return Err(format!("Preview of session {session_id} could not be built"));
    }
    Ok(())
}
