//! `studio models` command.

use crate::config::StudioConfig;
use crate::context::ServiceContext;
use crate::providers::models::CATALOG;

/// Execute the `models` command.
///
/// Lists the catalog, marking the default model and models whose provider
/// has no adapter in this build.
///
/// # Errors
///
/// Never fails; returns `Result` to match the other handlers.
pub fn run(ctx: &ServiceContext, config: &StudioConfig) -> Result<(), String> {
    let width = CATALOG.iter().map(|m| m.id.len()).max().unwrap_or(0);
    for model in CATALOG {
        let marker = if model.id == config.default_model { "*" } else { " " };
        let availability =
            if ctx.providers.contains(model.provider) { "" } else { "  (not implemented)" };
        println!(
            "{marker} {:<width$}  {:<12} {}{availability}",
            model.id, model.provider, model.label
        );
    }
    println!("\nProviders with an adapter: {}", ctx.providers.names().join(", "));
    println!("Any `<provider>/<model>` reference also routes to that provider.");
    Ok(())
}
