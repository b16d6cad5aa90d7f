//! Tracing subscriber setup for the `studio` binary.

use tracing_subscriber::EnvFilter;

/// Filter used when neither `STUDIO_LOG` nor `RUST_LOG` is set.
pub const DEFAULT_FILTER: &str = "warn";

/// Builds the log filter: `STUDIO_LOG`, then `RUST_LOG`, then [`DEFAULT_FILTER`].
#[must_use]
pub fn filter() -> EnvFilter {
    EnvFilter::try_from_env("STUDIO_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Installs the global subscriber writing to stderr.
///
/// Safe to call more than once; later calls are ignored.
pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter())
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
