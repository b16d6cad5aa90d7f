//! Transpiler port used by the preview builder.

/// Turns one source module (TS, TSX, JSX or JS) into browser JavaScript.
///
/// The preview builder receives this as a capability instead of looking a
/// transpiler up globally, so hosts can plug in whatever they run.
pub trait Transpiler: Send + Sync {
    /// Transpiles `source`, the contents of the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns a human-readable message when the module cannot be compiled.
    fn transpile(&self, path: &str, source: &str) -> Result<String, String>;
}
