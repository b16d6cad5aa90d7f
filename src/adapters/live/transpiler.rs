//! Transpiler adapter for projects written as plain ES modules.

use crate::ports::Transpiler;

/// Extensions whose syntax a browser cannot load without compilation.
const COMPILED_EXTENSIONS: [&str; 3] = [".ts", ".tsx", ".jsx"];

/// Emits `.js` modules as written and refuses TypeScript and JSX.
///
/// Browsers reject type annotations and JSX with a syntax error and a blank
/// page, so those modules fail here and the preview shows its error page.
/// Hosts that compile them plug a real compiler in behind [`Transpiler`].
pub struct PassthroughTranspiler;

impl Transpiler for PassthroughTranspiler {
    fn transpile(&self, path: &str, source: &str) -> Result<String, String> {
        if COMPILED_EXTENSIONS.iter().any(|ext| path.ends_with(ext)) {
            return Err(format!(
                "{path}: TypeScript and JSX need a compiler and none is configured. \
                 Ask for plain JavaScript modules instead."
            ));
        }
        if source.contains('\0') {
            return Err(format!("{path}: source contains NUL bytes"));
        }
        Ok(source.to_string())
    }
}
