//! Import specifier resolution and rewriting for preview modules.

use std::collections::{BTreeSet, HashSet};
use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Suffixes tried, in order, after the exact path.
pub const CANDIDATE_SUFFIXES: [&str; 8] =
    [".ts", ".tsx", ".js", ".jsx", "/index.ts", "/index.tsx", "/index.js", "/index.jsx"];

/// Matches the specifier of `import x from '...'`, `export x from '...'`,
/// `import '...'` and `import('...')`.
static SPECIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?P<head>\bfrom\s*|\bimport\s*\(\s*|\bimport\s+)(?P<quote>['"])(?P<spec>[^'"\n]+)['"]"#)
        .expect("invalid import regex")
});

/// Matches a whole-line import of a stylesheet.
static CSS_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^[ \t]*import\s+(?:[^'"\n]*?\s+from\s+)?['"][^'"\n]+\.css['"][ \t]*;?[ \t]*\r?\n?"#)
        .expect("invalid import regex")
});

/// Import-map key for a file: every non-alphanumeric character becomes `_`.
#[must_use]
pub fn module_id(path: &str) -> String {
    path.chars().map(|c| if c.is_ascii_alphanumeric() { c } else { '_' }).collect()
}

/// Returns `true` for `./x` and `../x` specifiers.
#[must_use]
pub fn is_relative(specifier: &str) -> bool {
    specifier.starts_with("./") || specifier.starts_with("../")
}

/// Returns `true` for package specifiers such as `react` or `react-dom/client`.
#[must_use]
pub fn is_bare(specifier: &str) -> bool {
    !(is_relative(specifier)
        || specifier.starts_with('/')
        || specifier.contains("://")
        || specifier.starts_with("data:"))
}

/// Resolves a relative specifier against the importing file's directory.
///
/// Walks the specifier's segments (`.` stays, `..` pops, anything else
/// pushes), then tries the exact path followed by [`CANDIDATE_SUFFIXES`].
#[must_use]
pub fn resolve(importer: &str, specifier: &str, files: &HashSet<&str>) -> Option<String> {
    if !is_relative(specifier) {
        return None;
    }
    let mut segments: Vec<&str> = importer.split('/').collect();
    segments.pop();
    for segment in specifier.split('/') {
        match segment {
            "." | "" => {}
            ".." => {
                segments.pop()?;
            }
            other => segments.push(other),
        }
    }
    let base = segments.join("/");

    std::iter::once(base.clone())
        .chain(CANDIDATE_SUFFIXES.iter().map(|suffix| format!("{base}{suffix}")))
        .find(|candidate| files.contains(candidate.as_str()))
}

/// Rewrites resolvable relative specifiers in `source` to module IDs.
/// Unresolved specifiers are left untouched.
#[must_use]
pub fn rewrite_imports(source: &str, importer: &str, files: &HashSet<&str>) -> String {
    SPECIFIER
        .replace_all(source, |caps: &Captures<'_>| {
            let spec = &caps["spec"];
            match resolve(importer, spec, files) {
                Some(path) => format!("{}{q}{}{q}", &caps["head"], module_id(&path), q = &caps["quote"]),
                None => {
                    if is_relative(spec) {
                        tracing::debug!(importer, specifier = spec, "unresolved relative import");
                    }
                    caps[0].to_string()
                }
            }
        })
        .into_owned()
}

/// Removes stylesheet imports; styles are inlined into the document.
#[must_use]
pub fn strip_css_imports(source: &str) -> String {
    CSS_IMPORT.replace_all(source, "").into_owned()
}

/// Collects the package specifiers a module imports.
#[must_use]
pub fn bare_specifiers(source: &str) -> BTreeSet<String> {
    SPECIFIER
        .captures_iter(source)
        .map(|caps| caps["spec"].to_string())
        .filter(|spec| is_bare(spec))
        .collect()
}
