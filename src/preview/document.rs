//! HTML shells for the preview iframe.

use std::fmt::Write as _;

/// Title of the document shown when a preview cannot be built.
pub const ERROR_TITLE: &str = "Preview Error";

/// Escapes text for inclusion in HTML content or attributes.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Renders the page that boots the entry module through the import map.
#[must_use]
pub fn app_document(import_map_json: &str, entry_id: &str, styles: &[&str]) -> String {
    let mut style_blocks = String::new();
    for css in styles {
        let _ = writeln!(style_blocks, "    <style>\n{}\n    </style>", css.replace("</", "<\\/"));
    }
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="UTF-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1.0" />
    <title>Preview</title>
{style_blocks}    <script type="importmap">
{import_map_json}
    </script>
  </head>
  <body>
    <div id="root"></div>
    <script type="module">
      import "{entry_id}";
    </script>
  </body>
</html>
"#
    )
}

/// Renders a readable error page instead of a broken preview.
#[must_use]
pub fn error_document(message: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="UTF-8" />
    <title>{ERROR_TITLE}</title>
    <style>
      body {{ font-family: system-ui, sans-serif; margin: 2rem; color: #7f1d1d; background: #fef2f2; }}
      pre {{ white-space: pre-wrap; }}
    </style>
  </head>
  <body>
    <h1>{ERROR_TITLE}</h1>
    <pre>{}</pre>
  </body>
</html>
"#,
        escape_html(message)
    )
}
