//! Incremental extraction of the `conversation` field from a partial stream.
//!
//! Models answer with a JSON object whose `conversation` string is shown to
//! the user while the rest of the object (usually large file contents) is
//! still streaming. The scanner here reads that one string literal out of
//! any prefix of the response, valid JSON or not.

const CONVERSATION_KEY: &str = "\"conversation\"";

/// Extracts the decoded `conversation` value from an accumulated buffer.
///
/// Returns `None` until the key, the colon and the opening quote have all
/// arrived. After that the decoded prefix of the string is returned, ending
/// at the closing quote or at the end of the buffer. An escape sequence cut
/// off by the end of the buffer is held back until it completes.
#[must_use]
pub fn extract_conversation(buffer: &str) -> Option<String> {
    let mut search_from = 0;
    while let Some(offset) = buffer[search_from..].find(CONVERSATION_KEY) {
        let after_key = search_from + offset + CONVERSATION_KEY.len();
        match value_start(&buffer[after_key..]) {
            ValueStart::Found(start) => {
                return Some(decode_partial_string(&buffer[after_key + start..]));
            }
            ValueStart::Incomplete => return None,
            ValueStart::NotAValue => search_from = after_key,
        }
    }
    None
}

enum ValueStart {
    /// Byte offset just past the opening quote.
    Found(usize),
    Incomplete,
    NotAValue,
}

/// Matches `\s*:\s*"` at the start of `rest`.
fn value_start(rest: &str) -> ValueStart {
    let mut seen_colon = false;
    for (i, ch) in rest.char_indices() {
        match ch {
            c if c.is_whitespace() => {}
            ':' if !seen_colon => seen_colon = true,
            '"' if seen_colon => return ValueStart::Found(i + 1),
            _ => return ValueStart::NotAValue,
        }
    }
    ValueStart::Incomplete
}

/// Decodes a JSON string body up to its closing quote or the buffer end.
fn decode_partial_string(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();

    while let Some(ch) = chars.next() {
        match ch {
            '"' => break,
            '\\' => {
                let Some(escaped) = chars.next() else { break };
                match escaped {
                    'n' => out.push('\n'),
                    't' => out.push('\t'),
                    'r' => out.push('\r'),
                    'b' => out.push('\u{0008}'),
                    'f' => out.push('\u{000C}'),
                    'u' => {
                        let Some(high) = read_hex4(&mut chars) else { break };
                        if (0xD800..0xDC00).contains(&high) {
                            // A surrogate pair needs the second `\uXXXX` too.
                            let mut lookahead = chars.clone();
                            match (lookahead.next(), lookahead.next()) {
                                (Some('\\'), Some('u')) => {
                                    let Some(low) = read_hex4(&mut lookahead) else { break };
                                    if (0xDC00..0xE000).contains(&low) {
                                        let code = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
                                        out.push(char::from_u32(code).unwrap_or('\u{FFFD}'));
                                        chars = lookahead;
                                    } else {
                                        out.push('\u{FFFD}');
                                    }
                                }
                                (None, _) | (Some('\\'), None) => break,
                                _ => out.push('\u{FFFD}'),
                            }
                        } else {
                            out.push(char::from_u32(high).unwrap_or('\u{FFFD}'));
                        }
                    }
                    // `\"`, `\\`, `\/` and anything unknown decode to themselves.
                    other => out.push(other),
                }
            }
            other => out.push(other),
        }
    }

    out
}

/// Reads four hex digits. `None` when the buffer ends first or a digit is bad.
fn read_hex4<I>(chars: &mut I) -> Option<u32>
where
    I: Iterator<Item = char>,
{
    let mut value = 0;
    for _ in 0..4 {
        value = value * 16 + chars.next()?.to_digit(16)?;
    }
    Some(value)
}

/// Returns `true` when the buffer plausibly holds (the start of) a JSON reply.
fn looks_like_json(buffer: &str) -> bool {
    let trimmed = buffer.trim_start();
    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .map_or(trimmed, str::trim_start);
    unfenced.is_empty() || unfenced.starts_with('{') || "```json".starts_with(trimmed)
}

/// Tracks the text shown for a streaming response and reports changes.
#[derive(Debug, Default)]
pub struct ConversationExtractor {
    displayed: Option<String>,
}

impl ConversationExtractor {
    /// Creates an extractor with nothing displayed yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-runs extraction over the full accumulated buffer.
    ///
    /// Returns the new display text only when it differs from what was
    /// displayed before. Buffers that do not look like JSON at all (plain
    /// error text from a provider) are displayed verbatim.
    pub fn update(&mut self, accumulated: &str) -> Option<&str> {
        let candidate = match extract_conversation(accumulated) {
            Some(text) => text,
            None if !accumulated.contains(CONVERSATION_KEY) && !looks_like_json(accumulated) => {
                accumulated.to_string()
            }
            None => return None,
        };

        if self.displayed.as_deref() == Some(candidate.as_str()) {
            return None;
        }
        if self.displayed.is_none() && candidate.is_empty() {
            return None;
        }
        self.displayed = Some(candidate);
        self.displayed.as_deref()
    }

    /// Returns the text currently displayed.
    #[must_use]
    pub fn displayed(&self) -> &str {
        self.displayed.as_deref().unwrap_or("")
    }
}
