//! String transforms applied before untrusted message data reaches a file
//! name, a rendered HTML document, or a search query.

use std::sync::LazyLock;

use regex::Regex;

/// Maximum length, in characters, of a name written to the file store.
pub const MAX_FILENAME_CHARS: usize = 150;

static RE_FORBIDDEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"[\\/:*?"<>|]+"#).unwrap());
static RE_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Makes a name safe for the destination file store.
///
/// Each run of `\ / : * ? " < > |` becomes a single underscore, whitespace
/// runs collapse to one space, the result is trimmed and then cut to
/// [`MAX_FILENAME_CHARS`] characters.
pub fn sanitize_filename(name: &str) -> String {
    let replaced = RE_FORBIDDEN.replace_all(name, "_");
    let collapsed = RE_WHITESPACE.replace_all(&replaced, " ");
    collapsed.trim().chars().take(MAX_FILENAME_CHARS).collect()
}

/// Escapes `&`, `<`, `>` and `"` for embedding in HTML text or attributes.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Wraps a label name in double quotes for the search query, escaping any
/// embedded quote as `\"`.
pub fn quote_label(label: &str) -> String {
    format!("\"{}\"", label.replace('"', "\\\""))
}
