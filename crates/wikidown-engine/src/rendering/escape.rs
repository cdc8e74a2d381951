//! Escaping of raw text before any rule sees it.
//!
//! Escaping happens in two steps. Markup-significant characters become named
//! references so author text can never open a tag, then every backslash-escaped
//! character becomes a numeric reference so no later pattern can match it.

use std::sync::OnceLock;

use regex::{Captures, Regex};

/// Ordered replacements for markup-significant characters.
///
/// The ampersand must come first or the references inserted by later entries
/// would be escaped a second time.
const MARKUP_ESCAPES: [(char, &str); 5] = [
    ('&', "&amp;"),
    ('<', "&lt;"),
    ('>', "&gt;"),
    ('"', "&quot;"),
    ('\'', "&apos;"),
];

/// Fully escapes raw text: markup escaping followed by backslash hiding.
pub fn escape(raw: &str) -> String {
    hide_escaped_chars(&escape_markup(raw))
}

/// Replaces `&`, `<`, `>`, `"` and `'` with their named references.
pub fn escape_markup(raw: &str) -> String {
    let mut escaped = raw.to_string();
    for (ch, reference) in MARKUP_ESCAPES {
        if escaped.contains(ch) {
            escaped = escaped.replace(ch, reference);
        }
    }
    escaped
}

/// Replaces every backslash-escaped character with its numeric reference.
///
/// Expects text that already went through [`escape_markup`]: a backslash in
/// front of a reference produced there (`\&lt;`) hides the original character
/// (`&#60;`) rather than the reference's leading ampersand.
pub fn hide_escaped_chars(escaped: &str) -> String {
    static BACKSLASH_ESCAPE: OnceLock<Regex> = OnceLock::new();
    let backslash_escape = BACKSLASH_ESCAPE.get_or_init(|| {
        Regex::new(r"\\(&(?:amp|lt|gt|quot|apos);|[^\n])").expect("Invalid backslash escape regex")
    });

    backslash_escape
        .replace_all(escaped, |caps: &Captures| {
            let hidden = match &caps[1] {
                "&amp;" => '&',
                "&lt;" => '<',
                "&gt;" => '>',
                "&quot;" => '"',
                "&apos;" => '\'',
                other => other.chars().next().unwrap_or('\\'),
            };
            numeric_reference(hidden)
        })
        .into_owned()
}

fn numeric_reference(ch: char) -> String {
    format!("&#{};", u32::from(ch))
}
