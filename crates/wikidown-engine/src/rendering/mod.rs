//! The markdown-to-markup pipeline.
//!
//! Raw text is cut into segments, each segment is escaped and run through the
//! rule set for its mode, and the fragments are joined back in order. There is
//! no parse tree and no state between calls.

pub mod assemble;
pub mod dispatch;
pub mod escape;
pub mod rules;
pub mod segment;

pub use assemble::assemble;
pub use dispatch::render_segment;
pub use escape::{escape, escape_markup, hide_escaped_chars};
pub use rules::{Rule, RuleSet, Scope};
pub use segment::{RenderMode, Segment, segment};

/// Renders a raw text buffer into markup.
///
/// This is the only entry point a caller needs. It must always be given the
/// author's raw text, never markup it returned earlier.
pub fn render(raw: &str) -> String {
    let segments = segment(raw);
    log::debug!(
        "Rendering {} bytes as {} segments",
        raw.len(),
        segments.len()
    );
    assemble(segments.iter().map(render_segment))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn title() {
        assert_eq!(render("# Title"), "<h1>Title</h1>");
    }

    #[test]
    fn bold_paragraph() {
        assert_eq!(render("**bold**"), "<p><strong>bold</strong></p>");
    }

    #[test]
    fn fenced_code_is_not_formatted() {
        let html = render("```\n*not bold*\n```");
        assert_eq!(html, "<pre>*not bold*</pre>");
        assert!(!html.contains("<em>"));
    }

    #[test]
    fn unordered_list() {
        assert_eq!(render("- a\n- b"), "<ul><li>a</li>\n<li>b</li></ul>");
    }

    #[test]
    fn ordered_list() {
        assert_eq!(render("1. a\n2. b"), "<ol><li>a</li>\n<li>b</li></ol>");
    }

    #[test]
    fn script_is_escaped() {
        let html = render("<script>");
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script"));
    }

    #[test]
    fn backslash_escaped_asterisks_are_literal() {
        let html = render("\\*not italic\\*");
        assert_eq!(html, "<p>&#42;not italic&#42;</p>");
        assert!(!html.contains("<em>"));
    }

    #[test]
    fn mixed_document() {
        let raw = "# Notes\n\nSome *text* here.\n\n- one\n- two\n\n```sh\necho **hi**\n```\n\n---\nbye";
        insta::assert_snapshot!(render(raw), @r#"
        <h1>Notes</h1>

        <p>Some <em>text</em> here.</p><ul><li>one</li>
        <li>two</li></ul><pre>echo **hi**</pre><hr>
        <p>bye</p>
        "#);
    }

    #[test]
    fn empty_input() {
        assert_eq!(render(""), "");
    }
}
