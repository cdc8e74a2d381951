use std::sync::OnceLock;

use regex::Regex;

use super::escape::{escape, escape_markup};
use super::rules::RuleSet;
use super::segment::{RenderMode, Segment};

/// Renders one segment into a markup fragment with the rule set for its mode.
///
/// Pure and total: the fragment depends only on the segment's text and mode.
/// Code blocks get markup escaping only; backslash hiding is for text that
/// inline rules will see.
pub fn render_segment(segment: &Segment<'_>) -> String {
    let rules = RuleSet::for_mode(segment.mode);

    match segment.mode {
        // Code is never subject to inline rules, so backslashes stay literal.
        RenderMode::Block => rules.apply(escape_markup(segment.text).trim()),
        RenderMode::List => {
            let items = rules.apply(escape(segment.text).trim());
            if has_numeric_marker(segment.text) {
                format!("<ol>{items}</ol>")
            } else {
                format!("<ul>{items}</ul>")
            }
        }
        RenderMode::Normal | RenderMode::Table => rules.apply(escape(segment.text).trim()),
    }
}

/// Whether any line of a list run starts with a `<digits>.` marker.
///
/// Decided once for the whole run, so a run mixing bullets and numbers is an
/// ordered list as soon as one line is numbered.
fn has_numeric_marker(raw: &str) -> bool {
    static NUMERIC_MARKER: OnceLock<Regex> = OnceLock::new();
    NUMERIC_MARKER
        .get_or_init(|| Regex::new(r"(?m)^[ \t]*\d+\.[ \t]").expect("Invalid numeric marker regex"))
        .is_match(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn render_as(text: &str, mode: RenderMode) -> String {
        render_segment(&Segment::new(text, mode))
    }

    #[test]
    fn normal_segment_is_trimmed_before_rules() {
        assert_eq!(render_as("\n\n  hello  \n\n", RenderMode::Normal), "<p>hello</p>");
    }

    #[test]
    fn whitespace_only_segment_renders_nothing() {
        assert_eq!(render_as("\n \n\t\n", RenderMode::Normal), "");
    }

    #[test]
    fn block_keeps_code_verbatim() {
        assert_eq!(
            render_as("```\n*not bold* <b> \"\\n\"\n```", RenderMode::Block),
            "<pre>*not bold* &lt;b&gt; &quot;\\n&quot;</pre>"
        );
    }

    #[rstest]
    #[case("- a\n- b", "<ul><li>a</li>\n<li>b</li></ul>")]
    #[case("1. a\n2. b", "<ol><li>a</li>\n<li>b</li></ol>")]
    #[case("- a\n2. b", "<ol><li>a</li>\n<li>b</li></ol>")]
    #[case("* *a*", "<ul><li><em>a</em></li></ul>")]
    fn lists(#[case] text: &str, #[case] expected: &str) {
        assert_eq!(render_as(text, RenderMode::List), expected);
    }

    #[test]
    fn numeric_marker_on_any_line() {
        assert!(has_numeric_marker("1. one"));
        assert!(!has_numeric_marker("- 1. nested looking"));
        assert!(has_numeric_marker("- a\n  12. b"));
    }

    #[test]
    fn table_segment_has_no_paragraphs() {
        assert_eq!(
            render_as("| *a* | b |", RenderMode::Table),
            "| <em>a</em> | b |"
        );
    }

    #[test]
    fn normal_segment_escapes_before_matching() {
        assert_eq!(
            render_as("# <i>x</i>", RenderMode::Normal),
            "<h1>&lt;i&gt;x&lt;/i&gt;</h1>"
        );
    }
}
