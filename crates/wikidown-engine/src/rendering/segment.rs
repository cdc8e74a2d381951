use std::sync::OnceLock;

use regex::Regex;

/// Selects which ordered rule set applies to a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RenderMode {
    /// Headers, breaks, paragraphs and inline formatting.
    #[default]
    Normal,
    /// A fenced code block, rendered verbatim.
    Block,
    /// A run of bullet- or number-marked lines.
    List,
    /// Declared with its own rule set but never produced by [`segment`].
    Table,
}

/// A contiguous slice of the raw input tagged with the mode that renders it.
///
/// `text` borrows from the input and includes the segment's own delimiters,
/// e.g. the fence lines of a code block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    pub text: &'a str,
    pub mode: RenderMode,
}

impl<'a> Segment<'a> {
    pub const fn new(text: &'a str, mode: RenderMode) -> Self {
        Self { text, mode }
    }
}

fn fence_pattern() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| {
        Regex::new(r"(?ms)^```[^\n`]*\n.*?^```[ \t]*\r?$").expect("Invalid fence regex")
    })
}

fn list_run_pattern() -> &'static Regex {
    static LIST_RUN: OnceLock<Regex> = OnceLock::new();
    LIST_RUN.get_or_init(|| {
        Regex::new(
            r"(?m)^[ \t]*(?:[-+*]|\d+\.)[ \t]+\S.*(?:\n[ \t]*(?:[-+*]|\d+\.)[ \t]+\S.*)*",
        )
        .expect("Invalid list run regex")
    })
}

/// Splits raw text into typed segments.
///
/// Fenced code blocks are cut out first; list runs are then cut out of the
/// text between fences. Concatenating the `text` of every returned segment in
/// order reproduces `raw` exactly.
pub fn segment(raw: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();

    for (piece, is_fence) in split_keeping(raw, fence_pattern()) {
        if is_fence {
            segments.push(Segment::new(piece, RenderMode::Block));
            continue;
        }

        for (piece, is_list) in split_keeping(piece, list_run_pattern()) {
            let mode = if is_list {
                RenderMode::List
            } else {
                RenderMode::Normal
            };
            segments.push(Segment::new(piece, mode));
        }
    }

    segments
}

/// Splits `text` around every match of `pattern`, keeping the matches.
///
/// Each piece is paired with whether it was a match. Empty gaps are dropped.
fn split_keeping<'a>(text: &'a str, pattern: &Regex) -> Vec<(&'a str, bool)> {
    let mut pieces = Vec::new();
    let mut last_end = 0;

    for m in pattern.find_iter(text) {
        if m.start() > last_end {
            pieces.push((&text[last_end..m.start()], false));
        }
        pieces.push((m.as_str(), true));
        last_end = m.end();
    }

    if last_end < text.len() {
        pieces.push((&text[last_end..], false));
    }

    pieces
}
