//! Ordered substitution rules, grouped into one rule set per [`RenderMode`].
//!
//! Every set is built by concatenating shared sub-sets, and the order inside a
//! set is part of its meaning: headers must exist before paragraph wrapping can
//! recognise them, images must be tried before links, and inline formatting
//! runs last so it never sees the block-level tags it would otherwise break.

use std::borrow::Cow;
use std::ops::Range;
use std::sync::OnceLock;

use regex::{Captures, Regex};

use super::segment::RenderMode;

/// What a rule puts in place of each match.
pub enum Replacement {
    /// A template with numbered capture references such as `${1}`.
    Template(String),
    /// A function of the captures, for output a template cannot keep safe.
    With(fn(&Captures) -> String),
}

/// Which part of the text a rule may match in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// The whole text, tags included.
    Whole,
    /// Anywhere, except that a match may not start or end inside a tag
    /// produced by an earlier rule. Whole tags may sit inside a match.
    OutsideTags,
}

/// A single pattern-to-replacement substitution.
pub struct Rule {
    pattern: Regex,
    replacement: Replacement,
    scope: Scope,
}

impl Rule {
    fn template(pattern: &str, template: impl Into<String>) -> Self {
        Self {
            pattern: compile(pattern),
            replacement: Replacement::Template(template.into()),
            scope: Scope::Whole,
        }
    }

    fn with(pattern: &str, replace: fn(&Captures) -> String) -> Self {
        Self {
            pattern: compile(pattern),
            replacement: Replacement::With(replace),
            scope: Scope::Whole,
        }
    }

    fn outside_tags(mut self) -> Self {
        self.scope = Scope::OutsideTags;
        self
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// Replaces every match of this rule in `text`.
    pub fn apply<'t>(&self, text: &'t str) -> Cow<'t, str> {
        match self.scope {
            Scope::Whole => self.substitute(text),
            Scope::OutsideTags => {
                let tags: Vec<Range<usize>> =
                    tag_pattern().find_iter(text).map(|tag| tag.range()).collect();
                if tags.is_empty() {
                    return self.substitute(text);
                }
                self.substitute_outside(text, &tags)
            }
        }
    }

    fn substitute<'t>(&self, text: &'t str) -> Cow<'t, str> {
        match &self.replacement {
            Replacement::Template(template) => self.pattern.replace_all(text, template.as_str()),
            Replacement::With(replace) => {
                self.pattern.replace_all(text, |caps: &Captures| replace(caps))
            }
        }
    }

    /// Like [`Rule::substitute`], skipping matches with either end inside a tag.
    ///
    /// A skipped match is retried one character further on, so a shorter
    /// match that lies wholly outside the tag is still found.
    fn substitute_outside<'t>(&self, text: &'t str, tags: &[Range<usize>]) -> Cow<'t, str> {
        let mut out = String::with_capacity(text.len());
        let mut copied = 0;
        let mut search = 0;
        let mut replaced = false;

        while search <= text.len() {
            let Some(caps) = self.pattern.captures_at(text, search) else {
                break;
            };
            let Some(m) = caps.get(0) else {
                break;
            };

            if splits_tag(tags, m.start()) || splits_tag(tags, m.end()) {
                search = next_char(text, m.start());
                continue;
            }

            out.push_str(&text[copied..m.start()]);
            match &self.replacement {
                Replacement::Template(template) => caps.expand(template, &mut out),
                Replacement::With(replace) => out.push_str(&replace(&caps)),
            }
            copied = m.end();
            replaced = true;
            search = if m.is_empty() {
                next_char(text, m.end())
            } else {
                m.end()
            };
        }

        if !replaced {
            return Cow::Borrowed(text);
        }
        out.push_str(&text[copied..]);
        Cow::Owned(out)
    }
}

/// Whether `at` falls strictly inside one of the sorted `tags`.
fn splits_tag(tags: &[Range<usize>], at: usize) -> bool {
    let next = tags.partition_point(|tag| tag.end <= at);
    tags.get(next).is_some_and(|tag| tag.start < at)
}

/// Byte offset of the character after the one at `at`, or past the end.
fn next_char(text: &str, at: usize) -> usize {
    text[at..]
        .chars()
        .next()
        .map_or(text.len() + 1, |c| at + c.len_utf8())
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("Invalid rule regex {pattern:?}: {e}"))
}

fn tag_pattern() -> &'static Regex {
    static TAG: OnceLock<Regex> = OnceLock::new();
    TAG.get_or_init(|| Regex::new(r"<[^>]*>").expect("Invalid tag regex"))
}

/// An ordered list of rules applied one after another.
pub struct RuleSet {
    name: &'static str,
    rules: Vec<Rule>,
}

impl RuleSet {
    fn new(name: &'static str, parts: impl IntoIterator<Item = Vec<Rule>>) -> Self {
        Self {
            name,
            rules: parts.into_iter().flatten().collect(),
        }
    }

    /// The rule set that renders segments of the given mode.
    pub fn for_mode(mode: RenderMode) -> &'static RuleSet {
        let sets = rule_sets();
        match mode {
            RenderMode::Normal => &sets.normal,
            RenderMode::Block => &sets.block,
            RenderMode::List => &sets.list,
            RenderMode::Table => &sets.table,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Applies every rule in order, each to the output of the previous one.
    pub fn apply(&self, text: &str) -> String {
        let mut text = text.to_string();
        for rule in &self.rules {
            let replaced = match rule.apply(&text) {
                Cow::Borrowed(_) => None,
                Cow::Owned(replaced) => Some(replaced),
            };
            if let Some(replaced) = replaced {
                text = replaced;
            }
        }
        text
    }
}

struct RuleSets {
    block: RuleSet,
    normal: RuleSet,
    list: RuleSet,
    table: RuleSet,
}

fn rule_sets() -> &'static RuleSets {
    static RULE_SETS: OnceLock<RuleSets> = OnceLock::new();
    RULE_SETS.get_or_init(|| RuleSets {
        block: RuleSet::new("block", [block_rules()]),
        normal: RuleSet::new(
            "normal",
            [
                header_rules(),
                thematic_break_rules(),
                external_content_rules(),
                paragraph_rules(),
                text_format_rules(),
            ],
        ),
        list: RuleSet::new(
            "list",
            [list_item_rules(), external_content_rules(), text_format_rules()],
        ),
        table: RuleSet::new("table", [external_content_rules(), text_format_rules()]),
    })
}

/// Strips the fences (and language tag) and keeps the interior verbatim.
fn block_rules() -> Vec<Rule> {
    vec![Rule::template(
        r"(?s)\A```[^\n`]*\n(.*?)\n?```[ \t\r]*\z",
        "<pre>${1}</pre>",
    )]
}

/// Level 6 down to level 1, each anchored to a line start.
fn header_rules() -> Vec<Rule> {
    (1..=6)
        .rev()
        .map(|level| {
            Rule::template(
                &format!(r"(?m)^#{{{level}}}[ \t]+(.*\S)[ \t\r]*$"),
                format!("<h{level}>${{1}}</h{level}>"),
            )
        })
        .collect()
}

fn thematic_break_rules() -> Vec<Rule> {
    vec![Rule::template(r"(?m)^---\r?$", "<hr>")]
}

/// Images before links: image syntax is link syntax behind a `!`.
fn external_content_rules() -> Vec<Rule> {
    vec![
        Rule::with(r"!\[([^\]\n]*)\]\(([^)\s]*)\)", |caps: &Captures| {
            format!(r#"<img src="{}" alt="{}">"#, safe_url(&caps[2]), &caps[1])
        })
        .outside_tags(),
        Rule::with(r"\[([^\]\n]*)\]\(([^)\s]*)\)", |caps: &Captures| {
            format!(r#"<a href="{}">{}</a>"#, safe_url(&caps[2]), &caps[1])
        })
        .outside_tags(),
    ]
}

/// Wraps every non-empty line, then unwraps lines that are a single block-level
/// tag produced above.
fn paragraph_rules() -> Vec<Rule> {
    vec![
        Rule::template(r"(?m)^[ \t]*(\S.*?)[ \t\r]*$", "<p>${1}</p>"),
        Rule::template(
            r#"(?m)^<p>(<h[1-6]>.*</h[1-6]>|<hr>|<img [^>]*>|<a href="[^"]*">(?:[^<]|<img [^>]*>)*</a>)</p>$"#,
            "${1}",
        ),
    ]
}

fn text_format_rules() -> Vec<Rule> {
    [
        (r"\*\*\*([^*\n]+)\*\*\*", "<strong><em>${1}</em></strong>"),
        (r"\*\*([^*\n]+)\*\*", "<strong>${1}</strong>"),
        (r"\*([^*\n]+)\*", "<em>${1}</em>"),
        (r"`([^`\n]+)`", "<code>${1}</code>"),
        (r"__([^_\n]+)__", "<u>${1}</u>"),
        (r"~~([^~\n]+)~~", "<del>${1}</del>"),
    ]
    .into_iter()
    .map(|(pattern, template)| Rule::template(pattern, template).outside_tags())
    .collect()
}

/// Strips the bullet or number marker and wraps the rest of each line.
fn list_item_rules() -> Vec<Rule> {
    vec![Rule::template(
        r"(?m)^[ \t]*(?:[-+*]|\d+\.)[ \t]+(.*?)[ \t\r]*$",
        "<li>${1}</li>",
    )]
}

/// Schemes a browser would execute rather than navigate to.
const EXECUTABLE_SCHEMES: [&str; 3] = ["javascript:", "vbscript:", "data:"];

/// Replaces destinations with an executable scheme by `#`.
///
/// The destination has already been escaped, so numeric references (from
/// backslash escapes) are decoded before looking at the scheme, as a browser
/// would when reading the attribute.
fn safe_url(url: &str) -> &str {
    static NUMERIC_REFERENCE: OnceLock<Regex> = OnceLock::new();
    let numeric_reference = NUMERIC_REFERENCE
        .get_or_init(|| Regex::new(r"&#(\d+);").expect("Invalid numeric reference regex"));

    let decoded = numeric_reference.replace_all(url, |caps: &Captures| {
        caps[1]
            .parse::<u32>()
            .ok()
            .and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_default()
    });
    let normalized: String = decoded
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && !c.is_ascii_control())
        .collect::<String>()
        .to_ascii_lowercase();

    if EXECUTABLE_SCHEMES
        .iter()
        .any(|scheme| normalized.starts_with(scheme))
    {
        "#"
    } else {
        url
    }
}
