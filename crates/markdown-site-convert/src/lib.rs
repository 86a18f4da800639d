//! Line-oriented Markdown to HTML fragment conversion.
//!
//! Conversion runs in two phases. Fenced code blocks are rendered first, with
//! their contents entity-escaped and held aside. The remaining text then goes
//! through a fixed, ordered list of regex substitutions. Later rules see the
//! output of earlier ones, so the order of [`Converter::new`]'s rule table is
//! part of the output contract.

mod escape;
mod fence;
mod line;

pub use escape::escape_html;
pub use fence::{FenceLine, FenceTracker};
pub use line::split_lines;

use std::sync::LazyLock;

use fence::{shield_code_blocks, ESCAPE_MARK, SHIELD_MARK};
use regex::{Captures, Regex};

static DEFAULT_CONVERTER: LazyLock<Converter> = LazyLock::new(Converter::new);

/// Convert Markdown into an HTML fragment using the shared rule set.
pub fn markdown_to_html(markdown: &str) -> String {
    DEFAULT_CONVERTER.convert(markdown)
}

struct Rule {
    pattern: Regex,
    replacement: &'static str,
}

impl Rule {
    fn new(pattern: &str, replacement: &'static str) -> Self {
        Self {
            pattern: Regex::new(pattern).expect("static substitution pattern"),
            replacement,
        }
    }

    fn apply(&self, text: &str) -> String {
        self.pattern
            .replace_all(text, self.replacement)
            .into_owned()
    }
}

/// Compiled substitution passes. Stateless between calls.
pub struct Converter {
    rules: Vec<Rule>,
    paragraph_break: Rule,
    empty_paragraph: Rule,
    shield_token: Regex,
}

impl Converter {
    pub fn new() -> Self {
        let rules = vec![
            Rule::new(r"(?m)^### (.*?)$", "<h3>${1}</h3>"),
            Rule::new(r"(?m)^## (.*?)$", "<h2>${1}</h2>"),
            Rule::new(r"(?m)^# (.*?)$", "<h1>${1}</h1>"),
            Rule::new(r"\*\*\*(.*?)\*\*\*", "<strong><em>${1}</em></strong>"),
            Rule::new(r"\*\*(.*?)\*\*", "<strong>${1}</strong>"),
            Rule::new(r"\*(.*?)\*", "<em>${1}</em>"),
            Rule::new(r"__(.*?)__", "<strong>${1}</strong>"),
            Rule::new(r"_(.*?)_", "<em>${1}</em>"),
            Rule::new(r"\[(.*?)\]\((.*?)\)", "<a href=\"${2}\">${1}</a>"),
            Rule::new(r"(?m)^---$", "<hr>"),
            Rule::new(r"(?m)^- (.*?)$", "<li>${1}</li>"),
            Rule::new(r"(?s)(<li>.*?</li>)", "<ul>${1}</ul>"),
            // Adjacent items were wrapped one by one; fuse them into one list.
            Rule::new(r"</ul>\n<ul>", "\n"),
            // Ordered items stay bare, without an <ol>.
            Rule::new(r"(?m)^\d+\. (.*?)$", "<li>${1}</li>"),
            Rule::new(r"(?m)^> (.*?)$", "<blockquote>${1}</blockquote>"),
        ];

        Self {
            rules,
            paragraph_break: Rule::new(r"\n{3,}", "\n</p>\n<p>\n"),
            empty_paragraph: Rule::new(r"<p>\s*</p>", ""),
            shield_token: Regex::new(&format!(
                "{SHIELD_MARK}([0-9]+){SHIELD_MARK}|{ESCAPE_MARK}([01])"
            ))
            .expect("static shield pattern"),
        }
    }

    /// Convert one Markdown document into an HTML fragment. Never fails:
    /// constructs that do not match a rule pass through as literal text.
    pub fn convert(&self, markdown: &str) -> String {
        let lines = split_lines(markdown);
        let shielded = shield_code_blocks(&lines);

        let mut html = shielded.text;
        for rule in &self.rules {
            html = rule.apply(&html);
        }

        html = self.paragraph_break.apply(&html);
        html = format!("<p>\n{html}\n</p>");
        html = self.empty_paragraph.apply(&html);

        self.restore_blocks(&html, &shielded.blocks)
    }

    /// Put shielded blocks back and unescape marker characters from the
    /// document text, in a single pass so restored code is never rescanned.
    fn restore_blocks(&self, html: &str, blocks: &[String]) -> String {
        self.shield_token
            .replace_all(html, |caps: &Captures| {
                if let Some(escaped) = caps.get(2) {
                    let ch = if escaped.as_str() == "0" {
                        SHIELD_MARK
                    } else {
                        ESCAPE_MARK
                    };
                    return ch.to_string();
                }
                caps[1]
                    .parse::<usize>()
                    .ok()
                    .and_then(|idx| blocks.get(idx))
                    .cloned()
                    .unwrap_or_else(|| caps[0].to_owned())
            })
            .into_owned()
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::new()
    }
}
