use crate::escape::escape_html;

const FENCE: &str = "```";

/// Private-use character bracketing the index of a shielded code block.
pub(crate) const SHIELD_MARK: char = '\u{E000}';

/// Prefix for marker characters that already occur in document text, so they
/// cannot be mistaken for a block token. Followed by `0` for [`SHIELD_MARK`]
/// and `1` for itself.
pub(crate) const ESCAPE_MARK: char = '\u{E001}';

/// Classification of a single line relative to fenced code blocks.
#[derive(Debug, PartialEq, Eq)]
pub enum FenceLine<'a> {
    Open { lang: Option<&'a str> },
    Close,
    Code,
    Text,
}

/// Tracks whether the scan is currently inside a fenced code block.
#[derive(Default)]
pub struct FenceTracker {
    inside: bool,
}

impl FenceTracker {
    pub fn classify<'a>(&mut self, line: &'a str) -> FenceLine<'a> {
        if let Some(rest) = line.strip_prefix(FENCE) {
            self.inside = !self.inside;
            if !self.inside {
                return FenceLine::Close;
            }
            let lang = rest.trim();
            return FenceLine::Open {
                lang: (!lang.is_empty()).then_some(lang),
            };
        }

        if self.inside {
            FenceLine::Code
        } else {
            FenceLine::Text
        }
    }

    pub fn is_inside(&self) -> bool {
        self.inside
    }
}

/// Markdown text with every fenced code block replaced by a one-line token.
pub struct Shielded {
    pub text: String,
    pub blocks: Vec<String>,
}

/// Render fenced blocks to escaped `<pre><code>` markup and swap each one out
/// of the text so the substitution passes cannot reach its contents.
pub fn shield_code_blocks(lines: &[&str]) -> Shielded {
    let mut tracker = FenceTracker::default();
    let mut text_lines: Vec<String> = Vec::with_capacity(lines.len());
    let mut blocks = Vec::new();
    let mut current: Vec<String> = Vec::new();

    for line in lines {
        match tracker.classify(line) {
            FenceLine::Open { lang } => {
                current.push(match lang {
                    Some(lang) => format!("<pre><code class=\"{}\">", escape_html(lang)),
                    None => "<pre><code>".to_owned(),
                });
            }
            FenceLine::Close => {
                current.push("</code></pre>".to_owned());
                text_lines.push(push_block(&mut blocks, &mut current));
            }
            FenceLine::Code => current.push(escape_html(line)),
            FenceLine::Text => text_lines.push(escape_marks(line)),
        }
    }

    // Unclosed fence: keep what was opened, without a closing tag.
    if tracker.is_inside() {
        text_lines.push(push_block(&mut blocks, &mut current));
    }

    Shielded {
        text: text_lines.join("\n"),
        blocks,
    }
}

fn escape_marks(line: &str) -> String {
    if !line.contains([SHIELD_MARK, ESCAPE_MARK]) {
        return line.to_owned();
    }
    let mut escaped = String::with_capacity(line.len() + 8);
    for ch in line.chars() {
        match ch {
            SHIELD_MARK => {
                escaped.push(ESCAPE_MARK);
                escaped.push('0');
            }
            ESCAPE_MARK => {
                escaped.push(ESCAPE_MARK);
                escaped.push('1');
            }
            other => escaped.push(other),
        }
    }
    escaped
}

fn push_block(blocks: &mut Vec<String>, current: &mut Vec<String>) -> String {
    let token = format!("{SHIELD_MARK}{}{SHIELD_MARK}", blocks.len());
    blocks.push(current.join("\n"));
    current.clear();
    token
}
