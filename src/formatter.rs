//! Message formatting pipeline
//!
//! Chat messages arrive as markdown-ish raw text (bold markers, bullet
//! glyphs, rule lines, emoji). This module turns one raw message into an
//! ordered sequence of display segments that a renderer can paint without
//! ever injecting raw markup. Formatting is total: every string input
//! produces a segment sequence, and malformed markers degrade to plain text
//! instead of failing.

use regex::Regex;

use crate::error::Result;

/// Maximum character count for a line to qualify as a section header
const HEADER_MAX_CHARS: usize = 40;

/// Minimum run length for a rule line to become a separator
const RULE_MIN_RUN: usize = 3;

/// Glyphs that mark a bullet line
const BULLET_GLYPHS: [char; 5] = ['•', '●', '▪', '◦', '‣'];

/// Characters that make up a heavy horizontal rule
const HEAVY_RULE_CHARS: [char; 2] = ['━', '═'];

/// Characters that make up a light horizontal rule
const LIGHT_RULE_CHARS: [char; 2] = ['─', '-'];

/// Emoji shortcodes understood by the legacy chat widget
const EMOJI_SHORTCODES: [(&str, &str); 5] = [
    (":pizza:", "🍕"),
    (":burger:", "🍔"),
    (":check:", "✅"),
    (":lock:", "🔒"),
    (":star:", "⭐"),
];

/// Visual weight of a horizontal rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SeparatorWeight {
    /// Thick rule, drawn from `━` or `═`
    Heavy,
    /// Thin rule, drawn from `─` or `-`
    Light,
}

/// Inline run of display content within a classified line
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Span {
    /// Plain text
    Text(String),
    /// Emphasized text, stripped of its `**`/`__` markers
    Bold(String),
    /// Run of emoji scalars
    Emoji(String),
}

/// One renderable unit derived from a line of raw message text
///
/// A formatted message is an ordered `Vec<Segment>`. Plain lines contribute
/// their inline spans directly; structured lines (bullets, numbered items,
/// headers) wrap their spans so the renderer can indent or style the whole
/// line.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Segment {
    /// Plain text run
    Text(String),
    /// Emphasized text run
    Bold(String),
    /// Run of emoji scalars
    Emoji(String),
    /// Horizontal rule line
    Separator(SeparatorWeight),
    /// Bulleted list line, leading marker preserved in its spans
    Bullet(Vec<Span>),
    /// Numbered list line (`1.`, `2.`, …), marker preserved
    Numbered(Vec<Span>),
    /// Short label line introducing a section
    Header(Vec<Span>),
    /// Explicit line break between lines
    LineBreak,
}

/// Line-level classification, decided before inline substitution
enum LineKind {
    Blank,
    Separator(SeparatorWeight),
    Bullet,
    Numbered,
    Header,
    Plain,
}

/// Turns raw chat text into display segments
///
/// The formatter is stateless across calls; the struct only caches the
/// compiled inline patterns. Formatting never mutates its input and is
/// deterministic: the same raw text always yields the same segments.
///
/// # Examples
///
/// ```
/// use bitebot::formatter::{MessageFormatter, Segment};
///
/// let formatter = MessageFormatter::new().unwrap();
/// let segments = formatter.format("**Found 3 restaurants**");
/// assert_eq!(segments, vec![Segment::Bold("Found 3 restaurants".to_string())]);
/// ```
pub struct MessageFormatter {
    strong: Regex,
    underline: Regex,
    numbered: Regex,
}

impl MessageFormatter {
    /// Create a formatter with its inline patterns compiled
    ///
    /// # Errors
    ///
    /// Returns an error if a pattern fails to compile.
    pub fn new() -> Result<Self> {
        Ok(Self {
            strong: Regex::new(r"\*\*(.+?)\*\*")
                .map_err(|e| anyhow::anyhow!("Invalid bold pattern: {}", e))?,
            underline: Regex::new(r"__(.+?)__")
                .map_err(|e| anyhow::anyhow!("Invalid underline pattern: {}", e))?,
            numbered: Regex::new(r"^\d+\.")
                .map_err(|e| anyhow::anyhow!("Invalid list pattern: {}", e))?,
        })
    }

    /// Format raw message text into an ordered segment sequence
    ///
    /// Splits on newlines, classifies each line against its original text,
    /// then applies inline substitutions (bold markers, emoji shortcodes,
    /// emoji runs) to the display content only. Each newline contributes one
    /// [`Segment::LineBreak`]; a single marker-free line formats to exactly
    /// one [`Segment::Text`] equal to the input.
    ///
    /// # Examples
    ///
    /// ```
    /// use bitebot::formatter::{MessageFormatter, Segment};
    ///
    /// let formatter = MessageFormatter::new().unwrap();
    /// assert_eq!(
    ///     formatter.format("hello"),
    ///     vec![Segment::Text("hello".to_string())]
    /// );
    /// assert!(formatter.format("").is_empty());
    /// ```
    pub fn format(&self, raw: &str) -> Vec<Segment> {
        if raw.is_empty() {
            return Vec::new();
        }

        let lines: Vec<&str> = raw.split('\n').collect();
        let mut segments = Vec::new();

        for (idx, line) in lines.iter().enumerate() {
            match self.classify(line) {
                // A blank line contributes nothing beyond the breaks of its
                // surrounding newlines.
                LineKind::Blank => {}
                LineKind::Separator(weight) => segments.push(Segment::Separator(weight)),
                LineKind::Bullet => {
                    segments.push(Segment::Bullet(self.inline_spans(line.trim_start())));
                }
                LineKind::Numbered => {
                    segments.push(Segment::Numbered(self.inline_spans(line.trim_start())));
                }
                LineKind::Header => {
                    segments.push(Segment::Header(self.inline_spans(line.trim())));
                }
                LineKind::Plain => {
                    for span in self.inline_spans(line) {
                        segments.push(match span {
                            Span::Text(s) => Segment::Text(s),
                            Span::Bold(s) => Segment::Bold(s),
                            Span::Emoji(s) => Segment::Emoji(s),
                        });
                    }
                }
            }

            if idx + 1 < lines.len() {
                segments.push(Segment::LineBreak);
            }
        }

        segments
    }

    /// Format optional raw text, treating an absent value as empty
    ///
    /// Wire fields are optional; a missing message body formats to an empty
    /// sequence rather than an error.
    pub fn format_optional(&self, raw: Option<&str>) -> Vec<Segment> {
        match raw {
            Some(text) => self.format(text),
            None => Vec::new(),
        }
    }

    /// Classify a line by its original text
    ///
    /// Inline markers play no part here; a line is judged on its leading
    /// glyphs, rule runs, and the header heuristic only.
    fn classify(&self, line: &str) -> LineKind {
        let trimmed = line.trim();

        if trimmed.is_empty() {
            return LineKind::Blank;
        }
        if is_rule(trimmed, &HEAVY_RULE_CHARS) {
            return LineKind::Separator(SeparatorWeight::Heavy);
        }
        if is_rule(trimmed, &LIGHT_RULE_CHARS) {
            return LineKind::Separator(SeparatorWeight::Light);
        }
        if trimmed.starts_with(&BULLET_GLYPHS[..])
            || trimmed.starts_with("- ")
            || trimmed.starts_with("* ")
        {
            return LineKind::Bullet;
        }
        if self.numbered.is_match(trimmed) {
            return LineKind::Numbered;
        }
        if is_section_header(trimmed) {
            return LineKind::Header;
        }
        LineKind::Plain
    }

    /// Split a line's display content into inline spans
    ///
    /// Applies, in order: emoji shortcode replacement, `**bold**` pairs,
    /// `__bold__` pairs, then emoji-run extraction over the remaining text.
    /// Unpaired markers are left as literal characters.
    fn inline_spans(&self, text: &str) -> Vec<Span> {
        let replaced = replace_shortcodes(text);
        let mut spans = Vec::new();

        for (bold, piece) in split_marked(&self.strong, &replaced) {
            if bold {
                spans.push(Span::Bold(piece));
                continue;
            }
            for (bold, piece) in split_marked(&self.underline, &piece) {
                if bold {
                    spans.push(Span::Bold(piece));
                } else {
                    append_text_spans(&mut spans, &piece);
                }
            }
        }

        spans
    }
}

/// Returns `true` when the line is a run of rule characters
fn is_rule(trimmed: &str, rule_chars: &[char]) -> bool {
    trimmed.chars().count() >= RULE_MIN_RUN
        && trimmed.chars().all(|ch| rule_chars.contains(&ch))
}

/// Section-header heuristic: short, ends with a colon, holds no comma
///
/// Kept exactly as the legacy transcripts expect, even though it can misfire
/// on short prose that happens to end with a colon.
fn is_section_header(trimmed: &str) -> bool {
    trimmed.chars().count() < HEADER_MAX_CHARS
        && trimmed.ends_with(':')
        && !trimmed.contains(',')
}

/// Replace legacy widget shortcodes with their emoji
fn replace_shortcodes(text: &str) -> String {
    let mut replaced = text.to_string();
    for (code, emoji) in EMOJI_SHORTCODES {
        if replaced.contains(code) {
            replaced = replaced.replace(code, emoji);
        }
    }
    replaced
}

/// Split text into `(is_marked, content)` pieces around a delimiter pattern
///
/// Only complete pairs match; a dangling delimiter stays in the surrounding
/// literal text.
fn split_marked(re: &Regex, text: &str) -> Vec<(bool, String)> {
    let mut pieces = Vec::new();
    let mut last = 0;

    for caps in re.captures_iter(text) {
        if let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) {
            if whole.start() > last {
                pieces.push((false, text[last..whole.start()].to_string()));
            }
            pieces.push((true, inner.as_str().to_string()));
            last = whole.end();
        }
    }
    if last < text.len() {
        pieces.push((false, text[last..].to_string()));
    }

    pieces
}

/// Append a literal piece as text spans, splitting out emoji runs
fn append_text_spans(spans: &mut Vec<Span>, text: &str) {
    let mut buf = String::new();
    let mut emoji = String::new();

    for ch in text.chars() {
        let part_of_emoji = is_emoji_scalar(ch) || (ch == '\u{FE0F}' && !emoji.is_empty());
        if part_of_emoji {
            if !buf.is_empty() {
                spans.push(Span::Text(std::mem::take(&mut buf)));
            }
            emoji.push(ch);
        } else {
            if !emoji.is_empty() {
                spans.push(Span::Emoji(std::mem::take(&mut emoji)));
            }
            buf.push(ch);
        }
    }

    if !emoji.is_empty() {
        spans.push(Span::Emoji(emoji));
    }
    if !buf.is_empty() {
        spans.push(Span::Text(buf));
    }
}

/// Returns `true` for scalars in the emoji blocks the widget emits
fn is_emoji_scalar(ch: char) -> bool {
    matches!(
        u32::from(ch),
        0x1F300..=0x1FAFF | 0x2600..=0x27BF | 0x2B00..=0x2BFF
    )
}
