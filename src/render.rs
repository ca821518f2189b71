//! Terminal rendering for formatted segments
//!
//! The formatter produces neutral segments; this module is the terminal
//! realization of them. Two renderings are provided: plain text (logs,
//! reconstruction, piping) and colored output for the interactive chat.

use colored::Colorize;

use crate::formatter::{Segment, SeparatorWeight, Span};

/// Indentation applied to list lines
const LIST_INDENT: &str = "  ";

/// Width of a rendered separator rule
const SEPARATOR_WIDTH: usize = 32;

/// Render segments as plain text
///
/// Bold and emoji spans keep their content without any styling; separators
/// are drawn with their rule character so a re-format of the output
/// classifies them the same way.
///
/// # Examples
///
/// ```
/// use bitebot::formatter::MessageFormatter;
/// use bitebot::render::to_plain_text;
///
/// let formatter = MessageFormatter::new().unwrap();
/// let segments = formatter.format("a **b** c");
/// assert_eq!(to_plain_text(&segments), "a b c");
/// ```
pub fn to_plain_text(segments: &[Segment]) -> String {
    let mut out = String::new();
    for segment in segments {
        match segment {
            Segment::Text(s) | Segment::Bold(s) | Segment::Emoji(s) => out.push_str(s),
            Segment::Separator(SeparatorWeight::Heavy) => {
                out.push_str(&"━".repeat(SEPARATOR_WIDTH));
            }
            Segment::Separator(SeparatorWeight::Light) => {
                out.push_str(&"─".repeat(SEPARATOR_WIDTH));
            }
            Segment::Bullet(spans) | Segment::Numbered(spans) => {
                out.push_str(LIST_INDENT);
                out.push_str(&spans_plain(spans));
            }
            Segment::Header(spans) => out.push_str(&spans_plain(spans)),
            Segment::LineBreak => out.push('\n'),
        }
    }
    out
}

/// Render segments with ANSI styling for the interactive terminal
pub fn to_terminal(segments: &[Segment]) -> String {
    let mut out = String::new();
    for segment in segments {
        match segment {
            Segment::Text(s) => out.push_str(s),
            Segment::Bold(s) => out.push_str(&s.bold().to_string()),
            Segment::Emoji(s) => out.push_str(s),
            Segment::Separator(SeparatorWeight::Heavy) => {
                out.push_str(&"━".repeat(SEPARATOR_WIDTH).dimmed().to_string());
            }
            Segment::Separator(SeparatorWeight::Light) => {
                out.push_str(&"─".repeat(SEPARATOR_WIDTH).dimmed().to_string());
            }
            Segment::Bullet(spans) | Segment::Numbered(spans) => {
                out.push_str(LIST_INDENT);
                out.push_str(&spans_terminal(spans));
            }
            Segment::Header(spans) => {
                out.push_str(&spans_terminal_styled(spans));
            }
            Segment::LineBreak => out.push('\n'),
        }
    }
    out
}

/// Concatenate spans without styling
fn spans_plain(spans: &[Span]) -> String {
    spans
        .iter()
        .map(|span| match span {
            Span::Text(s) | Span::Bold(s) | Span::Emoji(s) => s.as_str(),
        })
        .collect()
}

/// Concatenate spans with bold styling applied
fn spans_terminal(spans: &[Span]) -> String {
    let mut out = String::new();
    for span in spans {
        match span {
            Span::Text(s) => out.push_str(s),
            Span::Bold(s) => out.push_str(&s.bold().to_string()),
            Span::Emoji(s) => out.push_str(s),
        }
    }
    out
}

/// Concatenate spans styled as a section header
fn spans_terminal_styled(spans: &[Span]) -> String {
    let mut out = String::new();
    for span in spans {
        match span {
            Span::Text(s) => out.push_str(&s.cyan().bold().to_string()),
            Span::Bold(s) => out.push_str(&s.cyan().bold().to_string()),
            Span::Emoji(s) => out.push_str(s),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatter::MessageFormatter;

    fn formatter() -> MessageFormatter {
        MessageFormatter::new().unwrap()
    }

    #[test]
    fn test_plain_rendering_strips_bold_markers() {
        let segments = formatter().format("order **confirmed**");
        assert_eq!(to_plain_text(&segments), "order confirmed");
    }

    #[test]
    fn test_plain_rendering_keeps_line_breaks() {
        let segments = formatter().format("a\nb");
        assert_eq!(to_plain_text(&segments), "a\nb");
    }

    #[test]
    fn test_plain_rendering_indents_lists() {
        let segments = formatter().format("• pizza");
        assert_eq!(to_plain_text(&segments), "  • pizza");

        let segments = formatter().format("1. pizza");
        assert_eq!(to_plain_text(&segments), "  1. pizza");
    }

    #[test]
    fn test_plain_rendering_draws_separators() {
        let segments = formatter().format("━━━");
        let out = to_plain_text(&segments);
        assert_eq!(out.chars().count(), SEPARATOR_WIDTH);
        assert!(out.chars().all(|c| c == '━'));
    }

    #[test]
    fn test_separator_rendering_reclassifies_identically() {
        let f = formatter();
        let segments = f.format("───");
        let rendered = to_plain_text(&segments);
        assert_eq!(f.format(&rendered), segments);
    }

    #[test]
    fn test_terminal_rendering_contains_content() {
        // Styling may add escape codes depending on tty detection; the
        // content itself must always be present.
        let segments = formatter().format("Menu:\n• **Margherita** 🍕");
        let out = to_terminal(&segments);
        assert!(out.contains("Menu:"));
        assert!(out.contains("Margherita"));
        assert!(out.contains("🍕"));
    }

    #[test]
    fn test_terminal_rendering_keeps_emoji_unstyled() {
        let segments = formatter().format("🍕");
        assert!(to_terminal(&segments).contains("🍕"));
    }
}
