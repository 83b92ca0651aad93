//! Plain-text reduction used before PDF pagination.
//!
//! A lossy single pass: no placeholders, no HTML generation.

use once_cell::sync::Lazy;
use regex::Regex;

static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("invalid tag regex"));
static HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*#{1,6}[ \t]+").expect("invalid header regex"));
static BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.+?)\*\*").expect("invalid bold regex"));
static ITALIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*([^*\n]+?)\*").expect("invalid italic regex"));
static LIST_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*(?:[-*+]|\d+\.)[ \t]+").expect("invalid list marker regex")
});
static INLINE_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"`([^`\n]+)`").expect("invalid inline code regex"));
static BLANK_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").expect("invalid blank regex"));

/// Reduce GAIA markdown to plain text.
///
/// ```
/// use gaia_markdown::to_plain_text;
///
/// assert_eq!(to_plain_text("## Plan\n\n1. Design\n2. Build"), "Plan\n\n• Design\n• Build");
/// ```
pub fn to_plain_text(content: &str) -> String {
    let text = content.replace("\r\n", "\n");
    let text = HTML_TAG.replace_all(&text, "");
    let text = HEADER.replace_all(&text, "");
    let text = BOLD.replace_all(&text, "$1");
    let text = ITALIC.replace_all(&text, "$1");
    let text = LIST_MARKER.replace_all(&text, "\u{2022} ");
    let text = INLINE_CODE.replace_all(&text, "$1");
    let text = BLANK_RUN.replace_all(&text, "\n\n");
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn unwraps_emphasis() {
        assert_eq!(to_plain_text("**bold** and *italic*"), "bold and italic");
    }

    #[test]
    fn strips_tags_and_headers() {
        assert_eq!(
            to_plain_text("# Title\n<details><summary>More</summary>body</details>"),
            "Title\nMorebody"
        );
    }

    #[test]
    fn list_markers_become_bullets() {
        assert_eq!(to_plain_text("- a\n* b\n12. c"), "\u{2022} a\n\u{2022} b\n\u{2022} c");
    }

    #[test]
    fn inline_code_unwrapped() {
        assert_eq!(to_plain_text("run `gaia build` now"), "run gaia build now");
    }

    #[test]
    fn blank_runs_collapse() {
        assert_eq!(to_plain_text("a\n\n\n\n\nb\r\n\r\n\r\nc"), "a\n\nb\n\nc");
    }

    #[test]
    fn malformed_input_is_kept() {
        assert_eq!(to_plain_text("a ** b ```"), "a ** b ```");
        assert_eq!(to_plain_text("   "), "");
    }
}
