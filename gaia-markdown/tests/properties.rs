//! Property-based tests using proptest.
//!
//! These tests verify that rendering never panics on arbitrary input and that
//! its output is already a fixed point of the sanitizer.

use gaia_markdown::{RenderOptions, render, render_with, sanitize_with, to_plain_text};
use proptest::prelude::*;

/// Markdown-shaped text: the characters the pipeline keys on, plus words.
fn gaia_text() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 #*_`$>|:!.()\\[\\]\\n-]{0,300}"
}

proptest! {
    /// Any random string fed to the renderer should never cause a panic.
    #[test]
    fn any_input_no_panic(input in "\\PC{0,500}") {
        let _ = render(&input);
        let _ = render_with(&input, &RenderOptions::compact());
        let _ = to_plain_text(&input);
    }

    /// Same input, same bytes.
    #[test]
    fn render_is_deterministic(input in gaia_text()) {
        prop_assert_eq!(render(&input), render(&input));
    }

    /// Sanitizing rendered output again changes nothing.
    #[test]
    fn rendered_output_is_sanitized(input in gaia_text(), compact in any::<bool>()) {
        let options = if compact { RenderOptions::compact() } else { RenderOptions::full() };
        let html = render_with(&input, &options);
        prop_assert_eq!(sanitize_with(&html, &options), html);
    }

    /// Script-scheme links never survive, whatever their casing.
    #[test]
    fn no_script_urls(
        text in "[a-z]{1,8}",
        scheme in "(?i)(javascript|vbscript)",
        payload in "[a-z0-9()]{0,12}",
    ) {
        let html = render(&format!("[{text}]({scheme}:{payload})"));
        let lower = html.to_lowercase();
        prop_assert!(!lower.contains("javascript:"), "leaked: {}", html);
        prop_assert!(!lower.contains("vbscript:"), "leaked: {}", html);
    }

    /// Plain text never carries tags from the source.
    #[test]
    fn plain_text_has_no_tags(word in "[a-z]{1,10}", tag in "(b|div|span|details)") {
        let text = to_plain_text(&format!("<{tag}>{word}</{tag}>"));
        prop_assert_eq!(text, word);
    }
}
