//! Author-facing validation for GAIA markdown.
//!
//! Flags constructs that the pipeline will silently degrade: unterminated
//! fences, math that will not typeset, video links that will not embed, URLs
//! the sanitizer will drop. Returns a list of `Diagnostic` items (non-fatal).

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Diagnostic, Severity, Span};
use crate::math::{self, MathRenderer};
use crate::sanitize::ALLOWED_URL_SCHEMES;
use crate::table::find_tables;
use crate::video::{bare_urls, inspect_video_url};

static LINK_TARGET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\]\(([^)\s]+)\)").expect("invalid link target regex"));
static URL_SCHEME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z][A-Za-z0-9+.-]*):").expect("invalid scheme regex"));
static CALLOUT_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^> \*\*([A-Za-z]+)\*\*:").expect("invalid callout label regex"));

const CALLOUT_LABELS: &[&str] = &["INFO", "WARNING", "SUCCESS"];

/// Validate content with the default math engine.
///
/// Never modifies the content.
pub fn validate(content: &str) -> Vec<Diagnostic> {
    validate_with(content, math::default_renderer())
}

/// Validate content, checking math spans against `engine`.
pub fn validate_with(content: &str, engine: &dyn MathRenderer) -> Vec<Diagnostic> {
    let content = content.replace("\r\n", "\n");
    let mut diagnostics = Vec::new();

    validate_fences(&content, &mut diagnostics);
    validate_math(&content, engine, &mut diagnostics);
    validate_videos(&content, &mut diagnostics);
    validate_urls(&content, &mut diagnostics);
    validate_tables(&content, &mut diagnostics);
    validate_callouts(&content, &mut diagnostics);

    diagnostics
}

fn line_of(content: &str, offset: usize) -> usize {
    content[..offset].matches('\n').count() + 1
}

fn validate_fences(content: &str, diagnostics: &mut Vec<Diagnostic>) {
    let fences: Vec<usize> = content.match_indices("```").map(|(i, _)| i).collect();
    if fences.len() % 2 == 1 {
        if let Some(&last) = fences.last() {
            let line = line_of(content, last);
            diagnostics.push(Diagnostic {
                severity: Severity::Warning,
                message: "Unterminated code fence: it will be shown as literal text".into(),
                span: Some(Span {
                    start_line: line,
                    end_line: content.lines().count().max(line),
                }),
                code: Some("G001".into()),
            });
        }
    }
}

fn validate_math(content: &str, engine: &dyn MathRenderer, diagnostics: &mut Vec<Diagnostic>) {
    let delimiters: Vec<usize> = content.match_indices("$$").map(|(i, _)| i).collect();
    if delimiters.len() % 2 == 1 {
        if let Some(&last) = delimiters.last() {
            diagnostics.push(Diagnostic {
                severity: Severity::Warning,
                message: "Unbalanced '$$': display math is not closed".into(),
                span: Some(Span::line(line_of(content, last))),
                code: Some("G002".into()),
            });
        }
    }

    for span in math::math_spans(content) {
        if let Err(err) = engine.render(&span.tex, span.mode) {
            diagnostics.push(Diagnostic {
                severity: Severity::Error,
                message: format!("Math expression '{}' failed to render: {err}", span.tex),
                span: Some(Span::line(line_of(content, span.start))),
                code: Some("G003".into()),
            });
        }
    }
}

fn validate_videos(content: &str, diagnostics: &mut Vec<Diagnostic>) {
    for (line, url) in bare_urls(content) {
        if let Some(Err(id)) = inspect_video_url(&url) {
            diagnostics.push(Diagnostic {
                severity: Severity::Warning,
                message: format!("Video link '{url}' has an invalid id '{id}' and will not be embedded"),
                span: Some(Span::line(line)),
                code: Some("G010".into()),
            });
        }
    }
}

fn validate_urls(content: &str, diagnostics: &mut Vec<Diagnostic>) {
    for caps in LINK_TARGET.captures_iter(content) {
        let Some(target) = caps.get(1) else { continue };
        let Some(scheme) = URL_SCHEME.captures(target.as_str()) else {
            continue;
        };
        let scheme = scheme[1].to_ascii_lowercase();
        if !ALLOWED_URL_SCHEMES.contains(&scheme.as_str()) {
            diagnostics.push(Diagnostic {
                severity: Severity::Warning,
                message: format!("URL scheme '{scheme}:' is not allowed; the link target will be removed"),
                span: Some(Span::line(line_of(content, target.start()))),
                code: Some("G020".into()),
            });
        }
    }
}

fn validate_tables(content: &str, diagnostics: &mut Vec<Diagnostic>) {
    let lines: Vec<&str> = content.split('\n').collect();
    for table in find_tables(&lines) {
        let width = table.headers.len();
        for (idx, row) in table.rows.iter().enumerate() {
            if row.len() != width {
                diagnostics.push(Diagnostic {
                    severity: Severity::Info,
                    message: format!("Table row has {} cells, header has {width}", row.len()),
                    span: Some(Span::line(table.start + 3 + idx)),
                    code: Some("G030".into()),
                });
            }
        }
    }
}

fn validate_callouts(content: &str, diagnostics: &mut Vec<Diagnostic>) {
    for caps in CALLOUT_LABEL.captures_iter(content) {
        let Some(label) = caps.get(1) else { continue };
        if !CALLOUT_LABELS.contains(&label.as_str()) {
            diagnostics.push(Diagnostic {
                severity: Severity::Info,
                message: format!(
                    "Unknown callout label '{}'; expected INFO, WARNING or SUCCESS",
                    label.as_str()
                ),
                span: Some(Span::line(line_of(content, label.start()))),
                code: Some("G040".into()),
            });
        }
    }
}
