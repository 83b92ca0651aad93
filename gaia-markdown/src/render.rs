//! The GAIA markdown → HTML pipeline.
//!
//! A fixed, ordered list of substitutions. Order is load-bearing: each rule
//! assumes the rules before it have already run and must never re-interpret
//! their output. Math, fenced code and inline code are protected by
//! placeholders; every other rule rewrites the working string in place.
//! Sanitization runs last.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::math::{self, MathRenderer};
use crate::options::RenderOptions;
use crate::placeholder::{PlaceholderKind, Placeholders};
use crate::sanitize::sanitize_with;
use crate::table::{is_separator_row, render_tables};
use crate::video::embed_videos;

static FENCED_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```(.*?)```").expect("invalid fenced code regex"));
static FENCE_LANG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_+.-]+$").expect("invalid fence language regex"));
static INLINE_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"`([^`\n]+)`").expect("invalid inline code regex"));
static IMAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!\[([^\]\n]*)\]\(([^)\s]+)\)").expect("invalid image regex"));
static LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]\n]+)\]\(([^)\s]+)\)").expect("invalid link regex"));
static H3: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^### (.+)$").expect("invalid h3 regex"));
static H2: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^## (.+)$").expect("invalid h2 regex"));
static H1: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^# (.+)$").expect("invalid h1 regex"));
static CALLOUT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^> \*\*(INFO|WARNING|SUCCESS)\*\*:[ \t]*(.*)$").expect("invalid callout regex")
});
static BLOCKQUOTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^> (.+)$").expect("invalid blockquote regex"));
static RULE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^---$").expect("invalid rule regex"));
static TASK_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^- \[ \] (.+)$").expect("invalid open task regex"));
static TASK_DONE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^- \[[xX]\] (.+)$").expect("invalid done task regex"));
static BULLET: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^- (.+)$").expect("invalid bullet regex"));
static NUMBERED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\d+\. (.+)$").expect("invalid numbered regex"));
static BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.+?)\*\*").expect("invalid bold regex"));
static ITALIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*([^*\n]+?)\*").expect("invalid italic regex"));
static ACCORDION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<details(?:\s[^>]*)?>\s*<summary>(.*?)</summary>(.*?)</details>")
        .expect("invalid accordion regex")
});
static PARAGRAPH_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n\s*\n").expect("invalid paragraph regex"));
static BR_AFTER_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(</(?:h[1-6]|div|blockquote|ul|ol|li|table|pre|details|summary)>|<hr[^>]*>)(?:<br>)+",
    )
    .expect("invalid trailing break regex")
});
static BR_BEFORE_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:<br>)+(<(?:h[1-6]|div|blockquote|ul|ol|li|table|pre|hr|details)\b)")
        .expect("invalid leading break regex")
});

const BULLET_ITEM: &str = "<li class=\"gaia-list-item gaia-bullet\">";
const NUMBERED_ITEM: &str = "<li class=\"gaia-list-item gaia-numbered\">";

/// Render `content` with the full variant and the default math engine.
pub fn render(content: &str) -> String {
    render_with(content, &RenderOptions::full())
}

/// Render `content` with the given stage selection.
pub fn render_with(content: &str, options: &RenderOptions) -> String {
    render_with_math(content, options, math::default_renderer())
}

/// Render `content` with an explicit math engine.
///
/// Never panics; malformed input degrades to literal text and math failures
/// to visible error spans.
pub fn render_with_math(
    content: &str,
    options: &RenderOptions,
    engine: &dyn MathRenderer,
) -> String {
    let normalised = content.replace("\r\n", "\n");
    let source = normalised.trim();
    if source.is_empty() {
        return String::new();
    }

    let mut placeholders = Placeholders::new();

    // 1-3: protected spans and inline code.
    let mut html = math::extract_math(source, engine, &mut placeholders);
    html = extract_code_blocks(&html, &mut placeholders);
    html = extract_inline_code(&html, &mut placeholders);

    // 4-6: embeds, images, links.
    if options.video_embeds {
        html = embed_videos(&html);
    }
    // Attribute values get their author text back in place of placeholders.
    html = IMAGE
        .replace_all(&html, |caps: &Captures| {
            format!(
                "<img src=\"{}\" alt=\"{}\" loading=\"lazy\" class=\"gaia-image\" style=\"max-width: 100%; height: auto;\">",
                escape_attr(&placeholders.restore_sources(&caps[2])),
                escape_attr(&placeholders.restore_sources(&caps[1])),
            )
        })
        .into_owned();
    html = LINK
        .replace_all(&html, |caps: &Captures| {
            format!(
                "<a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\" class=\"gaia-link\">{}</a>",
                escape_attr(&placeholders.restore_sources(&caps[2])),
                &caps[1],
            )
        })
        .into_owned();

    // 7: longest header prefix first.
    html = H3.replace_all(&html, "<h3 class=\"gaia-h3\">$1</h3>").into_owned();
    html = H2.replace_all(&html, "<h2 class=\"gaia-h2\">$1</h2>").into_owned();
    html = H1.replace_all(&html, "<h1 class=\"gaia-h1\">$1</h1>").into_owned();

    // 8-10: callouts before generic quotes.
    html = CALLOUT.replace_all(&html, render_callout).into_owned();
    html = BLOCKQUOTE
        .replace_all(&html, "<blockquote class=\"gaia-blockquote\">$1</blockquote>")
        .into_owned();
    html = RULE.replace_all(&html, "<hr class=\"gaia-hr\">").into_owned();

    // 11-12: tasks before bullets.
    html = TASK_OPEN
        .replace_all(
            &html,
            "<div class=\"gaia-task\"><input type=\"checkbox\" disabled class=\"gaia-checkbox\"> <label class=\"gaia-task-label\">$1</label></div>",
        )
        .into_owned();
    html = TASK_DONE
        .replace_all(
            &html,
            "<div class=\"gaia-task\"><input type=\"checkbox\" checked disabled class=\"gaia-checkbox\"> <label class=\"gaia-task-label gaia-task-done\" style=\"text-decoration: line-through;\">$1</label></div>",
        )
        .into_owned();
    html = BULLET
        .replace_all(&html, |caps: &Captures| {
            // `- | -` is a table separator, not an item.
            if is_separator_row(&caps[0]) {
                caps[0].to_string()
            } else {
                format!("{BULLET_ITEM}{}</li>", &caps[1])
            }
        })
        .into_owned();
    html = NUMBERED
        .replace_all(&html, format!("{NUMBERED_ITEM}$1</li>").as_str())
        .into_owned();

    // 13: bold before italic.
    html = BOLD.replace_all(&html, "<strong>$1</strong>").into_owned();
    html = ITALIC.replace_all(&html, "<em>$1</em>").into_owned();

    // Items are joined onto one line, so emphasis must already be resolved.
    if options.wrap_list_items {
        html = wrap_list_items(&html);
    }

    // 14-15
    html = render_tables(&html);
    if options.accordions {
        html = ACCORDION.replace_all(&html, render_accordion).into_owned();
    }

    // 16-18
    html = placeholders.restore_all(&html);
    html = fold_paragraphs(&html);
    tracing::debug!(
        math = placeholders.len(PlaceholderKind::Math),
        code = placeholders.len(PlaceholderKind::Code),
        inline_code = placeholders.len(PlaceholderKind::InlineCode),
        "rendered content, sanitizing"
    );
    sanitize_with(&html, options)
}

/// Pipeline step 2.
fn extract_code_blocks(input: &str, placeholders: &mut Placeholders) -> String {
    FENCED_CODE
        .replace_all(input, |caps: &Captures| {
            let raw = &caps[1];
            let (lang, body) = match raw.split_once('\n') {
                Some((first, rest)) if FENCE_LANG.is_match(first.trim()) => {
                    (Some(first.trim()), rest)
                }
                _ => (None, raw),
            };
            let class = match lang {
                Some(l) => format!(" class=\"language-{}\"", escape_html(l)),
                None => String::new(),
            };
            let code = escape_html(body.trim()).replace('\n', "&#10;");
            placeholders.stash(
                PlaceholderKind::Code,
                format!("<pre class=\"gaia-code-block\"><code{class}>{code}</code></pre>"),
                &caps[0],
            )
        })
        .into_owned()
}

/// Pipeline step 3.
fn extract_inline_code(input: &str, placeholders: &mut Placeholders) -> String {
    INLINE_CODE
        .replace_all(input, |caps: &Captures| {
            placeholders.stash(
                PlaceholderKind::InlineCode,
                format!("<code class=\"gaia-inline-code\">{}</code>", escape_html(&caps[1])),
                &caps[0],
            )
        })
        .into_owned()
}

fn render_callout(caps: &Captures) -> String {
    let (kind, icon, label) = match &caps[1] {
        "WARNING" => ("warning", "\u{26a0}\u{fe0f}", "Warning"),
        "SUCCESS" => ("success", "\u{2705}", "Success"),
        _ => ("info", "\u{2139}\u{fe0f}", "Info"),
    };
    format!(
        "<div class=\"gaia-callout gaia-callout-{kind}\"><span class=\"gaia-callout-icon\">{icon}</span>\
<div class=\"gaia-callout-body\"><strong class=\"gaia-callout-label\">{label}</strong> {}</div></div>",
        &caps[2]
    )
}

fn render_accordion(caps: &Captures) -> String {
    format!(
        "<details class=\"gaia-accordion\"><summary class=\"gaia-accordion-summary\">{}</summary>\
<div class=\"gaia-accordion-body\"><hr class=\"gaia-accordion-divider\">{}</div></details>",
        caps[1].trim(),
        caps[2].trim(),
    )
}

/// Wrap runs of consecutive bullet / numbered items in `<ul>` / `<ol>`.
fn wrap_list_items(input: &str) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut run: Vec<&str> = Vec::new();
    let mut run_kind: Option<&str> = None;

    for line in input.split('\n') {
        let kind = [BULLET_ITEM, NUMBERED_ITEM]
            .into_iter()
            .find(|prefix| line.starts_with(prefix) && line.ends_with("</li>"));
        match kind {
            Some(k) if run_kind == Some(k) => run.push(line),
            Some(k) => {
                flush_list(&mut run, run_kind, &mut out);
                run_kind = Some(k);
                run.push(line);
            }
            None => {
                flush_list(&mut run, run_kind, &mut out);
                run_kind = None;
                out.push(line.to_string());
            }
        }
    }
    flush_list(&mut run, run_kind, &mut out);
    out.join("\n")
}

fn flush_list(run: &mut Vec<&str>, kind: Option<&str>, out: &mut Vec<String>) {
    if run.is_empty() {
        return;
    }
    let (open, close) = if kind == Some(NUMBERED_ITEM) {
        ("<ol class=\"gaia-list gaia-list-numbered\">", "</ol>")
    } else {
        ("<ul class=\"gaia-list gaia-list-bullet\">", "</ul>")
    };
    out.push(format!("{open}{}{close}", run.concat()));
    run.clear();
}

/// Pipeline step 17.
fn fold_paragraphs(input: &str) -> String {
    let folded = PARAGRAPH_BREAK.replace_all(input, "</p><p>");
    let folded = format!("<p>{}</p>", folded.replace('\n', "<br>"));
    let folded = BR_AFTER_BLOCK.replace_all(&folded, "$1");
    BR_BEFORE_BLOCK.replace_all(&folded, "$1").into_owned()
}

/// Escape text for an HTML text node or a double-quoted attribute.
pub(crate) fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Escape a URL or alt text for a double-quoted attribute.
///
/// `*` and `|` are entity-encoded as well so that emphasis and table rules
/// running later leave the value intact.
fn escape_attr(s: &str) -> String {
    escape_html(s).replace('*', "&#42;").replace('|', "&#124;")
}
