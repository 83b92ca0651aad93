//! Math extraction and rendering.
//!
//! Display math (`$$…$$`, may span lines) is extracted before inline math
//! (`$…$`, single line). Each span goes through a [`MathRenderer`]; a failure
//! becomes a visible error span holding the offending source instead of
//! aborting the render.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::error::MathError;
use crate::placeholder::{PlaceholderKind, Placeholders};
use crate::render::escape_html;

static DISPLAY_MATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\$\$(.+?)\$\$").expect("invalid display math regex"));
static INLINE_MATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$([^$\n]+?)\$").expect("invalid inline math regex"));
static ENVIRONMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\(begin|end)\{([^}]*)\}").expect("invalid environment regex"));

/// Whether a span is typeset inline or as a centered block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathMode {
    Inline,
    Display,
}

/// A TeX-to-HTML engine.
///
/// Implementations must be pure and reentrant: the renderer may be called
/// concurrently from several threads.
pub trait MathRenderer: Send + Sync {
    fn render(&self, tex: &str, mode: MathMode) -> Result<String, MathError>;
}

/// Emits escaped TeX inside `\( … \)` / `\[ … \]` delimiters for client-side
/// KaTeX auto-render, after a structural sanity check.
///
/// Only brace balance and `\begin`/`\end` pairing are checked. Command names
/// are not: `\invalidcmd{x}` passes here and fails later in the browser. Build
/// with the `katex` feature to catch those at render and validate time.
#[derive(Debug, Clone, Copy, Default)]
pub struct TexPassthrough;

impl MathRenderer for TexPassthrough {
    fn render(&self, tex: &str, mode: MathMode) -> Result<String, MathError> {
        check_structure(tex)?;
        let escaped = escape_html(tex);
        Ok(match mode {
            MathMode::Inline => format!("\\({escaped}\\)"),
            MathMode::Display => format!("\\[{escaped}\\]"),
        })
    }
}

/// Server-side rendering through the `katex` crate (HTML output only).
#[cfg(feature = "katex")]
#[derive(Debug, Clone, Copy, Default)]
pub struct KatexRenderer;

#[cfg(feature = "katex")]
impl MathRenderer for KatexRenderer {
    fn render(&self, tex: &str, mode: MathMode) -> Result<String, MathError> {
        if tex.trim().is_empty() {
            return Err(MathError::Empty);
        }
        let opts = katex::Opts::builder()
            .display_mode(mode == MathMode::Display)
            .output_type(katex::OutputType::Html)
            .throw_on_error(true)
            .build()
            .map_err(|e| MathError::Engine {
                message: e.to_string(),
            })?;
        katex::render_with_opts(tex, &opts).map_err(|e| MathError::Engine {
            message: e.to_string(),
        })
    }
}

#[cfg(feature = "katex")]
static DEFAULT_ENGINE: KatexRenderer = KatexRenderer;
#[cfg(not(feature = "katex"))]
static DEFAULT_ENGINE: TexPassthrough = TexPassthrough;

/// The engine used by [`crate::render`] for the enabled feature set.
pub fn default_renderer() -> &'static dyn MathRenderer {
    &DEFAULT_ENGINE
}

/// Whether the default engine leaves typesetting to client-side KaTeX.
pub fn needs_client_assets() -> bool {
    !cfg!(feature = "katex")
}

/// A math span found in source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MathSpan {
    pub mode: MathMode,
    pub tex: String,
    /// Byte offset of the opening delimiter.
    pub start: usize,
}

/// Locate every math span, display spans first, in source order per mode.
pub fn math_spans(input: &str) -> Vec<MathSpan> {
    let mut spans = Vec::new();
    let mut masked = input.to_string();

    for m in DISPLAY_MATH.captures_iter(input) {
        let Some(whole) = m.get(0) else { continue };
        spans.push(MathSpan {
            mode: MathMode::Display,
            tex: m[1].trim().to_string(),
            start: whole.start(),
        });
        masked.replace_range(whole.range(), &" ".repeat(whole.len()));
    }

    for m in INLINE_MATH.captures_iter(&masked) {
        let Some(whole) = m.get(0) else { continue };
        spans.push(MathSpan {
            mode: MathMode::Inline,
            tex: m[1].trim().to_string(),
            start: whole.start(),
        });
    }

    spans
}

/// Pipeline step 1: replace math spans by placeholders holding rendered HTML.
pub(crate) fn extract_math(
    input: &str,
    engine: &dyn MathRenderer,
    placeholders: &mut Placeholders,
) -> String {
    let with_display = DISPLAY_MATH
        .replace_all(input, |caps: &Captures| {
            let html = render_span(engine, caps[1].trim(), MathMode::Display);
            placeholders.stash(PlaceholderKind::Math, html, &caps[0])
        })
        .into_owned();

    INLINE_MATH
        .replace_all(&with_display, |caps: &Captures| {
            let html = render_span(engine, caps[1].trim(), MathMode::Inline);
            placeholders.stash(PlaceholderKind::Math, html, &caps[0])
        })
        .into_owned()
}

/// Render one span and wrap it in its container, or in an error marker.
pub fn render_span(engine: &dyn MathRenderer, tex: &str, mode: MathMode) -> String {
    let inner = match engine.render(tex, mode) {
        Ok(html) => html.replace('\n', " "),
        Err(err) => {
            tracing::warn!(%err, tex, "math rendering failed, keeping source");
            return error_markup(tex, mode);
        }
    };
    match mode {
        MathMode::Display => format!(
            "<div class=\"gaia-math-display\" style=\"text-align: center; overflow-x: auto;\">{inner}</div>"
        ),
        MathMode::Inline => format!("<span class=\"gaia-math-inline\">{inner}</span>"),
    }
}

fn error_markup(tex: &str, mode: MathMode) -> String {
    let source = escape_html(tex);
    let span = format!(
        "<span class=\"gaia-math-error\" style=\"color: #dc2626;\">\u{26a0} Math error: <code>{source}</code></span>"
    );
    match mode {
        MathMode::Display => format!("<div class=\"gaia-math-display gaia-math-failed\">{span}</div>"),
        MathMode::Inline => span,
    }
}

/// Cheap structural validation: balanced braces and paired environments.
fn check_structure(tex: &str) -> Result<(), MathError> {
    if tex.trim().is_empty() {
        return Err(MathError::Empty);
    }

    let mut depth: i64 = 0;
    let mut escaped = false;
    for ch in tex.chars() {
        match ch {
            '\\' if !escaped => {
                escaped = true;
                continue;
            }
            '{' if !escaped => depth += 1,
            '}' if !escaped => {
                depth -= 1;
                if depth < 0 {
                    return Err(MathError::UnbalancedBraces);
                }
            }
            _ => {}
        }
        escaped = false;
    }
    if depth != 0 {
        return Err(MathError::UnbalancedBraces);
    }

    let mut open: Vec<&str> = Vec::new();
    for caps in ENVIRONMENT.captures_iter(tex) {
        let name = caps.get(2).map_or("", |m| m.as_str());
        if &caps[1] == "begin" {
            open.push(name);
        } else if open.pop() != Some(name) {
            return Err(MathError::UnmatchedEnvironment {
                name: name.to_string(),
            });
        }
    }
    if let Some(name) = open.pop() {
        return Err(MathError::UnmatchedEnvironment {
            name: name.to_string(),
        });
    }

    Ok(())
}
