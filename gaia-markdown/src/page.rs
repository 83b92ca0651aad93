//! Standalone HTML pages around rendered content.

use crate::math;
use crate::render::escape_html;

const KATEX_VERSION: &str = "0.16.9";

/// Configuration for full-page HTML rendering.
#[derive(Debug, Clone)]
pub struct PageConfig {
    /// Page title (default: "Projet Gaia").
    pub title: Option<String>,
    /// Optional language code (default: "fr").
    pub lang: Option<String>,
    /// Optional meta description.
    pub description: Option<String>,
    /// Include the KaTeX stylesheet, plus the auto-render scripts when math
    /// is typeset client-side.
    pub math_assets: bool,
    /// Source file the page was built from, noted in a leading comment.
    pub source_path: Option<String>,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            title: None,
            lang: None,
            description: None,
            math_assets: true,
            source_path: None,
        }
    }
}

/// Wrap an already rendered, sanitized body in a complete HTML document.
///
/// The body is inserted as is; title, language and description are escaped.
pub fn to_html_page(body_html: &str, config: &PageConfig) -> String {
    let lang = config.lang.as_deref().unwrap_or("fr");
    let title = config.title.as_deref().unwrap_or("Projet Gaia");

    let mut head_extra = String::new();
    if let Some(desc) = &config.description {
        head_extra.push_str(&format!(
            "\n    <meta name=\"description\" content=\"{}\">",
            escape_html(desc)
        ));
    }
    if config.math_assets {
        head_extra.push_str(&katex_assets(math::needs_client_assets()));
    }

    let comment = match &config.source_path {
        Some(path) => format!("<!-- Built with gaia from {} -->\n", escape_html(path)),
        None => String::new(),
    };

    format!(
        r#"{comment}<!DOCTYPE html>
<html lang="{lang}">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <meta name="generator" content="gaia {version}">
    <title>{title}</title>{head_extra}
    <style>{css}</style>
</head>
<body>
<article class="gaia-content">
{body_html}
</article>
</body>
</html>"#,
        lang = escape_html(lang),
        version = env!("CARGO_PKG_VERSION"),
        title = escape_html(title),
        css = GAIA_CSS,
    )
}

fn katex_assets(client_side: bool) -> String {
    let base = format!("https://cdn.jsdelivr.net/npm/katex@{KATEX_VERSION}/dist");
    let mut assets = format!("\n    <link rel=\"stylesheet\" href=\"{base}/katex.min.css\">");
    if client_side {
        assets.push_str(&format!(
            "\n    <script defer src=\"{base}/katex.min.js\"></script>\
             \n    <script defer src=\"{base}/contrib/auto-render.min.js\" \
             onload=\"renderMathInElement(document.body);\"></script>"
        ));
    }
    assets
}

/// Embedded CSS for standalone pages. Covers every `gaia-*` class the
/// pipeline emits.
const GAIA_CSS: &str = r#"
:root {
    --bg: #f8fafc;
    --bg-card: #ffffff;
    --border: #e2e8f0;
    --text: #0f172a;
    --text-dim: #475569;
    --accent: #059669;
    --info: #2563eb;
    --warning: #d97706;
    --success: #16a34a;
    --danger: #dc2626;
}

*, *::before, *::after { box-sizing: border-box; }
body { margin: 0; background: var(--bg); color: var(--text); font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif; }
.gaia-content { max-width: 48rem; margin: 0 auto; padding: 2rem 1.5rem 4rem; line-height: 1.7; }
.gaia-content p { margin: 0.75rem 0; }

/* Headers */
.gaia-h1 { font-size: 2rem; font-weight: 700; margin: 2rem 0 1rem; }
.gaia-h2 { font-size: 1.5rem; font-weight: 600; margin: 1.75rem 0 0.75rem; padding-bottom: 0.4rem; border-bottom: 1px solid var(--border); }
.gaia-h3 { font-size: 1.2rem; font-weight: 600; margin: 1.5rem 0 0.5rem; }

/* Inline */
.gaia-link { color: var(--accent); text-decoration: none; }
.gaia-link:hover { text-decoration: underline; }
.gaia-inline-code { font-family: "Fira Code", monospace; font-size: 0.85em; background: #f1f5f9; padding: 0.1em 0.35em; border-radius: 4px; }
.gaia-image { display: block; margin: 1rem auto; border-radius: 8px; }

/* Blocks */
.gaia-code-block { background: #0f172a; color: #e2e8f0; border-radius: 8px; padding: 1rem; overflow-x: auto; font-size: 0.85rem; }
.gaia-blockquote { border-left: 3px solid var(--border); margin: 1rem 0; padding: 0.25rem 1rem; color: var(--text-dim); }
.gaia-hr { border: 0; border-top: 1px solid var(--border); margin: 2rem 0; }
.gaia-list { margin: 0.5rem 0; padding-left: 1.5rem; }
.gaia-list-item { margin: 0.25rem 0; }
.gaia-bullet { list-style: disc; }
.gaia-numbered { list-style: decimal; }
.gaia-task { display: flex; align-items: center; gap: 0.5rem; margin: 0.25rem 0; }
.gaia-task-done { color: var(--text-dim); }

/* Callouts */
.gaia-callout { display: flex; gap: 0.75rem; padding: 0.75rem 1rem; margin: 1rem 0; border-radius: 8px; border-left: 4px solid; }
.gaia-callout-info { border-color: var(--info); background: #eff6ff; }
.gaia-callout-warning { border-color: var(--warning); background: #fffbeb; }
.gaia-callout-success { border-color: var(--success); background: #f0fdf4; }
.gaia-callout-label { margin-right: 0.25rem; }

/* Tables */
.gaia-table { width: 100%; border-collapse: collapse; margin: 1rem 0; font-size: 0.9rem; }
.gaia-th { text-align: left; padding: 0.5rem 0.75rem; border-bottom: 2px solid var(--border); background: #f1f5f9; }
.gaia-td { padding: 0.5rem 0.75rem; border-bottom: 1px solid var(--border); }

/* Accordions */
.gaia-accordion { border: 1px solid var(--border); border-radius: 8px; margin: 1rem 0; background: var(--bg-card); }
.gaia-accordion-summary { cursor: pointer; font-weight: 600; padding: 0.75rem 1rem; }
.gaia-accordion-body { padding: 0 1rem 1rem; }
.gaia-accordion-divider { border: 0; border-top: 1px solid var(--border); margin: 0 0 0.75rem; }

/* Media and math */
.gaia-video { margin: 1.5rem 0; border-radius: 8px; }
.gaia-math-display { margin: 1rem 0; }
.gaia-math-error { font-family: monospace; }
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_wraps_body() {
        let html = to_html_page("<h2 class=\"gaia-h2\">Hi</h2>", &PageConfig::default());
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<html lang=\"fr\">"));
        assert!(html.contains("<title>Projet Gaia</title>"));
        assert!(html.contains("<article class=\"gaia-content\">\n<h2 class=\"gaia-h2\">Hi</h2>\n</article>"));
        assert!(html.contains(".gaia-callout-warning"));
    }

    #[test]
    fn title_and_description_escaped() {
        let config = PageConfig {
            title: Some("A <b> & B".into()),
            description: Some("\"quoted\"".into()),
            ..Default::default()
        };
        let html = to_html_page("", &config);
        assert!(html.contains("<title>A &lt;b&gt; &amp; B</title>"));
        assert!(html.contains("content=\"&quot;quoted&quot;\""));
    }

    #[test]
    fn math_assets_toggle() {
        let with = to_html_page("", &PageConfig::default());
        assert!(with.contains("katex.min.css"));
        assert_eq!(with.contains("auto-render.min.js"), math::needs_client_assets());

        let without = to_html_page(
            "",
            &PageConfig {
                math_assets: false,
                ..Default::default()
            },
        );
        assert!(!without.contains("katex"));
    }

    #[test]
    fn source_comment() {
        let config = PageConfig {
            source_path: Some("roadmap/index.md".into()),
            ..Default::default()
        };
        let html = to_html_page("", &config);
        assert!(html.starts_with("<!-- Built with gaia from roadmap/index.md -->\n<!DOCTYPE html>"));
    }
}
