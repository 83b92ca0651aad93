//! Allow-list HTML sanitizer configuration.
//!
//! This is the final pipeline step and the only security boundary: earlier
//! steps interpolate author-supplied URLs and text into raw HTML freely.
//! Disallowed tags are stripped but their text is kept; disallowed
//! attributes and URL schemes are dropped silently.

use std::collections::HashSet;

use ammonia::{Builder, UrlRelative};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::options::RenderOptions;

/// Tags every variant may emit.
pub const ALLOWED_TAGS: &[&str] = &[
    "h1", "h2", "h3", "h4", "h5", "h6", "p", "br", "strong", "em", "span", "code", "pre", "ul",
    "ol", "li", "div", "a", "img", "blockquote", "hr", "details", "summary", "input", "label",
    "table", "thead", "tbody", "tr", "th", "td",
];

/// Allowed on every tag. `rel` is absent on purpose: the sanitizer sets it on
/// every link itself.
pub const ALLOWED_ATTRIBUTES: &[&str] = &[
    "class",
    "href",
    "src",
    "alt",
    "target",
    "loading",
    "width",
    "height",
    "style",
    "allow",
    "allowfullscreen",
    "type",
    "disabled",
    "checked",
];

/// Schemes accepted in `href` / `src`. Relative URLs pass through.
pub const ALLOWED_URL_SCHEMES: &[&str] = &[
    "http", "https", "ftp", "ftps", "mailto", "tel", "callto", "sms", "cid", "xmpp", "matrix",
];

pub const LINK_REL: &str = "noopener noreferrer";

static EMPTY_PARAGRAPH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<p>\s*</p>").expect("invalid empty paragraph regex"));

fn policy(options: &RenderOptions) -> Builder<'static> {
    let mut tags: HashSet<&'static str> = ALLOWED_TAGS.iter().copied().collect();
    if options.video_embeds {
        tags.insert("iframe");
    }

    let mut builder = Builder::empty();
    builder
        .tags(tags)
        .generic_attributes(ALLOWED_ATTRIBUTES.iter().copied().collect())
        .url_schemes(ALLOWED_URL_SCHEMES.iter().copied().collect())
        .url_relative(UrlRelative::PassThrough)
        .link_rel(Some(LINK_REL))
        .clean_content_tags(["script", "style"].into_iter().collect())
        .strip_comments(true);
    builder
}

/// Sanitize with the full policy (iframes allowed).
pub fn sanitize(html: &str) -> String {
    sanitize_with(html, &RenderOptions::full())
}

/// Sanitize with the policy matching `options`.
///
/// Empty paragraphs left behind by HTML parser normalisation (block elements
/// are not allowed inside `<p>`) are removed afterwards. The result is a fixed
/// point: sanitizing it again returns it unchanged.
pub fn sanitize_with(html: &str, options: &RenderOptions) -> String {
    let cleaned = policy(options).clean(html).to_string();
    EMPTY_PARAGRAPH.replace_all(&cleaned, "").into_owned()
}
