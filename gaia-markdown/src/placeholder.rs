//! Placeholder tokens protecting pre-rendered spans.
//!
//! Math, fenced code and inline code are rendered early, stashed here, and
//! replaced in the working string by `__<LABEL>_<n>__` tokens so that later
//! substitution passes cannot touch their content. The pipeline restores them
//! verbatim just before paragraph folding.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static CODE_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"__CODE_BLOCK_(\d+)__").expect("invalid code token regex"));
static MATH_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"__MATH_BLOCK_(\d+)__").expect("invalid math token regex"));
static INLINE_CODE_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"__INLINE_CODE_(\d+)__").expect("invalid inline code token regex"));

/// The class of span a placeholder stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderKind {
    Code,
    Math,
    InlineCode,
}

const ALL_KINDS: [PlaceholderKind; 3] = [
    PlaceholderKind::InlineCode,
    PlaceholderKind::Code,
    PlaceholderKind::Math,
];

impl PlaceholderKind {
    fn label(self) -> &'static str {
        match self {
            PlaceholderKind::Code => "CODE_BLOCK",
            PlaceholderKind::Math => "MATH_BLOCK",
            PlaceholderKind::InlineCode => "INLINE_CODE",
        }
    }

    fn pattern(self) -> &'static Regex {
        match self {
            PlaceholderKind::Code => &CODE_TOKEN,
            PlaceholderKind::Math => &MATH_TOKEN,
            PlaceholderKind::InlineCode => &INLINE_CODE_TOKEN,
        }
    }
}

/// A stashed span: its rendered HTML and the author text it came from.
#[derive(Debug, Clone)]
struct Entry {
    html: String,
    source: String,
}

/// Per-call store of rendered HTML keyed by placeholder index.
///
/// One instance lives for exactly one render call.
#[derive(Debug, Default)]
pub struct Placeholders {
    code: Vec<Entry>,
    math: Vec<Entry>,
    inline_code: Vec<Entry>,
}

impl Placeholders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `html`, rendered from `source`, and return the token that
    /// stands in for it.
    pub fn stash(&mut self, kind: PlaceholderKind, html: String, source: &str) -> String {
        let store = self.store_mut(kind);
        let index = store.len();
        store.push(Entry {
            html,
            source: source.to_string(),
        });
        format!("__{}_{index}__", kind.label())
    }

    /// Replace every token of `kind` with its stored HTML.
    ///
    /// Tokens without a stored entry (an author typing one literally) are
    /// left untouched.
    pub fn restore(&self, input: &str, kind: PlaceholderKind) -> String {
        self.replace_tokens(input, kind, |entry| &entry.html)
    }

    /// Restore inline code, then code blocks, then math.
    pub fn restore_all(&self, input: &str) -> String {
        ALL_KINDS
            .iter()
            .fold(input.to_string(), |acc, &kind| self.restore(&acc, kind))
    }

    /// Put the original author text back in place of every token.
    ///
    /// Used where rendered HTML cannot go, such as inside an attribute value.
    pub fn restore_sources(&self, input: &str) -> String {
        ALL_KINDS.iter().fold(input.to_string(), |acc, &kind| {
            self.replace_tokens(&acc, kind, |entry| &entry.source)
        })
    }

    pub fn len(&self, kind: PlaceholderKind) -> usize {
        self.store(kind).len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty() && self.math.is_empty() && self.inline_code.is_empty()
    }

    fn replace_tokens<F>(&self, input: &str, kind: PlaceholderKind, pick: F) -> String
    where
        F: Fn(&Entry) -> &String,
    {
        let store = self.store(kind);
        if store.is_empty() {
            return input.to_string();
        }
        kind.pattern()
            .replace_all(input, |caps: &Captures| {
                caps[1]
                    .parse::<usize>()
                    .ok()
                    .and_then(|i| store.get(i))
                    .map(|entry| pick(entry).clone())
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }

    fn store(&self, kind: PlaceholderKind) -> &Vec<Entry> {
        match kind {
            PlaceholderKind::Code => &self.code,
            PlaceholderKind::Math => &self.math,
            PlaceholderKind::InlineCode => &self.inline_code,
        }
    }

    fn store_mut(&mut self, kind: PlaceholderKind) -> &mut Vec<Entry> {
        match kind {
            PlaceholderKind::Code => &mut self.code,
            PlaceholderKind::Math => &mut self.math,
            PlaceholderKind::InlineCode => &mut self.inline_code,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn tokens_are_indexed_per_kind() {
        let mut ph = Placeholders::new();
        assert_eq!(ph.stash(PlaceholderKind::Math, "<m0>".into(), "$a$"), "__MATH_BLOCK_0__");
        assert_eq!(ph.stash(PlaceholderKind::Math, "<m1>".into(), "$b$"), "__MATH_BLOCK_1__");
        assert_eq!(ph.stash(PlaceholderKind::Code, "<c0>".into(), "```c```"), "__CODE_BLOCK_0__");
        assert_eq!(
            ph.stash(PlaceholderKind::InlineCode, "<i0>".into(), "`i`"),
            "__INLINE_CODE_0__"
        );
        assert_eq!(ph.len(PlaceholderKind::Math), 2);
        assert_eq!(ph.len(PlaceholderKind::Code), 1);
        assert_eq!(ph.len(PlaceholderKind::InlineCode), 1);
    }

    #[test]
    fn restore_replaces_known_tokens() {
        let mut ph = Placeholders::new();
        let a = ph.stash(PlaceholderKind::Math, "<span>a</span>".into(), "$a$");
        let b = ph.stash(PlaceholderKind::Code, "<pre>b</pre>".into(), "```b```");
        let c = ph.stash(PlaceholderKind::InlineCode, "<code>c</code>".into(), "`c`");
        let out = ph.restore_all(&format!("x {a} y {b} z {c}"));
        assert_eq!(out, "x <span>a</span> y <pre>b</pre> z <code>c</code>");
    }

    #[test]
    fn unknown_index_stays_literal() {
        let mut ph = Placeholders::new();
        ph.stash(PlaceholderKind::Math, "<span>a</span>".into(), "$a$");
        let out = ph.restore_all("__MATH_BLOCK_7__ and __CODE_BLOCK_0__");
        assert_eq!(out, "__MATH_BLOCK_7__ and __CODE_BLOCK_0__");
    }

    #[test]
    fn math_inside_restored_code_is_restored() {
        let mut ph = Placeholders::new();
        let m = ph.stash(PlaceholderKind::Math, "<span>m</span>".into(), "$m$");
        let c = ph.stash(PlaceholderKind::Code, format!("<pre>{m}</pre>"), "```m```");
        let i = ph.stash(PlaceholderKind::InlineCode, format!("<code>{m}</code>"), "`$m$`");
        assert_eq!(ph.restore_all(&c), "<pre><span>m</span></pre>");
        assert_eq!(ph.restore_all(&i), "<code><span>m</span></code>");
    }

    #[test]
    fn sources_replace_tokens_verbatim() {
        let mut ph = Placeholders::new();
        let m = ph.stash(PlaceholderKind::Math, "<span>a</span>".into(), "$a$");
        let i = ph.stash(PlaceholderKind::InlineCode, "<code>x</code>".into(), "`x`");
        assert_eq!(
            ph.restore_sources(&format!("https://x.test/{m}/{i}")),
            "https://x.test/$a$/`x`"
        );
        assert_eq!(ph.restore_sources("__MATH_BLOCK_3__"), "__MATH_BLOCK_3__");
    }
}
