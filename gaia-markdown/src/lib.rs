//! `gaia-markdown` — renderer for the GAIA markdown dialect.
//!
//! GAIA markdown is the constrained authoring format used by the Projet Gaia
//! admin: a markdown subset plus LaTeX math, bare video links, reserved
//! callouts and raw `<details>` accordions. This crate turns that text into
//! sanitized HTML through a fixed, ordered pipeline of substitutions, or into
//! a plain-text reduction used before PDF pagination.
//!
//! # Quick start
//!
//! ```
//! let html = gaia_markdown::render("## Roadmap\n\n- [x] Prototype");
//! assert!(html.contains("<h2"));
//! assert!(html.contains("checked"));
//!
//! let text = gaia_markdown::to_plain_text("**bold** and *italic*");
//! assert_eq!(text, "bold and italic");
//! ```

pub mod error;
pub mod front_matter;
pub mod math;
pub mod options;
pub mod page;
pub mod placeholder;
pub mod plain;
pub mod render;
#[cfg(feature = "terminal")]
pub mod render_term;
pub mod sanitize;
pub mod section;
pub mod stream;
pub mod table;
pub mod validate;
pub mod video;

pub use error::*;
pub use front_matter::{FrontMatter, split_front_matter};
pub use math::{MathMode, MathRenderer};
pub use options::{RenderOptions, Variant};
pub use page::{PageConfig, to_html_page};
pub use plain::to_plain_text;
pub use render::{render, render_with, render_with_math};
#[cfg(feature = "terminal")]
pub use render_term::to_terminal;
pub use sanitize::{sanitize, sanitize_with};
pub use section::{Section, render_sections};
pub use validate::validate;
