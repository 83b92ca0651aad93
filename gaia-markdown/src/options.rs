//! Pipeline configuration.
//!
//! The public roadmap pages and the calculation write-ups used to run two
//! separate copies of the renderer. Both are now presets of one pipeline whose
//! optional stages are switched on here.

use serde::{Deserialize, Serialize};

/// Named renderer preset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Roadmap and public content: video embeds and styled accordions.
    #[default]
    Full,
    /// Calculation write-ups and the admin preview.
    Compact,
}

impl Variant {
    pub fn options(self) -> RenderOptions {
        match self {
            Variant::Full => RenderOptions::full(),
            Variant::Compact => RenderOptions::compact(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Variant::Full => "full",
            Variant::Compact => "compact",
        }
    }
}

impl std::str::FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" => Ok(Variant::Full),
            "compact" => Ok(Variant::Compact),
            other => Err(format!("unknown variant '{other}' (expected 'full' or 'compact')")),
        }
    }
}

/// Switches for the optional pipeline stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderOptions {
    /// Replace bare YouTube/Vimeo links with iframes. Also allows `iframe`
    /// through the sanitizer.
    pub video_embeds: bool,
    /// Re-wrap raw `<details>` blocks with container classes.
    pub accordions: bool,
    /// Wrap runs of list items in `<ul>` / `<ol>`.
    pub wrap_list_items: bool,
}

impl RenderOptions {
    pub const fn full() -> Self {
        Self {
            video_embeds: true,
            accordions: true,
            wrap_list_items: true,
        }
    }

    pub const fn compact() -> Self {
        Self {
            video_embeds: false,
            accordions: false,
            wrap_list_items: true,
        }
    }

    pub const fn with_wrap_list_items(mut self, wrap: bool) -> Self {
        self.wrap_list_items = wrap;
        self
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::full()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn presets_differ_only_in_optional_stages() {
        let full = Variant::Full.options();
        let compact = Variant::Compact.options();
        assert!(full.video_embeds && full.accordions);
        assert!(!compact.video_embeds && !compact.accordions);
        assert_eq!(full.wrap_list_items, compact.wrap_list_items);
    }

    #[test]
    fn variant_parses_case_insensitively() {
        assert_eq!("Compact".parse::<Variant>(), Ok(Variant::Compact));
        assert_eq!(" full ".parse::<Variant>(), Ok(Variant::Full));
        assert!("fancy".parse::<Variant>().is_err());
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let opts: RenderOptions = serde_json::from_str(r#"{ "videoEmbeds": false }"#).unwrap();
        assert!(!opts.video_embeds);
        assert!(opts.accordions);
        assert!(opts.wrap_list_items);
    }

    #[test]
    fn variant_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Variant::Compact).unwrap(), "\"compact\"");
    }
}
