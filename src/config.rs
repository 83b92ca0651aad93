use anyhow::{Context, Result};
use gaia_markdown::{RenderOptions, Variant};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

pub const CONFIG_FILE: &str = "gaia.json";

/// Top-level gaia.json schema.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GaiaConfig {
    #[serde(default = "default_content_dir")]
    pub content_dir: String,

    #[serde(default = "default_out_dir")]
    pub out_dir: String,

    #[serde(default)]
    pub default_variant: Variant,

    /// Content directory (relative to `contentDir`) → variant.
    #[serde(default)]
    pub variants: HashMap<String, Variant>,

    #[serde(default = "default_wrap_list_items")]
    pub wrap_list_items: bool,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub lang: Option<String>,
}

impl Default for GaiaConfig {
    fn default() -> Self {
        Self {
            content_dir: default_content_dir(),
            out_dir: default_out_dir(),
            default_variant: Variant::default(),
            variants: HashMap::new(),
            wrap_list_items: default_wrap_list_items(),
            title: None,
            lang: None,
        }
    }
}

fn default_content_dir() -> String {
    "content".to_string()
}
fn default_out_dir() -> String {
    "public".to_string()
}
fn default_wrap_list_items() -> bool {
    true
}

impl GaiaConfig {
    /// Variant for a file at `rel_path` under the content directory.
    ///
    /// The deepest configured directory containing the file wins.
    pub fn variant_for(&self, rel_path: &Path) -> Variant {
        let mut best: Option<(usize, Variant)> = None;
        for (dir, variant) in &self.variants {
            let dir_path = Path::new(dir.trim_matches('/'));
            let depth = dir_path.components().count();
            if depth > 0
                && rel_path.starts_with(dir_path)
                && best.is_none_or(|(d, _)| depth > d)
            {
                best = Some((depth, *variant));
            }
        }
        best.map_or(self.default_variant, |(_, v)| v)
    }

    pub fn render_options(&self, variant: Variant) -> RenderOptions {
        variant.options().with_wrap_list_items(self.wrap_list_items)
    }
}

/// Load config from a gaia.json file, or return defaults if missing.
pub fn load_config(project_root: &Path) -> Result<GaiaConfig> {
    let config_path = project_root.join(CONFIG_FILE);

    if config_path.exists() {
        let raw = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;
        let config: GaiaConfig = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;
        Ok(config)
    } else {
        tracing::debug!(path = %config_path.display(), "no config file, using defaults");
        Ok(GaiaConfig::default())
    }
}
