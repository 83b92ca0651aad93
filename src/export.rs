//! `gaia export` — plain-text reduction of a content file for PDF pagination.

use anyhow::{Context, Result};
use colored::Colorize;
use gaia_markdown::{Section, split_front_matter, to_plain_text};
use std::fs;
use std::path::Path;

/// Plain text for a `.md` file (front matter dropped) or a `.json` section array.
pub fn export_plain_text(file: &Path) -> Result<String> {
    let raw = fs::read_to_string(file)
        .with_context(|| format!("Failed to read '{}'", file.display()))?;

    if file.extension().and_then(|e| e.to_str()) == Some("json") {
        let sections: Vec<Section> = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse sections in '{}'", file.display()))?;
        Ok(sections
            .iter()
            .map(Section::to_plain_text)
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n"))
    } else {
        let (_, body) = split_front_matter(&raw);
        Ok(to_plain_text(body))
    }
}

pub fn handle_export(file: &str, out: Option<&str>, quiet: bool) -> Result<()> {
    let text = export_plain_text(Path::new(file))?;

    match out {
        Some(out) => {
            let out_path = Path::new(out);
            if let Some(parent) = out_path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create '{}'", parent.display()))?;
            }
            fs::write(out_path, format!("{text}\n"))
                .with_context(|| format!("Failed to write '{}'", out_path.display()))?;
            if !quiet {
                println!("{} {} → {}", "Exported".green().bold(), file, out_path.display());
            }
        }
        None => println!("{text}"),
    }

    Ok(())
}
