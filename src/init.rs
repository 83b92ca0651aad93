use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::CONFIG_FILE;

/// Scaffold a new content project at the given path.
///
/// Existing files are never overwritten.
pub fn init_project(path: Option<&str>, quiet: bool) -> Result<()> {
    let target = match path {
        Some(p) => PathBuf::from(p),
        None => std::env::current_dir().context("Failed to get current directory")?,
    };

    let project_name = target
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "projet-gaia".to_string());

    if !quiet {
        println!(
            "{} {} at {}",
            "Initializing".green().bold(),
            project_name,
            target.display()
        );
    }

    fs::create_dir_all(&target)
        .with_context(|| format!("Failed to create {}", target.display()))?;

    let files = [
        (CONFIG_FILE.to_string(), generate_gaia_json(&project_name)),
        ("content/roadmap/index.md".to_string(), generate_roadmap(&project_name)),
        ("content/calculations/example.md".to_string(), generate_calculation()),
        ("content/roadmap/sections.json".to_string(), generate_sections()),
    ];

    for (rel, content) in &files {
        write_new(&target, rel, content, quiet)?;
    }

    if !quiet {
        println!();
        println!("{}", "Done! Next steps:".bold());
        println!("  1. Edit content/roadmap/index.md");
        println!("  2. Run `gaia validate content/roadmap/index.md`");
        println!("  3. Run `gaia build` to render pages into public/");
    }

    Ok(())
}

fn write_new(root: &Path, rel: &str, content: &str, quiet: bool) -> Result<()> {
    let path = root.join(rel);
    if path.exists() {
        if !quiet {
            println!("  {} {}", "Exists".dimmed(), rel);
        }
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    if !quiet {
        println!("  {} {}", "Created".green(), rel);
    }
    Ok(())
}

fn generate_gaia_json(name: &str) -> String {
    let title = serde_json::Value::String(name.to_string());
    format!(
        r#"{{
  "contentDir": "content",
  "outDir": "public",
  "defaultVariant": "full",
  "variants": {{
    "calculations": "compact"
  }},
  "wrapListItems": true,
  "title": {title},
  "lang": "fr"
}}
"#
    )
}

fn generate_roadmap(name: &str) -> String {
    format!(
        r#"---
title: {name} roadmap
---
# {name}

## Milestones

- [x] Project scaffolded
- [ ] First prototype

> **INFO**: Edit this file, then run `gaia build`.

<details><summary>About</summary>
Accordions are written as raw details blocks.
</details>
"#
    )
}

fn generate_calculation() -> String {
    r#"---
title: Example calculation
---
## Power

Electrical power is $P = U I$.

$$
E = P t
$$

> **SUCCESS**: Units check out.
"#
    .to_string()
}

fn generate_sections() -> String {
    r#"[
  { "type": "text", "title": "Overview", "content": "Structured sections live next to free text." },
  { "type": "checklist", "title": "Launch", "items": [{ "text": "Write content", "checked": true }, { "text": "Publish", "checked": false }] }
]
"#
    .to_string()
}
