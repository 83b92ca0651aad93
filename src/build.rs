//! `gaia build` — render every content file into a standalone HTML page.
//!
//! `.md` files go through the markdown pipeline (front matter may override
//! the title and variant); `.json` files hold typed section arrays. Output
//! mirrors the content tree with an `.html` extension. Pages whose bytes
//! did not change are left untouched.

use anyhow::{Context, Result};
use colored::Colorize;
use gaia_markdown::{
    PageConfig, Section, Severity, Variant, render_sections, render_with, split_front_matter,
    to_html_page, validate,
};
use notify::{EventKind, RecursiveMode, Watcher};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::{Duration, Instant};
use walkdir::WalkDir;

use crate::config::GaiaConfig;

/// Options for a site build.
pub struct BuildOpts {
    pub content_dir: PathBuf,
    pub out_dir: PathBuf,
    pub dry_run: bool,
    pub verbose: bool,
    pub quiet: bool,
}

/// Outcome of a site build.
#[derive(Debug, Default)]
pub struct BuildReport {
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub warnings: Vec<String>,
}

impl BuildReport {
    pub fn print_summary(&self) {
        println!();
        println!("{}", "========================================".dimmed());
        println!("{}", "Build complete!".green().bold());
        println!();

        let mut parts = Vec::new();
        if self.created > 0 {
            parts.push(format!("{} created", self.created));
        }
        if self.updated > 0 {
            parts.push(format!("{} updated", self.updated));
        }
        if self.unchanged > 0 {
            parts.push(format!("{} unchanged", self.unchanged));
        }

        if parts.is_empty() {
            println!("Pages: {}", "none".dimmed());
        } else {
            println!("Pages: {}", parts.join(", "));
        }

        for w in &self.warnings {
            println!("{} {}", "WARNING:".yellow(), w);
        }
    }
}

enum FileStatus {
    Created,
    Updated,
    Unchanged,
}

/// A rendered page ready to be written.
struct RenderedPage {
    html: String,
    variant: Variant,
}

/// Build every content file under `opts.content_dir`.
pub fn build_site(config: &GaiaConfig, opts: &BuildOpts) -> Result<BuildReport> {
    if !opts.content_dir.is_dir() {
        anyhow::bail!(
            "Content directory '{}' does not exist",
            opts.content_dir.display()
        );
    }

    if !opts.quiet {
        println!(
            "{} {} {}",
            "Gaia Build".bold(),
            format!("v{}", env!("CARGO_PKG_VERSION")).dimmed(),
            format!("— {} → {}", opts.content_dir.display(), opts.out_dir.display()).dimmed()
        );
        println!("{}", "================================".dimmed());
        if opts.dry_run {
            println!("{}", "[DRY RUN] No files will be written.".yellow());
        }
    }

    let mut report = BuildReport::default();

    for source in list_sources(&opts.content_dir)? {
        let rel_path = source
            .strip_prefix(&opts.content_dir)
            .with_context(|| format!("{} is outside the content directory", source.display()))?;
        let rel_display = display_path(rel_path);

        let page = render_source(&source, rel_path, config, &mut report)?;
        let dest = opts.out_dir.join(rel_path).with_extension("html");

        match write_output(&dest, &page.html, opts.dry_run)? {
            FileStatus::Created => {
                report.created += 1;
                if !opts.quiet {
                    println!(
                        "  {} {} {}",
                        "+".green(),
                        rel_display,
                        format!("({})", page.variant.as_str()).dimmed()
                    );
                }
            }
            FileStatus::Updated => {
                report.updated += 1;
                if !opts.quiet {
                    println!(
                        "  {} {} {}",
                        "~".yellow(),
                        rel_display,
                        format!("({})", page.variant.as_str()).dimmed()
                    );
                }
            }
            FileStatus::Unchanged => {
                report.unchanged += 1;
                if opts.verbose && !opts.quiet {
                    println!("  {} {}", "-".dimmed(), rel_display);
                }
            }
        }
    }

    tracing::debug!(
        created = report.created,
        updated = report.updated,
        unchanged = report.unchanged,
        "build finished"
    );
    Ok(report)
}

/// All `.md` and `.json` files under `dir`, in a stable order.
fn list_sources(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to walk {}", dir.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        match path.extension().and_then(|e| e.to_str()) {
            Some("md") | Some("json") => files.push(path.to_path_buf()),
            _ => tracing::debug!(path = %path.display(), "skipping non-content file"),
        }
    }
    Ok(files)
}

fn render_source(
    source: &Path,
    rel_path: &Path,
    config: &GaiaConfig,
    report: &mut BuildReport,
) -> Result<RenderedPage> {
    let raw = fs::read_to_string(source)
        .with_context(|| format!("Failed to read {}", source.display()))?;
    let rel_display = display_path(rel_path);

    let mut page_config = PageConfig {
        title: config.title.clone(),
        lang: config.lang.clone(),
        source_path: Some(rel_display.clone()),
        ..Default::default()
    };

    let is_sections = rel_path.extension().and_then(|e| e.to_str()) == Some("json");
    let (body_html, variant) = if is_sections {
        let sections: Vec<Section> = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse sections in {}", source.display()))?;
        let variant = config.variant_for(rel_path);
        (
            render_sections(&sections, &config.render_options(variant)),
            variant,
        )
    } else {
        let (front_matter, body) = split_front_matter(&raw);
        let line_offset = raw[..raw.len() - body.len()].matches('\n').count();

        for diag in validate(body) {
            if diag.severity == Severity::Info {
                continue;
            }
            let line = diag.span.map_or(0, |s| s.start_line + line_offset);
            report
                .warnings
                .push(format!("{rel_display}:{line}: {}", diag.message));
        }

        let mut variant = config.variant_for(rel_path);
        if let Some(fm) = front_matter {
            if let Some(v) = fm.variant {
                variant = v;
            }
            if fm.title.is_some() {
                page_config.title = fm.title;
            }
            page_config.description = fm.description;
        }
        (render_with(body, &config.render_options(variant)), variant)
    };

    Ok(RenderedPage {
        html: to_html_page(&body_html, &page_config),
        variant,
    })
}

/// Write `html` to `dest` unless the file already holds the same bytes.
fn write_output(dest: &Path, html: &str, dry_run: bool) -> Result<FileStatus> {
    let status = if !dest.exists() {
        FileStatus::Created
    } else if file_hash(dest)? == content_hash(html.as_bytes()) {
        return Ok(FileStatus::Unchanged);
    } else {
        FileStatus::Updated
    };

    if !dry_run {
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(dest, html).with_context(|| format!("Failed to write {}", dest.display()))?;
    }

    Ok(status)
}

fn file_hash(path: &Path) -> Result<String> {
    let content = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(content_hash(&content))
}

fn content_hash(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("{:x}", hasher.finalize())
}

/// Forward-slash form of a relative path, stable across platforms.
fn display_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn is_content_event(event: &notify::Event) -> bool {
    matches!(
        event.kind,
        EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
    ) && event.paths.iter().any(|p| {
        matches!(
            p.extension().and_then(|e| e.to_str()),
            Some("md") | Some("json")
        )
    })
}

/// Watch the content directory and rebuild on each save.
///
/// Debounces rapid events (e.g. editors that write in stages) with a 200ms window.
/// Ctrl+C exits cleanly.
pub fn watch_and_rebuild(config: &GaiaConfig, opts: &BuildOpts) -> Result<()> {
    let watch_dir = fs::canonicalize(&opts.content_dir).with_context(|| {
        format!("Cannot resolve path '{}'", opts.content_dir.display())
    })?;

    println!(
        "{} {} for changes (Ctrl+C to stop)",
        "Watching".cyan().bold(),
        opts.content_dir.display()
    );

    let (tx, rx) = mpsc::channel();
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
        if let Ok(event) = res {
            let _ = tx.send(event);
        }
    })?;

    watcher.watch(&watch_dir, RecursiveMode::Recursive)?;

    let mut last_rebuild = Instant::now();
    let debounce = Duration::from_millis(200);

    loop {
        match rx.recv_timeout(Duration::from_secs(1)) {
            Ok(event) => {
                if is_content_event(&event) && last_rebuild.elapsed() > debounce {
                    // Let the editor finish writing
                    std::thread::sleep(Duration::from_millis(50));

                    match build_site(config, opts) {
                        Ok(report) => {
                            last_rebuild = Instant::now();
                            if !opts.quiet {
                                report.print_summary();
                            }
                        }
                        Err(e) => {
                            eprintln!("{} {:#}", "Build error:".red().bold(), e);
                        }
                    }
                }
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                break;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join("gaia-build-unit").join(name);
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn opts(root: &Path) -> BuildOpts {
        BuildOpts {
            content_dir: root.join("content"),
            out_dir: root.join("public"),
            dry_run: false,
            verbose: false,
            quiet: true,
        }
    }

    #[test]
    fn test_content_hash_is_hex_sha256() {
        assert_eq!(
            content_hash(b"gaia"),
            format!("{:x}", Sha256::digest(b"gaia"))
        );
        assert_eq!(content_hash(b"").len(), 64);
    }

    #[test]
    fn test_display_path_uses_forward_slashes() {
        let path: PathBuf = ["roadmap", "index.md"].iter().collect();
        assert_eq!(display_path(&path), "roadmap/index.md");
    }

    #[test]
    fn test_build_then_rebuild_reports_unchanged() {
        let root = temp_dir("rebuild");
        fs::create_dir_all(root.join("content/notes")).unwrap();
        fs::write(root.join("content/notes/a.md"), "## A\n\n- [ ] todo").unwrap();
        fs::write(root.join("content/notes/skip.txt"), "ignored").unwrap();

        let config = GaiaConfig::default();
        let first = build_site(&config, &opts(&root)).unwrap();
        assert_eq!((first.created, first.updated, first.unchanged), (1, 0, 0));
        assert!(root.join("public/notes/a.html").exists());
        assert!(!root.join("public/notes/skip.html").exists());

        let second = build_site(&config, &opts(&root)).unwrap();
        assert_eq!((second.created, second.updated, second.unchanged), (0, 0, 1));

        fs::write(root.join("content/notes/a.md"), "## B").unwrap();
        let third = build_site(&config, &opts(&root)).unwrap();
        assert_eq!(third.updated, 1);

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let root = temp_dir("dry-run");
        fs::create_dir_all(root.join("content")).unwrap();
        fs::write(root.join("content/a.md"), "text").unwrap();

        let mut build_opts = opts(&root);
        build_opts.dry_run = true;
        let report = build_site(&GaiaConfig::default(), &build_opts).unwrap();
        assert_eq!(report.created, 1);
        assert!(!root.join("public").exists());

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn test_front_matter_overrides_variant_and_title() {
        let root = temp_dir("front-matter");
        fs::create_dir_all(root.join("content")).unwrap();
        fs::write(
            root.join("content/a.md"),
            "---\ntitle: Calcul\nvariant: compact\n---\nhttps://youtu.be/dQw4w9WgXcQ",
        )
        .unwrap();

        build_site(&GaiaConfig::default(), &opts(&root)).unwrap();
        let html = fs::read_to_string(root.join("public/a.html")).unwrap();
        assert!(html.contains("<title>Calcul</title>"));
        assert!(!html.contains("<iframe"));
        assert!(html.contains("<!-- Built with gaia from a.md -->"));

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn test_warnings_carry_file_line() {
        let root = temp_dir("warnings");
        fs::create_dir_all(root.join("content")).unwrap();
        fs::write(root.join("content/a.md"), "---\ntitle: X\n---\nok\n[x](javascript:alert(1))").unwrap();

        let report = build_site(&GaiaConfig::default(), &opts(&root)).unwrap();
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].starts_with("a.md:5: "));

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn test_invalid_sections_fail_with_context() {
        let root = temp_dir("bad-json");
        fs::create_dir_all(root.join("content")).unwrap();
        fs::write(root.join("content/s.json"), r#"[{"type": "carousel"}]"#).unwrap();

        let err = build_site(&GaiaConfig::default(), &opts(&root)).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse sections"));

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn test_missing_content_dir_is_an_error() {
        let root = temp_dir("missing");
        assert!(build_site(&GaiaConfig::default(), &opts(&root)).is_err());
    }
}
