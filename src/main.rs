use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use gaia_markdown::{
    Diagnostic, PageConfig, Section, Severity, Variant, render_sections, render_with,
    split_front_matter, to_html_page, to_plain_text, to_terminal, validate,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

mod build;
mod config;
mod export;
mod init;
mod replay;

#[derive(Parser)]
#[command(name = "gaia", version, about = "Render, validate and publish Projet Gaia content")]
struct Cli {
    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Show detailed output and debug logs
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum RenderFormat {
    Terminal,
    Html,
    Page,
    Plain,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a content file (.md or .json sections)
    Render {
        /// Path to the .md or .json file
        file: String,

        /// Output format
        #[arg(long, value_enum, default_value = "terminal")]
        format: RenderFormat,

        /// Renderer preset (full or compact); overrides front matter
        #[arg(long)]
        variant: Option<Variant>,
    },

    /// Validate content file(s)
    Validate {
        /// Path to the .md or .json file(s)
        files: Vec<String>,
    },

    /// Export a content file as plain text
    Export {
        /// Path to the .md or .json file
        file: String,

        /// Write to this file instead of stdout
        #[arg(long)]
        out: Option<String>,
    },

    /// Render every content file into standalone HTML pages
    Build {
        /// Content directory (default: contentDir from gaia.json)
        #[arg(long)]
        content: Option<String>,

        /// Output directory (default: outDir from gaia.json)
        #[arg(long)]
        out: Option<String>,

        /// Rebuild when content changes
        #[arg(long)]
        watch: bool,

        /// Show what would change without writing
        #[arg(long)]
        dry_run: bool,
    },

    /// Scaffold a new content project
    Init {
        /// Directory to initialize (default: current directory)
        path: Option<String>,
    },

    /// Replay a captured assistant stream (SSE transcript)
    Replay {
        /// Path to the captured stream
        file: String,

        /// Model name recorded in the request
        #[arg(long, default_value = "gaia-chat")]
        model: String,

        /// Print chunks as they arrive instead of the rendered reply
        #[arg(long)]
        raw: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Render {
            file,
            format,
            variant,
        } => {
            handle_render(&file, format, variant)?;
        }
        Commands::Validate { files } => {
            handle_validate(&files)?;
        }
        Commands::Export { file, out } => {
            export::handle_export(&file, out.as_deref(), cli.quiet)?;
        }
        Commands::Build {
            content,
            out,
            watch,
            dry_run,
        } => {
            let config = config::load_config(Path::new("."))?;
            let opts = build::BuildOpts {
                content_dir: PathBuf::from(content.unwrap_or_else(|| config.content_dir.clone())),
                out_dir: PathBuf::from(out.unwrap_or_else(|| config.out_dir.clone())),
                dry_run,
                verbose: cli.verbose,
                quiet: cli.quiet,
            };
            let report = build::build_site(&config, &opts)?;
            if !cli.quiet {
                report.print_summary();
            }
            if watch {
                build::watch_and_rebuild(&config, &opts)?;
            }
        }
        Commands::Init { path } => {
            init::init_project(path.as_deref(), cli.quiet)?;
        }
        Commands::Replay { file, model, raw } => {
            replay::handle_replay(&file, &model, raw, cli.quiet)?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool, quiet: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else if quiet {
        EnvFilter::new("error")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// A content file as loaded from disk.
enum Content {
    Markdown {
        raw: String,
        /// Byte offset of the body after front matter.
        body_start: usize,
        variant: Option<Variant>,
        title: Option<String>,
        description: Option<String>,
    },
    Sections(Vec<Section>),
}

impl Content {
    fn load(file: &str) -> Result<Self> {
        let raw = std::fs::read_to_string(file)
            .map_err(|e| anyhow::anyhow!("Failed to read '{}': {}", file, e))?;

        if Path::new(file).extension().and_then(|e| e.to_str()) == Some("json") {
            let sections = serde_json::from_str(&raw)
                .with_context(|| format!("Failed to parse sections in '{}'", file))?;
            return Ok(Content::Sections(sections));
        }

        let (front_matter, body) = split_front_matter(&raw);
        let body_start = raw.len() - body.len();
        let front_matter = front_matter.unwrap_or_default();
        Ok(Content::Markdown {
            body_start,
            variant: front_matter.variant,
            title: front_matter.title,
            description: front_matter.description,
            raw,
        })
    }

    /// Diagnostics paired with a `file:line` location.
    fn diagnostics(&self, file: &str) -> Vec<(String, Diagnostic)> {
        match self {
            Content::Markdown {
                raw, body_start, ..
            } => {
                let line_offset = raw[..*body_start].matches('\n').count();
                validate(&raw[*body_start..])
                    .into_iter()
                    .map(|diag| {
                        let line_info = match diag.span {
                            Some(span) => format!("{}:{}", file, span.start_line + line_offset),
                            None => file.to_string(),
                        };
                        (line_info, diag)
                    })
                    .collect()
            }
            Content::Sections(sections) => sections
                .iter()
                .enumerate()
                .flat_map(|(idx, section)| {
                    validate(&section.to_markdown())
                        .into_iter()
                        .map(move |diag| (format!("{}#{}", file, idx), diag))
                })
                .collect(),
        }
    }
}

fn handle_render(file: &str, format: RenderFormat, variant: Option<Variant>) -> Result<()> {
    let config = config::load_config(Path::new("."))?;
    let content = Content::load(file)?;

    // Print diagnostics to stderr
    for (line_info, diag) in content.diagnostics(file) {
        if diag.severity != Severity::Info {
            eprintln!("{}: {}", line_info, diag.message);
        }
    }

    let mut page_config = PageConfig {
        title: config.title.clone(),
        lang: config.lang.clone(),
        source_path: Path::new(file)
            .file_name()
            .map(|n| n.to_string_lossy().to_string()),
        ..Default::default()
    };

    let output = match &content {
        Content::Markdown {
            raw,
            body_start,
            variant: fm_variant,
            title,
            description,
        } => {
            let body = &raw[*body_start..];
            let variant = variant.or(*fm_variant).unwrap_or(config.default_variant);
            if title.is_some() {
                page_config.title = title.clone();
            }
            page_config.description = description.clone();
            match format {
                RenderFormat::Terminal => to_terminal(body),
                RenderFormat::Html => render_with(body, &config.render_options(variant)),
                RenderFormat::Page => to_html_page(
                    &render_with(body, &config.render_options(variant)),
                    &page_config,
                ),
                RenderFormat::Plain => to_plain_text(body),
            }
        }
        Content::Sections(sections) => {
            let variant = variant.unwrap_or(config.default_variant);
            let options = config.render_options(variant);
            match format {
                RenderFormat::Terminal => {
                    let markdown: Vec<String> =
                        sections.iter().map(Section::to_markdown).collect();
                    to_terminal(&markdown.join("\n\n"))
                }
                RenderFormat::Html => render_sections(sections, &options),
                RenderFormat::Page => {
                    to_html_page(&render_sections(sections, &options), &page_config)
                }
                RenderFormat::Plain => sections
                    .iter()
                    .map(Section::to_plain_text)
                    .filter(|text| !text.is_empty())
                    .collect::<Vec<_>>()
                    .join("\n\n"),
            }
        }
    };

    println!("{output}");
    Ok(())
}

fn handle_validate(files: &[String]) -> Result<()> {
    let mut has_errors = false;

    for file in files {
        let content = match Content::load(file) {
            Ok(content) => content,
            Err(e) => {
                has_errors = true;
                println!("{}: {}: {:#}", file, "error".red().bold(), e);
                continue;
            }
        };

        let diagnostics = content.diagnostics(file);

        if diagnostics.is_empty() {
            println!("{}: {}", file, "OK".green());
        } else {
            for (line_info, diag) in &diagnostics {
                let severity_str = match diag.severity {
                    Severity::Error => {
                        has_errors = true;
                        format!("{}", "error".red().bold())
                    }
                    Severity::Warning => {
                        format!("{}", "warning".yellow().bold())
                    }
                    Severity::Info => {
                        format!("{}", "info".cyan().bold())
                    }
                };

                let code_str = match &diag.code {
                    Some(c) => format!("[{}] ", c),
                    None => String::new(),
                };

                println!("{line_info}: {severity_str}: {code_str}{}", diag.message);
            }
        }
    }

    if has_errors {
        std::process::exit(1);
    }

    Ok(())
}
