//! ANSI terminal renderer.
//!
//! Produces colored terminal output using the `colored` crate, for previewing
//! GAIA markdown from the CLI. Line based: it does not run the HTML pipeline,
//! and math is shown as its TeX source.

use colored::Colorize;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::table::{TableBlock, find_tables};

static CALLOUT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^> \*\*(INFO|WARNING|SUCCESS)\*\*:[ \t]*(.*)$").expect("invalid callout regex")
});
static TASK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^- \[([ xX])\] (.+)$").expect("invalid task regex"));
static NUMBERED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)\. (.+)$").expect("invalid numbered regex"));
static BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.+?)\*\*").expect("invalid bold regex"));
static ITALIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*([^*\n]+?)\*").expect("invalid italic regex"));
static INLINE_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"`([^`\n]+)`").expect("invalid inline code regex"));
static LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]\n]+)\]\(([^)\s]+)\)").expect("invalid link regex"));

/// Render GAIA markdown as ANSI-colored terminal text.
pub fn to_terminal(content: &str) -> String {
    let normalised = content.replace("\r\n", "\n");
    let lines: Vec<&str> = normalised.lines().collect();
    let tables = find_tables(&lines);

    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    let mut in_fence = false;
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];

        if in_fence {
            if line.trim_start().starts_with("```") {
                out.push(code_border(None));
                in_fence = false;
            } else {
                out.push(format!("  {}", line.dimmed()));
            }
            i += 1;
            continue;
        }
        if let Some(rest) = line.trim_start().strip_prefix("```") {
            let lang = rest.trim();
            out.push(code_border(Some(lang).filter(|l| !l.is_empty())));
            in_fence = true;
            i += 1;
            continue;
        }
        if let Some(table) = tables.iter().find(|t| t.start == i) {
            out.push(render_table(table));
            i = table.end;
            continue;
        }

        out.push(render_line(line));
        i += 1;
    }

    out.join("\n")
}

fn render_line(line: &str) -> String {
    if let Some(text) = line.strip_prefix("### ") {
        return format!("{}", inline(text).bold());
    }
    if let Some(text) = line.strip_prefix("## ") {
        return format!("{}", inline(text).bold().underline());
    }
    if let Some(text) = line.strip_prefix("# ") {
        return format!("{}", inline(text).to_uppercase().bold().underline());
    }
    if let Some(caps) = CALLOUT.captures(line) {
        let (color, label) = callout_style(&caps[1]);
        let bar = apply_color("\u{2503}", color); // ┃
        return format!("{bar} {} {}", label.bold(), inline(&caps[2]));
    }
    if let Some(text) = line.strip_prefix("> ") {
        return format!("{} {}", "\u{2502}".dimmed(), inline(text).italic()); // │
    }
    if line == "---" {
        return format!("{}", "\u{2500}".repeat(40).dimmed());
    }
    if let Some(caps) = TASK.captures(line) {
        let text = inline(&caps[2]);
        return if &caps[1] == " " {
            format!("\u{2610} {text}") // ☐
        } else {
            format!("{} {}", "\u{2713}".green(), text.strikethrough().green()) // ✓
        };
    }
    if let Some(text) = line.strip_prefix("- ") {
        return format!("  \u{2022} {}", inline(text));
    }
    if let Some(caps) = NUMBERED.captures(line) {
        return format!("  {}. {}", &caps[1], inline(&caps[2]));
    }
    inline(line)
}

fn inline(text: &str) -> String {
    let text = INLINE_CODE.replace_all(text, |c: &Captures| c[1].cyan().to_string());
    let text = LINK.replace_all(&text, |c: &Captures| {
        format!("{} ({})", c[1].underline(), c[2].dimmed())
    });
    let text = BOLD.replace_all(&text, |c: &Captures| c[1].bold().to_string());
    ITALIC
        .replace_all(&text, |c: &Captures| c[1].italic().to_string())
        .into_owned()
}

fn render_table(table: &TableBlock) -> String {
    let mut widths: Vec<usize> = table.headers.iter().map(|h| h.chars().count()).collect();
    for row in &table.rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }
    }

    let separator: String = widths
        .iter()
        .map(|&w| "\u{2500}".repeat(w + 2)) // ─
        .collect::<Vec<_>>()
        .join("\u{253C}"); // ┼

    let format_row = |cells: &[String]| -> String {
        let cells: Vec<String> = widths
            .iter()
            .enumerate()
            .map(|(i, &w)| format!(" {:w$} ", cells.get(i).map_or("", String::as_str)))
            .collect();
        format!("\u{2502}{}\u{2502}", cells.join("\u{2502}"))
    };

    let mut lines = vec![
        format!("{}", format_row(&table.headers).bold()),
        format!("\u{2502}{separator}\u{2502}"),
    ];
    for row in &table.rows {
        lines.push(format_row(row));
    }
    lines.join("\n")
}

fn code_border(lang: Option<&str>) -> String {
    let border = format!("{}", "\u{2500}\u{2500}\u{2500}".dimmed()); // ───
    match lang {
        Some(l) => format!("{border} {}", l.dimmed()),
        None => border,
    }
}

fn callout_style(label: &str) -> (&'static str, &'static str) {
    match label {
        "WARNING" => ("yellow", "Warning"),
        "SUCCESS" => ("green", "Success"),
        _ => ("blue", "Info"),
    }
}

fn apply_color(text: &str, color: &str) -> String {
    match color {
        "yellow" => format!("{}", text.yellow()),
        "green" => format!("{}", text.green()),
        "blue" => format!("{}", text.blue()),
        _ => text.to_string(),
    }
}
