//! Pipe tables.
//!
//! A table is a header row, a separator row made only of dashes, colons,
//! pipes and spaces, then one or more body rows. Every line must contain a
//! `|`. Anything that does not fit that shape is left alone.

/// Split a pipe-delimited row into trimmed cells.
///
/// Leading and trailing pipes are optional.
pub fn split_row(line: &str) -> Vec<String> {
    let trimmed = line.trim();
    let trimmed = trimmed.strip_prefix('|').unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix('|').unwrap_or(trimmed);
    trimmed.split('|').map(|cell| cell.trim().to_string()).collect()
}

/// `---|---`, `| :-- | --: |` and friends.
pub fn is_separator_row(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.contains('|')
        && trimmed.contains('-')
        && trimmed
            .chars()
            .all(|c| matches!(c, '-' | ':' | '|' | ' ' | '\t'))
}

fn is_row(line: &str) -> bool {
    line.contains('|') && !line.trim().is_empty()
}

/// A table located in a list of lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableBlock {
    /// 0-based index of the header line.
    pub start: usize,
    /// 0-based index one past the last body line.
    pub end: usize,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Find every table in `lines`, in order, non-overlapping.
pub fn find_tables(lines: &[&str]) -> Vec<TableBlock> {
    let mut tables = Vec::new();
    let mut i = 0;

    while i + 2 < lines.len() {
        if is_row(lines[i]) && !is_separator_row(lines[i]) && is_separator_row(lines[i + 1]) {
            let mut end = i + 2;
            while end < lines.len() && is_row(lines[end]) && !is_separator_row(lines[end]) {
                end += 1;
            }
            if end > i + 2 {
                tables.push(TableBlock {
                    start: i,
                    end,
                    headers: split_row(lines[i]),
                    rows: lines[i + 2..end].iter().map(|l| split_row(l)).collect(),
                });
                i = end;
                continue;
            }
        }
        i += 1;
    }

    tables
}

impl TableBlock {
    pub fn to_html(&self) -> String {
        let width = self.headers.len();
        let mut html = String::from("<table class=\"gaia-table\"><thead><tr>");
        for header in &self.headers {
            html.push_str(&format!("<th class=\"gaia-th\">{header}</th>"));
        }
        html.push_str("</tr></thead><tbody>");
        for row in &self.rows {
            html.push_str("<tr class=\"gaia-tr\">");
            for idx in 0..width.max(row.len()) {
                let cell = row.get(idx).map_or("", String::as_str);
                html.push_str(&format!("<td class=\"gaia-td\">{cell}</td>"));
            }
            html.push_str("</tr>");
        }
        html.push_str("</tbody></table>");
        html
    }
}

/// Pipeline step 14: replace each table block with one line of HTML.
pub(crate) fn render_tables(input: &str) -> String {
    let lines: Vec<&str> = input.split('\n').collect();
    let tables = find_tables(&lines);
    if tables.is_empty() {
        return input.to_string();
    }

    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    let mut cursor = 0;
    for table in &tables {
        out.extend(lines[cursor..table.start].iter().map(|l| l.to_string()));
        out.push(table.to_html());
        cursor = table.end;
    }
    out.extend(lines[cursor..].iter().map(|l| l.to_string()));
    out.join("\n")
}
