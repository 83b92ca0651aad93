//! Typed content sections.
//!
//! The admin stores structured payloads next to free text. Each section is
//! lowered to GAIA markdown and then goes through the same pipeline as any
//! other content, so there is exactly one HTML code path.

use serde::{Deserialize, Serialize};

use crate::options::RenderOptions;
use crate::plain;
use crate::render::render_with;

/// A content section, discriminated by its `type` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Section {
    Text {
        #[serde(default)]
        title: String,
        #[serde(default)]
        content: String,
    },
    Accordion {
        #[serde(default)]
        title: String,
        #[serde(default)]
        content: String,
        #[serde(default)]
        items: Vec<AccordionItem>,
    },
    Table {
        #[serde(default)]
        title: String,
        #[serde(default)]
        content: String,
        #[serde(default)]
        headers: Vec<String>,
        #[serde(default)]
        rows: Vec<Vec<String>>,
    },
    Callout {
        #[serde(default)]
        title: String,
        #[serde(default)]
        content: String,
        #[serde(default)]
        items: Vec<CalloutItem>,
    },
    Checklist {
        #[serde(default)]
        title: String,
        #[serde(default)]
        content: String,
        #[serde(default)]
        items: Vec<ChecklistItem>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccordionItem {
    pub title: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalloutKind {
    #[default]
    Info,
    Warning,
    Success,
}

impl CalloutKind {
    /// The reserved label recognised by the pipeline.
    pub fn label(self) -> &'static str {
        match self {
            CalloutKind::Info => "INFO",
            CalloutKind::Warning => "WARNING",
            CalloutKind::Success => "SUCCESS",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalloutItem {
    #[serde(default)]
    pub kind: CalloutKind,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub text: String,
    #[serde(default)]
    pub checked: bool,
}

impl Section {
    pub fn title(&self) -> &str {
        match self {
            Section::Text { title, .. }
            | Section::Accordion { title, .. }
            | Section::Table { title, .. }
            | Section::Callout { title, .. }
            | Section::Checklist { title, .. } => title,
        }
    }

    pub fn content(&self) -> &str {
        match self {
            Section::Text { content, .. }
            | Section::Accordion { content, .. }
            | Section::Table { content, .. }
            | Section::Callout { content, .. }
            | Section::Checklist { content, .. } => content,
        }
    }

    /// Lower to GAIA markdown: title as `##`, free text, then the payload.
    pub fn to_markdown(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        let title = self.title().trim();
        if !title.is_empty() {
            parts.push(format!("## {}", single_line(title)));
        }
        let content = self.content().trim();
        if !content.is_empty() {
            parts.push(content.to_string());
        }

        match self {
            Section::Text { .. } => {}
            Section::Accordion { items, .. } => {
                for item in items {
                    parts.push(format!(
                        "<details><summary>{}</summary>\n{}\n</details>",
                        single_line(&item.title),
                        item.content.trim()
                    ));
                }
            }
            Section::Table { headers, rows, .. } => {
                if !headers.is_empty() && !rows.is_empty() {
                    let mut lines = vec![
                        table_row(headers),
                        format!("|{}|", vec!["---"; headers.len()].join("|")),
                    ];
                    lines.extend(rows.iter().map(|r| table_row(r)));
                    parts.push(lines.join("\n"));
                }
            }
            Section::Callout { items, .. } => {
                let lines: Vec<String> = items
                    .iter()
                    .map(|item| {
                        format!("> **{}**: {}", item.kind.label(), single_line(&item.content))
                    })
                    .collect();
                if !lines.is_empty() {
                    parts.push(lines.join("\n"));
                }
            }
            Section::Checklist { items, .. } => {
                let lines: Vec<String> = items
                    .iter()
                    .map(|item| {
                        let mark = if item.checked { "x" } else { " " };
                        format!("- [{mark}] {}", single_line(&item.text))
                    })
                    .collect();
                if !lines.is_empty() {
                    parts.push(lines.join("\n"));
                }
            }
        }

        parts.join("\n\n")
    }

    pub fn to_html(&self, options: &RenderOptions) -> String {
        render_with(&self.to_markdown(), options)
    }

    pub fn to_plain_text(&self) -> String {
        plain::to_plain_text(&self.to_markdown())
    }
}

/// Render a list of sections, skipping those that produce no output.
pub fn render_sections(sections: &[Section], options: &RenderOptions) -> String {
    sections
        .iter()
        .map(|s| s.to_html(options))
        .filter(|html| !html.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn table_row(cells: &[String]) -> String {
    let cells: Vec<String> = cells
        .iter()
        .map(|c| single_line(c).replace('|', "/"))
        .collect();
    format!("| {} |", cells.join(" | "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn deserializes_tagged_json() {
        let json = r#"[
            {"type": "text", "title": "Intro", "content": "Hello"},
            {"type": "checklist", "title": "Launch", "items": [{"text": "Wire harness", "checked": true}]},
            {"type": "callout", "items": [{"kind": "warning", "content": "Hot"}]}
        ]"#;
        let sections: Vec<Section> = serde_json::from_str(json).unwrap();
        assert_eq!(sections.len(), 3);
        assert_eq!(sections[0].title(), "Intro");
        assert_eq!(
            sections[1],
            Section::Checklist {
                title: "Launch".into(),
                content: String::new(),
                items: vec![ChecklistItem {
                    text: "Wire harness".into(),
                    checked: true
                }],
            }
        );
    }

    #[test]
    fn unknown_type_is_rejected() {
        let err = serde_json::from_str::<Section>(r#"{"type": "carousel"}"#);
        assert!(err.is_err());
    }

    #[test]
    fn checklist_markdown() {
        let section = Section::Checklist {
            title: "Launch".into(),
            content: String::new(),
            items: vec![
                ChecklistItem {
                    text: "Frame".into(),
                    checked: true,
                },
                ChecklistItem {
                    text: "Motors".into(),
                    checked: false,
                },
            ],
        };
        assert_eq!(section.to_markdown(), "## Launch\n\n- [x] Frame\n- [ ] Motors");
    }

    #[test]
    fn table_section_renders_table() {
        let section = Section::Table {
            title: String::new(),
            content: "Budget".into(),
            headers: vec!["Item".into(), "Cost".into()],
            rows: vec![vec!["Motor".into(), "40".into()], vec!["Frame | alu".into()]],
        };
        assert_eq!(
            section.to_markdown(),
            "Budget\n\n| Item | Cost |\n|---|---|\n| Motor | 40 |\n| Frame / alu |"
        );
        let html = section.to_html(&RenderOptions::full());
        assert_eq!(html.matches("<th class=\"gaia-th\">").count(), 2);
        assert_eq!(html.matches("<tr class=\"gaia-tr\">").count(), 2);
    }

    #[test]
    fn callout_and_accordion_render() {
        let callout = Section::Callout {
            title: String::new(),
            content: String::new(),
            items: vec![CalloutItem {
                kind: CalloutKind::Success,
                content: "Passed\nreview".into(),
            }],
        };
        assert_eq!(callout.to_markdown(), "> **SUCCESS**: Passed review");
        assert!(callout.to_html(&RenderOptions::full()).contains("gaia-callout-success"));

        let accordion = Section::Accordion {
            title: "FAQ".into(),
            content: String::new(),
            items: vec![AccordionItem {
                title: "Why?".into(),
                content: "Because.".into(),
            }],
        };
        let html = accordion.to_html(&RenderOptions::full());
        assert!(html.contains("gaia-accordion"));
        assert!(html.contains("Why?"));
    }

    #[test]
    fn render_sections_skips_empty() {
        let sections = vec![
            Section::Text {
                title: String::new(),
                content: "  ".into(),
            },
            Section::Text {
                title: "Only".into(),
                content: String::new(),
            },
        ];
        assert_eq!(
            render_sections(&sections, &RenderOptions::compact()),
            "<h2 class=\"gaia-h2\">Only</h2>"
        );
    }

    #[test]
    fn plain_text_of_section() {
        let section = Section::Text {
            title: "Plan".into(),
            content: "**Build** it".into(),
        };
        assert_eq!(section.to_plain_text(), "Plan\n\nBuild it");
    }
}
