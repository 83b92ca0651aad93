//! YAML front matter on content files.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::options::Variant;

/// Metadata block at the top of a content file, fenced by `---` lines.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrontMatter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Overrides the variant configured for the file's directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<Variant>,

    /// Any front matter fields not covered by typed fields above.
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

/// Split `content` into its front matter and the remaining body.
///
/// Content without a leading `---` line, without a closing `---`, or whose
/// block is not valid YAML is returned whole as body.
pub fn split_front_matter(content: &str) -> (Option<FrontMatter>, &str) {
    let mut lines = content.split_inclusive('\n');
    match lines.next() {
        Some(first) if first.trim_end() == "---" => {}
        _ => return (None, content),
    }

    let yaml_start = content.find('\n').map_or(content.len(), |i| i + 1);
    let mut offset = yaml_start;
    for line in lines {
        let line_end = offset + line.len();
        if line.trim_end() == "---" {
            let yaml = &content[yaml_start..offset];
            let body = &content[line_end..];
            return match parse_yaml(yaml) {
                Some(fm) => (Some(fm), body),
                None => (None, content),
            };
        }
        offset = line_end;
    }

    tracing::debug!("front matter opened with `---` but never closed");
    (None, content)
}

fn parse_yaml(yaml: &str) -> Option<FrontMatter> {
    if yaml.trim().is_empty() {
        return Some(FrontMatter::default());
    }
    match serde_yaml::from_str::<FrontMatter>(yaml) {
        Ok(fm) => Some(fm),
        Err(err) => {
            tracing::debug!(%err, "ignoring front matter that is not valid YAML");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn splits_title_and_body() {
        let (fm, body) = split_front_matter("---\ntitle: Roadmap\nvariant: compact\nowner: ops\n---\n# Body\n");
        let fm = fm.unwrap();
        assert_eq!(fm.title.as_deref(), Some("Roadmap"));
        assert_eq!(fm.variant, Some(Variant::Compact));
        assert_eq!(
            fm.extra.get("owner"),
            Some(&serde_yaml::Value::String("ops".into()))
        );
        assert_eq!(body, "# Body\n");
    }

    #[test]
    fn crlf_front_matter() {
        let (fm, body) = split_front_matter("---\r\ntitle: X\r\n---\r\nbody");
        assert_eq!(fm.unwrap().title.as_deref(), Some("X"));
        assert_eq!(body, "body");
    }

    #[test]
    fn no_front_matter() {
        let input = "# Title\n---\nmore";
        assert_eq!(split_front_matter(input), (None, input));
    }

    #[test]
    fn unclosed_or_invalid_is_body() {
        let unclosed = "---\ntitle: X\nbody";
        assert_eq!(split_front_matter(unclosed), (None, unclosed));
        let invalid = "---\ntitle: [unterminated\n---\nbody";
        assert_eq!(split_front_matter(invalid), (None, invalid));
    }

    #[test]
    fn empty_block() {
        let (fm, body) = split_front_matter("---\n---\ntext");
        assert_eq!(fm, Some(FrontMatter::default()));
        assert_eq!(body, "text");
    }
}
