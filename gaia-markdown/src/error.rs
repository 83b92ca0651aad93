use serde::{Deserialize, Serialize};

/// Errors reported by a math engine for a single TeX expression.
///
/// These never escape [`crate::render`]: the pipeline turns them into a
/// visible error span containing the offending source.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MathError {
    #[error("Unbalanced braces in math expression")]
    UnbalancedBraces,

    #[error("Unmatched environment '{name}'")]
    UnmatchedEnvironment { name: String },

    #[error("Empty math expression")]
    Empty,

    #[error("Math engine failed: {message}")]
    Engine { message: String },
}

/// Errors raised while consuming a chat completion stream.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error("Transport failed: {message}")]
    Transport { message: String },

    #[error("Failed to read stream: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode request: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A diagnostic message produced by content validation.
///
/// Diagnostics are non-fatal: rendering never depends on them. They exist so
/// authors get actionable feedback before publishing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// Line range of a construct in the original content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    /// 1-based starting line number.
    pub start_line: usize,
    /// 1-based ending line number (inclusive).
    pub end_line: usize,
}

impl Span {
    pub fn line(line: usize) -> Self {
        Self {
            start_line: line,
            end_line: line,
        }
    }
}
