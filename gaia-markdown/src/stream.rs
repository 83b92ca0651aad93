//! Chat assistant stream decoding.
//!
//! The assistant replies over server-sent events in the OpenAI chat
//! completion shape. Each `data: ` line carries a JSON chunk whose
//! `choices[0].delta.content` is the next text fragment; `data: [DONE]`
//! terminates the stream. The reply is GAIA markdown and is meant to be fed
//! to [`crate::render`] once assembled.
//!
//! The HTTP side is not part of this crate: callers provide a
//! [`ChatTransport`] that turns a [`ChatRequest`] into a readable body.

use std::io::{ErrorKind, Read};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::StreamError;

const STREAM_DONE_MARKER: &str = "[DONE]";
const DATA_PREFIX: &str = "data: ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Request body sent to the completion endpoint. Always streaming.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
}

impl ChatRequest {
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            stream: true,
        }
    }

    pub fn to_json(&self) -> Result<String, StreamError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Something that can open a streaming completion body.
pub trait ChatTransport {
    fn open(&self, request: &ChatRequest) -> Result<Box<dyn Read + Send>, StreamError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    Delta(String),
    Done,
}

/// Incremental SSE decoder.
///
/// Bytes may arrive split anywhere, including inside a UTF-8 sequence; only
/// complete lines are decoded and the remainder is kept for the next push.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    done: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `[DONE]` has been seen. Later input is ignored.
    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn push(&mut self, bytes: &[u8]) -> Vec<StreamEvent> {
        if self.done {
            return Vec::new();
        }
        self.buffer.extend_from_slice(bytes);

        let mut events = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line[..line.len() - 1]);
            if let Some(event) = self.decode_line(line.trim_end_matches('\r')) {
                events.push(event);
                if self.done {
                    self.buffer.clear();
                    break;
                }
            }
        }
        events
    }

    /// Decode whatever is left once the body has ended without a newline.
    pub fn finish(&mut self) -> Vec<StreamEvent> {
        if self.done || self.buffer.is_empty() {
            return Vec::new();
        }
        let rest = std::mem::take(&mut self.buffer);
        let line = String::from_utf8_lossy(&rest);
        self.decode_line(line.trim_end_matches('\r'))
            .into_iter()
            .collect()
    }

    fn decode_line(&mut self, line: &str) -> Option<StreamEvent> {
        let data = line.strip_prefix(DATA_PREFIX)?.trim();
        if data.is_empty() {
            return None;
        }
        if data == STREAM_DONE_MARKER {
            self.done = true;
            return Some(StreamEvent::Done);
        }

        let parsed: Value = match serde_json::from_str(data) {
            Ok(value) => value,
            Err(err) => {
                tracing::debug!(%err, "skipping malformed stream chunk");
                return None;
            }
        };
        let content = parsed
            .get("choices")?
            .get(0)?
            .get("delta")
            .and_then(|delta| delta.get("content"))
            .and_then(Value::as_str)?;
        if content.is_empty() {
            return None;
        }
        Some(StreamEvent::Delta(content.to_string()))
    }
}

/// Stream a completion, calling `on_chunk` for every text fragment.
///
/// Returns the assembled reply once `[DONE]` arrives or the body ends.
pub fn stream_chat_completion<F>(
    transport: &dyn ChatTransport,
    model: &str,
    messages: &[ChatMessage],
    mut on_chunk: F,
) -> Result<String, StreamError>
where
    F: FnMut(&str),
{
    let request = ChatRequest::new(model, messages.to_vec());
    let mut body = transport.open(&request)?;
    let mut decoder = SseDecoder::new();
    let mut reply = String::new();
    let mut chunk = [0u8; 4096];

    let mut handle = |events: Vec<StreamEvent>, reply: &mut String| {
        for event in events {
            if let StreamEvent::Delta(text) = event {
                on_chunk(&text);
                reply.push_str(&text);
            }
        }
    };

    loop {
        let read = match body.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(err.into()),
        };
        handle(decoder.push(&chunk[..read]), &mut reply);
        if decoder.is_done() {
            break;
        }
    }
    handle(decoder.finish(), &mut reply);

    tracing::debug!(
        chars = reply.chars().count(),
        done = decoder.is_done(),
        "chat stream finished"
    );
    Ok(reply)
}
