//! `gaia replay` — play back a captured assistant stream.
//!
//! Captured SSE transcripts are fed through the same decoder the admin uses
//! against the live completion endpoint, then rendered for the terminal.

use anyhow::{Context, Result};
use colored::Colorize;
use gaia_markdown::stream::{ChatMessage, ChatRequest, ChatTransport, Role, stream_chat_completion};
use gaia_markdown::{StreamError, to_terminal};
use std::fs::File;
use std::io::{Read, Write};
use std::path::PathBuf;

/// Transport that serves a recorded response body from disk.
pub struct FileTransport {
    path: PathBuf,
}

impl FileTransport {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ChatTransport for FileTransport {
    fn open(&self, request: &ChatRequest) -> Result<Box<dyn Read + Send>, StreamError> {
        tracing::debug!(
            model = %request.model,
            messages = request.messages.len(),
            path = %self.path.display(),
            "replaying captured stream"
        );
        let file = File::open(&self.path).map_err(|e| StreamError::Transport {
            message: format!("cannot open '{}': {}", self.path.display(), e),
        })?;
        Ok(Box::new(file))
    }
}

/// Decode the transcript and return the assembled reply.
pub fn replay(file: &str, model: &str, mut on_chunk: impl FnMut(&str)) -> Result<String> {
    let transport = FileTransport::new(file);
    let messages = [ChatMessage::new(Role::User, format!("replay {file}"))];
    stream_chat_completion(&transport, model, &messages, &mut on_chunk)
        .with_context(|| format!("Failed to replay '{}'", file))
}

pub fn handle_replay(file: &str, model: &str, raw: bool, quiet: bool) -> Result<()> {
    let mut chunks = 0usize;
    let reply = replay(file, model, |chunk| {
        chunks += 1;
        if raw {
            print!("{chunk}");
            let _ = std::io::stdout().flush();
        }
    })?;

    if raw {
        println!();
    } else {
        println!("{}", to_terminal(&reply));
    }

    if !quiet {
        eprintln!(
            "{} {} chunk(s), {} chars",
            "Replayed".green().bold(),
            chunks,
            reply.chars().count()
        );
    }
    Ok(())
}
