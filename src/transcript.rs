//! # Transcript Parser
//!
//! Extracts the fenced code blocks of a Markdown chat transcript.
//!
//! ## Info strings
//!
//! The text after the opening fence names the language and, optionally, the
//! file the block belongs to:
//!
//! ````text
//! ```rust src/main.rs      language "rust", filename "src/main.rs"
//! ```ts:web/app.ts         language "ts", filename "web/app.ts"
//! ```bash                  language "bash"
//! ```                      no language
//! ````
//!
//! A closing fence must use the same character and be at least as long as
//! the opening one. An unterminated block runs to the end of the input.

use anyhow::{Context, Result};
use regex::Regex;
use std::path::Path;

/// A code block found in a transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    /// Position among the transcript's code blocks.
    pub index: usize,
    pub language: Option<String>,
    pub filename: Option<String>,
    pub text: String,
}

/// Opening fence: up to three spaces of indent, the fence run, the info string.
const FENCE_PATTERN: &str = r"^( {0,3})(`{3,}|~{3,})\s*([^`]*?)\s*$";

struct OpenFence {
    indent: usize,
    marker: char,
    len: usize,
    language: Option<String>,
    filename: Option<String>,
    lines: Vec<String>,
}

/// Parse every fenced code block in `markdown`.
pub fn parse_code_blocks(markdown: &str) -> Result<Vec<CodeBlock>> {
    let fence_re = Regex::new(FENCE_PATTERN).context("Failed to compile fence regex pattern")?;

    let mut blocks = Vec::new();
    let mut open: Option<OpenFence> = None;

    for line in markdown.lines() {
        if let Some(fence) = open.as_mut() {
            if is_closing_fence(line, fence.marker, fence.len) {
                if let Some(fence) = open.take() {
                    blocks.push(finish(fence, blocks.len()));
                }
                continue;
            }
            fence.lines.push(strip_indent(line, fence.indent).to_string());
            continue;
        }

        if let Some(caps) = fence_re.captures(line) {
            let indent = caps.get(1).map_or(0, |m| m.as_str().len());
            let fence_str = caps.get(2).map_or("", |m| m.as_str());
            let info = caps.get(3).map_or("", |m| m.as_str());
            let (language, filename) = parse_info(info);
            open = Some(OpenFence {
                indent,
                marker: fence_str.chars().next().unwrap_or('`'),
                len: fence_str.len(),
                language,
                filename,
                lines: Vec::new(),
            });
        }
    }

    if let Some(fence) = open.take() {
        blocks.push(finish(fence, blocks.len()));
    }

    Ok(blocks)
}

/// Read and parse a transcript file.
pub fn load_transcript(path: &Path) -> Result<Vec<CodeBlock>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read transcript: {}", path.display()))?;
    parse_code_blocks(&contents)
        .with_context(|| format!("Failed to parse transcript: {}", path.display()))
}

fn finish(fence: OpenFence, index: usize) -> CodeBlock {
    CodeBlock {
        index,
        language: fence.language,
        filename: fence.filename,
        text: fence.lines.join("\n"),
    }
}

fn is_closing_fence(line: &str, marker: char, len: usize) -> bool {
    let trimmed = line.trim_start_matches(' ');
    if line.len() - trimmed.len() > 3 {
        return false;
    }
    let run = trimmed.chars().take_while(|&c| c == marker).count();
    run >= len && trimmed[run * marker.len_utf8()..].trim().is_empty()
}

fn strip_indent(line: &str, indent: usize) -> &str {
    let spaces = line.len() - line.trim_start_matches(' ').len();
    &line[spaces.min(indent)..]
}

fn parse_info(info: &str) -> (Option<String>, Option<String>) {
    let mut parts = info.split_whitespace();
    let Some(first) = parts.next() else {
        return (None, None);
    };

    if let Some((lang, path)) = first.split_once(':') {
        let language = (!lang.is_empty()).then(|| lang.to_string());
        let filename = (!path.is_empty()).then(|| path.to_string());
        return (language, filename);
    }

    (Some(first.to_string()), parts.next().map(str::to_string))
}
