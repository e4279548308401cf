//! # Local Host
//!
//! [`LocalHost`] is the host bridge used by the `blockbar` binary. It plays
//! the part of the surrounding IDE:
//!
//! - `showFile` opens a workspace file as the current file
//! - `applyToCurrentFile` replaces the current file's contents
//! - `copyText` writes an OSC 52 sequence so the terminal sets the clipboard
//! - shell commands run in a PTY shown in the terminal pane

use super::clipboard::osc52_sequence;
use super::pty::{self, PtyHandle};
use super::{HostBridge, HostMessage};
use crate::error::{HostError, HostResult};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub struct LocalHost {
    workspace: PathBuf,
    shell: String,
    current_file: Option<PathBuf>,
    preview: Option<String>,
    terminal: Option<PtyHandle>,
    terminal_size: (u16, u16),
    escape_out: Box<dyn Write + Send>,
}

impl LocalHost {
    pub fn new(workspace: PathBuf, shell: impl Into<String>) -> Self {
        Self {
            workspace,
            shell: shell.into(),
            current_file: None,
            preview: None,
            terminal: None,
            terminal_size: (80, 24),
            escape_out: Box::new(io::stdout()),
        }
    }

    /// Send OSC 52 sequences somewhere other than stdout.
    pub fn with_escape_writer(mut self, writer: Box<dyn Write + Send>) -> Self {
        self.escape_out = writer;
        self
    }

    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    pub fn current_file(&self) -> Option<&Path> {
        self.current_file.as_deref()
    }

    /// Contents of the current file as of the last open or apply.
    pub fn preview(&self) -> Option<&str> {
        self.preview.as_deref()
    }

    pub fn terminal(&self) -> Option<&PtyHandle> {
        self.terminal.as_ref()
    }

    /// Size (cols, rows) used for the next terminal command.
    pub fn set_terminal_size(&mut self, cols: u16, rows: u16) {
        self.terminal_size = (cols.max(20), rows.max(5));
    }

    /// Resolve a path from a code block against the workspace root.
    pub fn resolve(&self, filepath: &str) -> PathBuf {
        let path = Path::new(filepath);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.workspace.join(path)
        }
    }

    /// Make `filepath` the current file.
    pub fn open_file(&mut self, filepath: &str) -> HostResult<()> {
        let path = self.resolve(filepath);
        if !path.is_file() {
            return Err(HostError::FileNotFound(path));
        }
        self.preview = Some(fs::read_to_string(&path)?);
        tracing::info!(path = %path.display(), "opened file");
        self.current_file = Some(path);
        Ok(())
    }

    fn apply_to_current_file(&mut self, text: &str) -> HostResult<()> {
        let path = self.current_file.as_ref().ok_or(HostError::NoCurrentFile)?;
        fs::write(path, text)?;
        tracing::info!(path = %path.display(), bytes = text.len(), "applied code block");
        self.preview = Some(text.to_string());
        Ok(())
    }

    fn copy_text(&mut self, text: &str) -> HostResult<()> {
        self.escape_out.write_all(osc52_sequence(text).as_bytes())?;
        self.escape_out.flush()?;
        Ok(())
    }

    fn handle(&mut self, message: HostMessage) -> HostResult<()> {
        match message {
            HostMessage::ApplyToCurrentFile { text } => self.apply_to_current_file(&text),
            HostMessage::CopyText { text } => self.copy_text(&text),
            HostMessage::ShowFile { filepath } => self.open_file(&filepath),
        }
    }
}

impl HostBridge for LocalHost {
    fn request(&mut self, message: HostMessage) -> HostResult<()> {
        self.handle(message)
    }

    fn post(&mut self, message: HostMessage) -> HostResult<()> {
        let kind = message.kind();
        self.handle(message).inspect_err(|e| {
            tracing::warn!(kind, "posted message failed: {}", e);
        })
    }

    fn run_command(&mut self, command: &str) -> HostResult<()> {
        if let Some(previous) = self.terminal.take() {
            previous.terminate();
        }
        let (cols, rows) = self.terminal_size;
        let handle = pty::spawn_shell_command(&self.shell, command, &self.workspace, cols, rows)
            .map_err(|e| HostError::Pty(format!("{:#}", e)))?;
        self.terminal = Some(handle);
        Ok(())
    }
}
