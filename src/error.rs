//! Errors returned by host bridge operations.

use std::path::PathBuf;
use thiserror::Error;

/// Failures surfaced when the host executes a toolbar command.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("no file is currently open")]
    NoCurrentFile,

    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("clipboard unavailable: {0}")]
    Clipboard(String),

    #[error("failed to start terminal command: {0}")]
    Pty(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type HostResult<T> = std::result::Result<T, HostError>;
