//! # Clipboard Access
//!
//! Two ways to put text on the user's clipboard:
//!
//! - [`SystemClipboard`] uses the platform clipboard through `arboard`.
//! - [`osc52_sequence`] builds an OSC 52 escape sequence that asks the
//!   terminal emulator to set the clipboard. This is the host-mediated path,
//!   used when the panel runs somewhere without a native clipboard (over SSH,
//!   inside a multiplexer).

use crate::error::{HostError, HostResult};
use base64::{engine::general_purpose::STANDARD, Engine as _};

/// Something that can receive copied text.
pub trait Clipboard {
    fn set_text(&mut self, text: &str) -> HostResult<()>;
}

/// The platform clipboard. The underlying handle is opened on first use so
/// that headless sessions only fail when they actually copy.
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clipboard for SystemClipboard {
    fn set_text(&mut self, text: &str) -> HostResult<()> {
        if self.inner.is_none() {
            let clipboard =
                arboard::Clipboard::new().map_err(|e| HostError::Clipboard(e.to_string()))?;
            self.inner = Some(clipboard);
        }
        match self.inner.as_mut() {
            Some(clipboard) => clipboard
                .set_text(text)
                .map_err(|e| HostError::Clipboard(e.to_string())),
            None => Err(HostError::Clipboard("clipboard not initialized".to_string())),
        }
    }
}

/// Build the OSC 52 sequence that sets the system clipboard to `text`.
pub fn osc52_sequence(text: &str) -> String {
    format!("\x1b]52;c;{}\x07", STANDARD.encode(text))
}
