//! # Code Block Toolbar
//!
//! The toolbar shown above (or below) every code block of a conversation:
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │ 📄 src/main.rs                   📋 Copy   ▶ Apply      │
//! ├────────────────────────────────────────────────────────┤
//! │ fn main() { ... }                                      │
//! └────────────────────────────────────────────────────────┘
//! ```
//!
//! [`CodeBlockToolbar`] owns the transient UI state (copied / applying) and
//! turns clicks into [`ToolbarCommand`]s. It performs no I/O itself: the
//! caller dispatches the returned commands through a host bridge.
//!
//! ## Action button
//!
//! Blocks that classify as terminal commands get "Run in terminal", which
//! runs the block (minus a leading `$ ` prompt) in the host terminal. Every
//! other block gets "Apply", which replaces the current file's contents and
//! is debounced while the previous apply is still showing "Applying...".

pub mod feedback;

pub use feedback::{Feedback, FEEDBACK_WINDOW};

use crate::classify::{is_terminal_code_block, strip_prompt};
use crate::config::Capabilities;
use crate::host::{HostEvent, HostMessage, Listener, ToolbarCommand};
use std::time::{Duration, Instant};

/// Inputs supplied by the view that renders the code block.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ToolbarProps {
    pub text: String,
    /// Render the toolbar under the code instead of above it.
    pub bottom: bool,
    pub language: Option<String>,
    /// This block is the target of the global apply shortcut.
    pub is_next_code_block: bool,
    pub filename: Option<String>,
}

/// Icons used on toolbar buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Icon {
    File,
    Clipboard,
    Check,
    Play,
}

impl Icon {
    pub fn glyph(self) -> &'static str {
        match self {
            Icon::File => "📄",
            Icon::Clipboard => "📋",
            Icon::Check => "✓",
            Icon::Play => "▶",
        }
    }
}

/// Icon and text of a button, as it should currently be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonLabel {
    pub icon: Icon,
    pub text: &'static str,
}

pub struct CodeBlockToolbar {
    props: ToolbarProps,
    capabilities: Capabilities,
    copied: Feedback,
    applying: Feedback,
    listener: Listener,
}

impl CodeBlockToolbar {
    pub fn new(props: ToolbarProps, capabilities: Capabilities, window: Duration) -> Self {
        let mut toolbar = Self {
            props,
            capabilities,
            copied: Feedback::new(window),
            applying: Feedback::new(window),
            listener: Listener::new(HostEvent::ApplyCodeFromChat),
        };
        toolbar.sync_listener();
        toolbar
    }

    pub fn props(&self) -> &ToolbarProps {
        &self.props
    }

    /// Replace the props. The apply shortcut listener is registered again
    /// when `is_next_code_block` or `text` changed.
    pub fn set_props(&mut self, props: ToolbarProps) {
        self.props = props;
        self.sync_listener();
    }

    pub fn set_next_code_block(&mut self, is_next: bool) {
        if self.props.is_next_code_block != is_next {
            self.props.is_next_code_block = is_next;
            self.sync_listener();
        }
    }

    fn sync_listener(&mut self) {
        let active = self.props.is_next_code_block;
        self.listener
            .sync(active, &(self.props.is_next_code_block, &self.props.text));
    }

    pub fn listener(&self) -> &Listener {
        &self.listener
    }

    pub fn is_terminal(&self) -> bool {
        is_terminal_code_block(self.props.language.as_deref(), &self.props.text)
    }

    /// Clicking the filename asks the host to open the file. Without a
    /// filename there is nothing to open.
    pub fn click_header(&self) -> Option<ToolbarCommand> {
        let filepath = self.props.filename.clone()?;
        Some(ToolbarCommand::Post(HostMessage::ShowFile { filepath }))
    }

    pub fn click_copy(&mut self, now: Instant) -> ToolbarCommand {
        let text = self.props.text.clone();
        let command = if self.capabilities.host_mediated_clipboard {
            ToolbarCommand::Request(HostMessage::CopyText { text })
        } else {
            ToolbarCommand::WriteClipboard(text)
        };
        self.copied.trigger(now);
        command
    }

    /// Run the block in a terminal, or apply it to the current file.
    ///
    /// Returns `None` when the action button is hidden in this host, or when
    /// an apply is still in its feedback window.
    pub fn click_action(&mut self, now: Instant) -> Option<ToolbarCommand> {
        if !self.capabilities.action_button {
            return None;
        }

        if self.is_terminal() {
            let command = strip_prompt(&self.props.text).to_string();
            return Some(ToolbarCommand::RunCommand(command));
        }

        // The flag is set by the previous click, not by the host's reply
        if self.applying.is_active(now) {
            return None;
        }
        self.applying.trigger(now);
        Some(ToolbarCommand::Post(HostMessage::ApplyToCurrentFile {
            text: self.props.text.clone(),
        }))
    }

    /// Handle an event pushed by the host. Only the next code block listens
    /// for the apply shortcut.
    pub fn on_host_event(&self, event: HostEvent) -> Option<ToolbarCommand> {
        if !self.listener.accepts(event) {
            return None;
        }
        match event {
            HostEvent::ApplyCodeFromChat => {
                Some(ToolbarCommand::ApplyAndAdvance(self.props.text.clone()))
            }
        }
    }

    /// Clear feedback whose window has elapsed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let copied = self.copied.expire(now);
        let applying = self.applying.expire(now);
        copied || applying
    }

    pub fn is_copied(&self, now: Instant) -> bool {
        self.copied.is_active(now)
    }

    pub fn is_applying(&self, now: Instant) -> bool {
        self.applying.is_active(now)
    }

    pub fn header_label(&self) -> Option<&str> {
        self.props.filename.as_deref()
    }

    pub fn copy_label(&self, now: Instant) -> ButtonLabel {
        if self.is_copied(now) {
            ButtonLabel {
                icon: Icon::Check,
                text: "Copied",
            }
        } else {
            ButtonLabel {
                icon: Icon::Clipboard,
                text: "Copy",
            }
        }
    }

    /// Label of the action button, or `None` when the host hides it.
    pub fn action_label(&self, now: Instant) -> Option<ButtonLabel> {
        if !self.show_action_button() {
            return None;
        }
        let applying = self.is_applying(now);
        let icon = if applying { Icon::Check } else { Icon::Play };
        let text = if self.is_terminal() {
            "Run in terminal"
        } else if applying {
            "Applying..."
        } else {
            "Apply"
        };
        Some(ButtonLabel { icon, text })
    }

    pub fn show_action_button(&self) -> bool {
        self.capabilities.action_button
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HostVariant;

    fn props(language: Option<&str>, text: &str) -> ToolbarProps {
        ToolbarProps {
            text: text.to_string(),
            language: language.map(str::to_string),
            ..ToolbarProps::default()
        }
    }

    fn toolbar(props: ToolbarProps) -> CodeBlockToolbar {
        CodeBlockToolbar::new(props, Capabilities::default(), FEEDBACK_WINDOW)
    }

    #[test]
    fn test_header_without_filename_is_noop() {
        let tb = toolbar(props(Some("rust"), "fn main() {}"));
        assert_eq!(tb.click_header(), None);
        assert_eq!(tb.header_label(), None);
    }

    #[test]
    fn test_header_with_filename_shows_file() {
        let mut p = props(Some("rust"), "fn main() {}");
        p.filename = Some("src/main.rs".to_string());
        let tb = toolbar(p);
        assert_eq!(
            tb.click_header(),
            Some(ToolbarCommand::Post(HostMessage::ShowFile {
                filepath: "src/main.rs".to_string()
            }))
        );
    }

    #[test]
    fn test_terminal_block_run_ignores_applying() {
        let t0 = Instant::now();
        let mut tb = toolbar(props(Some("bash"), "$ ls -la"));

        for _ in 0..2 {
            assert_eq!(
                tb.click_action(t0),
                Some(ToolbarCommand::RunCommand("ls -la".to_string()))
            );
        }
        assert!(!tb.is_applying(t0));
    }

    #[test]
    fn test_apply_is_debounced_while_applying() {
        let t0 = Instant::now();
        let mut tb = toolbar(props(Some("python"), "print(1)\nprint(2)"));

        assert!(matches!(
            tb.click_action(t0),
            Some(ToolbarCommand::Post(HostMessage::ApplyToCurrentFile { .. }))
        ));
        assert!(tb.is_applying(t0));
        assert_eq!(tb.click_action(t0 + Duration::from_millis(500)), None);

        let later = t0 + FEEDBACK_WINDOW;
        tb.tick(later);
        assert!(!tb.is_applying(later));
        assert!(tb.click_action(later).is_some());
    }

    #[test]
    fn test_labels() {
        let t0 = Instant::now();
        let mut tb = toolbar(props(Some("rust"), "fn a() {}\nfn b() {}"));
        assert_eq!(tb.copy_label(t0).text, "Copy");
        assert_eq!(tb.action_label(t0).map(|l| l.text), Some("Apply"));

        tb.click_copy(t0);
        tb.click_action(t0);
        assert_eq!(tb.copy_label(t0).text, "Copied");
        assert_eq!(tb.copy_label(t0).icon, Icon::Check);
        assert_eq!(
            tb.action_label(t0),
            Some(ButtonLabel {
                icon: Icon::Check,
                text: "Applying..."
            })
        );

        let run = toolbar(props(None, "git status"));
        assert_eq!(
            run.action_label(t0),
            Some(ButtonLabel {
                icon: Icon::Play,
                text: "Run in terminal"
            })
        );
    }

    #[test]
    fn test_mediated_host_hides_action_and_routes_copy() {
        let t0 = Instant::now();
        let mut tb = CodeBlockToolbar::new(
            props(Some("bash"), "ls"),
            Capabilities::for_variant(HostVariant::Mediated),
            FEEDBACK_WINDOW,
        );

        assert_eq!(tb.action_label(t0), None);
        assert_eq!(tb.click_action(t0), None);
        assert_eq!(
            tb.click_copy(t0),
            ToolbarCommand::Request(HostMessage::CopyText {
                text: "ls".to_string()
            })
        );
    }

    #[test]
    fn test_copy_uses_platform_clipboard_by_default() {
        let mut tb = toolbar(props(None, "  keep  whitespace \n"));
        assert_eq!(
            tb.click_copy(Instant::now()),
            ToolbarCommand::WriteClipboard("  keep  whitespace \n".to_string())
        );
    }

    #[test]
    fn test_shortcut_only_reaches_next_block() {
        let mut tb = toolbar(props(Some("rust"), "fn a() {}"));
        assert_eq!(tb.on_host_event(HostEvent::ApplyCodeFromChat), None);

        tb.set_next_code_block(true);
        assert_eq!(
            tb.on_host_event(HostEvent::ApplyCodeFromChat),
            Some(ToolbarCommand::ApplyAndAdvance("fn a() {}".to_string()))
        );

        tb.set_next_code_block(false);
        assert_eq!(tb.on_host_event(HostEvent::ApplyCodeFromChat), None);
    }

    #[test]
    fn test_text_change_resubscribes() {
        let mut p = props(Some("rust"), "fn a() {}");
        p.is_next_code_block = true;
        let mut tb = toolbar(p.clone());
        assert_eq!(tb.listener().subscriptions(), 1);

        tb.set_props(p.clone());
        assert_eq!(tb.listener().subscriptions(), 1);

        p.text = "fn b() {}".to_string();
        tb.set_props(p);
        assert_eq!(tb.listener().subscriptions(), 2);
        assert_eq!(
            tb.on_host_event(HostEvent::ApplyCodeFromChat),
            Some(ToolbarCommand::ApplyAndAdvance("fn b() {}".to_string()))
        );
    }
}
