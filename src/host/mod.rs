//! # Host Bridge
//!
//! The toolbar never talks to its environment directly. Every click yields a
//! [`ToolbarCommand`], and the caller hands that command to [`dispatch`],
//! which executes it against a [`HostBridge`] and a [`Clipboard`] and returns
//! the outcome.
//!
//! ## Message kinds
//!
//! | Kind | Payload | Sent by |
//! |------|---------|---------|
//! | `applyToCurrentFile` | `{ text }` | Apply button, apply shortcut |
//! | `copyText` | `{ text }` | Copy button in a mediated host |
//! | `showFile` | `{ filepath }` | Filename header |
//!
//! Shell commands go through [`HostBridge::run_command`] instead of a
//! message.

pub mod clipboard;
pub mod events;
pub mod local;
pub mod pty;

pub use clipboard::{Clipboard, SystemClipboard};
pub use events::{HostEvent, Listener};
pub use local::LocalHost;

use crate::error::HostResult;
use crate::sequence::ApplySequence;
use serde::{Deserialize, Serialize};

/// A message sent from a toolbar to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "messageType", content = "data", rename_all = "camelCase")]
pub enum HostMessage {
    ApplyToCurrentFile { text: String },
    CopyText { text: String },
    ShowFile { filepath: String },
}

impl HostMessage {
    pub fn kind(&self) -> &'static str {
        match self {
            HostMessage::ApplyToCurrentFile { .. } => "applyToCurrentFile",
            HostMessage::CopyText { .. } => "copyText",
            HostMessage::ShowFile { .. } => "showFile",
        }
    }
}

/// The channel to the surrounding application.
pub trait HostBridge {
    /// Send a message and wait for the host to handle it.
    fn request(&mut self, message: HostMessage) -> HostResult<()>;

    /// Send a message without waiting for it to be handled.
    fn post(&mut self, message: HostMessage) -> HostResult<()>;

    /// Run a shell command in the host's integrated terminal.
    fn run_command(&mut self, command: &str) -> HostResult<()>;
}

/// A side effect requested by a toolbar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolbarCommand {
    Post(HostMessage),
    Request(HostMessage),
    RunCommand(String),
    /// Copy through the platform clipboard.
    WriteClipboard(String),
    /// Request an apply of the text, then move the apply sequence forward.
    ApplyAndAdvance(String),
}

/// Execute a toolbar command.
///
/// For [`ToolbarCommand::ApplyAndAdvance`] the sequence only advances once
/// the apply request returned successfully.
pub fn dispatch<B, C>(
    command: ToolbarCommand,
    bridge: &mut B,
    clipboard: &mut C,
    sequence: &mut ApplySequence,
) -> HostResult<()>
where
    B: HostBridge + ?Sized,
    C: Clipboard + ?Sized,
{
    match command {
        ToolbarCommand::Post(message) => {
            tracing::debug!(kind = message.kind(), "post");
            bridge.post(message)
        }
        ToolbarCommand::Request(message) => {
            tracing::debug!(kind = message.kind(), "request");
            bridge.request(message)
        }
        ToolbarCommand::RunCommand(command) => {
            tracing::info!(%command, "run in terminal");
            bridge.run_command(&command)
        }
        ToolbarCommand::WriteClipboard(text) => {
            tracing::debug!(bytes = text.len(), "copy to clipboard");
            clipboard.set_text(&text)
        }
        ToolbarCommand::ApplyAndAdvance(text) => {
            bridge.request(HostMessage::ApplyToCurrentFile { text })?;
            sequence.advance();
            tracing::debug!(next = ?sequence.next(), "apply sequence advanced");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HostError;

    #[derive(Default)]
    struct Recorder {
        requests: Vec<HostMessage>,
        posts: Vec<HostMessage>,
        commands: Vec<String>,
        fail_requests: bool,
    }

    impl HostBridge for Recorder {
        fn request(&mut self, message: HostMessage) -> HostResult<()> {
            if self.fail_requests {
                return Err(HostError::NoCurrentFile);
            }
            self.requests.push(message);
            Ok(())
        }

        fn post(&mut self, message: HostMessage) -> HostResult<()> {
            self.posts.push(message);
            Ok(())
        }

        fn run_command(&mut self, command: &str) -> HostResult<()> {
            self.commands.push(command.to_string());
            Ok(())
        }
    }

    #[derive(Default)]
    struct Board(Option<String>);

    impl Clipboard for Board {
        fn set_text(&mut self, text: &str) -> HostResult<()> {
            self.0 = Some(text.to_string());
            Ok(())
        }
    }

    #[test]
    fn test_message_wire_format() {
        let msg = HostMessage::ShowFile {
            filepath: "src/main.rs".to_string(),
        };
        let json = serde_json::to_value(&msg).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({"messageType": "showFile", "data": {"filepath": "src/main.rs"}})
        );
        assert_eq!(msg.kind(), "showFile");

        let parsed: HostMessage = serde_json::from_str(
            r#"{"messageType": "applyToCurrentFile", "data": {"text": "x"}}"#,
        )
        .expect("deserialize");
        assert_eq!(
            parsed,
            HostMessage::ApplyToCurrentFile {
                text: "x".to_string()
            }
        );
    }

    #[test]
    fn test_apply_and_advance_moves_sequence() {
        let mut bridge = Recorder::default();
        let mut board = Board::default();
        let mut seq = ApplySequence::new(2);

        dispatch(
            ToolbarCommand::ApplyAndAdvance("fn a() {}".to_string()),
            &mut bridge,
            &mut board,
            &mut seq,
        )
        .expect("dispatch");

        assert_eq!(bridge.requests.len(), 1);
        assert!(seq.is_next(1));
    }

    #[test]
    fn test_failed_apply_does_not_advance() {
        let mut bridge = Recorder {
            fail_requests: true,
            ..Recorder::default()
        };
        let mut board = Board::default();
        let mut seq = ApplySequence::new(2);

        let result = dispatch(
            ToolbarCommand::ApplyAndAdvance("x".to_string()),
            &mut bridge,
            &mut board,
            &mut seq,
        );

        assert!(matches!(result, Err(HostError::NoCurrentFile)));
        assert!(seq.is_next(0));
    }

    #[test]
    fn test_routes_each_command() {
        let mut bridge = Recorder::default();
        let mut board = Board::default();
        let mut seq = ApplySequence::new(1);

        let commands = vec![
            ToolbarCommand::Post(HostMessage::ApplyToCurrentFile {
                text: "a".to_string(),
            }),
            ToolbarCommand::Request(HostMessage::CopyText {
                text: "b".to_string(),
            }),
            ToolbarCommand::RunCommand("ls".to_string()),
            ToolbarCommand::WriteClipboard("c".to_string()),
        ];
        for command in commands {
            dispatch(command, &mut bridge, &mut board, &mut seq).expect("dispatch");
        }

        assert_eq!(bridge.posts.len(), 1);
        assert_eq!(bridge.requests.len(), 1);
        assert_eq!(bridge.commands, vec!["ls".to_string()]);
        assert_eq!(board.0.as_deref(), Some("c"));
        assert!(seq.is_next(0));
    }
}
