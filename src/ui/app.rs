use crate::config::Capabilities;
use crate::host::{dispatch, Clipboard, HostBridge, HostEvent, HostMessage, ToolbarCommand};
use crate::sequence::ApplySequence;
use crate::toolbar::{CodeBlockToolbar, ToolbarProps};
use crate::transcript::CodeBlock;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    Transcript,
    Preview,
    Terminal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
}

/// State of the transcript panel: the code blocks, one toolbar per block,
/// and the apply sequence shared between them.
pub struct App {
    pub title: String,
    pub blocks: Vec<CodeBlock>,
    pub toolbars: Vec<CodeBlockToolbar>,
    pub selected_index: usize,
    pub sequence: ApplySequence,
    pub focus: FocusPane,
    /// Rows scrolled back from the live terminal output (0 = bottom).
    pub terminal_scroll: usize,
    pub status: Option<StatusMessage>,
    pub should_quit: bool,
}

impl App {
    pub fn new(
        title: String,
        blocks: Vec<CodeBlock>,
        capabilities: Capabilities,
        feedback_window: Duration,
        toolbar_bottom: bool,
    ) -> Self {
        let sequence = ApplySequence::new(blocks.len());
        let toolbars = blocks
            .iter()
            .map(|block| {
                let props = ToolbarProps {
                    text: block.text.clone(),
                    bottom: toolbar_bottom,
                    language: block.language.clone(),
                    is_next_code_block: sequence.is_next(block.index),
                    filename: block.filename.clone(),
                };
                CodeBlockToolbar::new(props, capabilities, feedback_window)
            })
            .collect();

        Self {
            title,
            blocks,
            toolbars,
            selected_index: 0,
            sequence,
            focus: FocusPane::Transcript,
            terminal_scroll: 0,
            status: None,
            should_quit: false,
        }
    }

    /// Scroll the terminal pane back into history, at most `max` rows.
    pub fn scroll_terminal_up(&mut self, rows: usize, max: usize) {
        self.terminal_scroll = self.terminal_scroll.saturating_add(rows).min(max);
    }

    pub fn scroll_terminal_down(&mut self, rows: usize) {
        self.terminal_scroll = self.terminal_scroll.saturating_sub(rows);
    }

    pub fn reset_terminal_scroll(&mut self) {
        self.terminal_scroll = 0;
    }

    pub fn toggle_focus(&mut self, has_terminal: bool) {
        self.focus = match self.focus {
            FocusPane::Transcript => FocusPane::Preview,
            FocusPane::Preview => {
                if has_terminal {
                    FocusPane::Terminal
                } else {
                    FocusPane::Transcript
                }
            }
            FocusPane::Terminal => FocusPane::Transcript,
        };
    }

    pub fn next(&mut self) {
        if !self.blocks.is_empty() {
            self.selected_index = (self.selected_index + 1) % self.blocks.len();
        }
    }

    pub fn previous(&mut self) {
        if !self.blocks.is_empty() {
            if self.selected_index > 0 {
                self.selected_index -= 1;
            } else {
                self.selected_index = self.blocks.len() - 1;
            }
        }
    }

    pub fn selected_block(&self) -> Option<&CodeBlock> {
        self.blocks.get(self.selected_index)
    }

    pub fn selected_toolbar(&self) -> Option<&CodeBlockToolbar> {
        self.toolbars.get(self.selected_index)
    }

    /// Expire feedback flags. Returns true if anything changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.toolbars
            .iter_mut()
            .fold(false, |changed, tb| tb.tick(now) || changed)
    }

    /// Tell every toolbar whether it is the apply shortcut's target.
    fn sync_sequence(&mut self) {
        for (i, tb) in self.toolbars.iter_mut().enumerate() {
            tb.set_next_code_block(self.sequence.is_next(i));
        }
    }

    pub fn click_header(&mut self, bridge: &mut dyn HostBridge, clipboard: &mut dyn Clipboard) {
        let command = self.selected_toolbar().and_then(CodeBlockToolbar::click_header);
        if let Some(command) = command {
            self.execute(command, bridge, clipboard);
        }
    }

    pub fn click_copy(
        &mut self,
        now: Instant,
        bridge: &mut dyn HostBridge,
        clipboard: &mut dyn Clipboard,
    ) {
        let command = self
            .toolbars
            .get_mut(self.selected_index)
            .map(|tb| tb.click_copy(now));
        if let Some(command) = command {
            self.execute(command, bridge, clipboard);
        }
    }

    pub fn click_action(
        &mut self,
        now: Instant,
        bridge: &mut dyn HostBridge,
        clipboard: &mut dyn Clipboard,
    ) {
        let command = self
            .toolbars
            .get_mut(self.selected_index)
            .and_then(|tb| tb.click_action(now));
        if let Some(command) = command {
            self.execute(command, bridge, clipboard);
        }
    }

    /// The global apply shortcut: broadcast the event to every toolbar. Only
    /// the current target is listening.
    pub fn apply_shortcut(&mut self, bridge: &mut dyn HostBridge, clipboard: &mut dyn Clipboard) {
        let commands: Vec<ToolbarCommand> = self
            .toolbars
            .iter()
            .filter_map(|tb| tb.on_host_event(HostEvent::ApplyCodeFromChat))
            .collect();

        if commands.is_empty() {
            self.set_status("No code block left to apply", false);
            return;
        }
        for command in commands {
            self.execute(command, bridge, clipboard);
        }
    }

    fn execute(
        &mut self,
        command: ToolbarCommand,
        bridge: &mut dyn HostBridge,
        clipboard: &mut dyn Clipboard,
    ) {
        let summary = describe(&command);
        let advances = matches!(command, ToolbarCommand::ApplyAndAdvance(_));
        let runs = matches!(command, ToolbarCommand::RunCommand(_));

        match dispatch(command, bridge, clipboard, &mut self.sequence) {
            Ok(()) => {
                if advances {
                    self.sync_sequence();
                    if let Some(next) = self.sequence.next() {
                        self.selected_index = next;
                    }
                }
                if runs {
                    self.reset_terminal_scroll();
                }
                self.set_status(summary, false);
            }
            Err(e) => {
                tracing::warn!("{} failed: {}", summary, e);
                self.set_status(format!("{} failed: {}", summary, e), true);
            }
        }
    }

    pub fn set_status(&mut self, text: impl Into<String>, is_error: bool) {
        self.status = Some(StatusMessage {
            text: text.into(),
            is_error,
        });
    }

    /// Handle a key pressed while the transcript or preview has focus.
    pub fn handle_key(
        &mut self,
        key: KeyEvent,
        now: Instant,
        has_terminal: bool,
        bridge: &mut dyn HostBridge,
        clipboard: &mut dyn Clipboard,
    ) {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('a') => self.apply_shortcut(bridge, clipboard),
                KeyCode::Char('c') => self.should_quit = true,
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => self.next(),
            KeyCode::Char('k') | KeyCode::Up => self.previous(),
            KeyCode::Char('y') | KeyCode::Char('c') => self.click_copy(now, bridge, clipboard),
            KeyCode::Char('a') | KeyCode::Enter => self.click_action(now, bridge, clipboard),
            KeyCode::Char('o') => self.click_header(bridge, clipboard),
            KeyCode::Tab => self.toggle_focus(has_terminal),
            KeyCode::Esc => self.focus = FocusPane::Transcript,
            _ => {}
        }
    }
}

fn describe(command: &ToolbarCommand) -> String {
    match command {
        ToolbarCommand::Post(HostMessage::ShowFile { filepath })
        | ToolbarCommand::Request(HostMessage::ShowFile { filepath }) => {
            format!("Open {}", filepath)
        }
        ToolbarCommand::Post(HostMessage::ApplyToCurrentFile { .. })
        | ToolbarCommand::Request(HostMessage::ApplyToCurrentFile { .. })
        | ToolbarCommand::ApplyAndAdvance(_) => "Apply to current file".to_string(),
        ToolbarCommand::Post(HostMessage::CopyText { .. })
        | ToolbarCommand::Request(HostMessage::CopyText { .. })
        | ToolbarCommand::WriteClipboard(_) => "Copy".to_string(),
        ToolbarCommand::RunCommand(cmd) => format!("Run `{}`", cmd),
    }
}
