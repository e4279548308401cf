use crate::host::LocalHost;
use crate::host::pty::ExecutionStatus;
use crate::toolbar::{CodeBlockToolbar, Icon};
use crate::ui::app::{App, FocusPane};
use crate::ui::terminal_widget::TerminalView;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use std::time::Instant;

const ACCENT: Color = Color::Cyan;
const MUTED: Color = Color::Gray;

pub fn render(frame: &mut Frame, app: &App, host: &LocalHost, now: Instant) {
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Body
            Constraint::Length(1), // Footer
        ])
        .split(frame.area());

    render_header(frame, app, main_chunks[0]);

    let body_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(main_chunks[1]);

    render_transcript(frame, app, now, body_chunks[0]);

    if host.terminal().is_some() {
        let right_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(body_chunks[1]);
        render_preview(frame, app, host, right_chunks[0]);
        render_terminal(frame, app, host, right_chunks[1]);
    } else {
        render_preview(frame, app, host, body_chunks[1]);
    }

    render_footer(frame, app, main_chunks[2]);
}

/// Inner size (cols, rows) of the terminal pane for a given frame size.
pub fn terminal_pane_size(width: u16, height: u16) -> (u16, u16) {
    let cols = ((u32::from(width) * 45 / 100) as u16).saturating_sub(2);
    let rows = (height.saturating_sub(4) / 2).saturating_sub(2);
    (cols, rows)
}

fn border_style(app: &App, pane: FocusPane) -> Style {
    if app.focus == pane {
        Style::default().fg(ACCENT)
    } else {
        Style::default().fg(MUTED)
    }
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let next = match app.sequence.next() {
        Some(i) => format!("next apply: block {}", i + 1),
        None => "all blocks applied".to_string(),
    };
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            format!("  {}  ", app.title),
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("{} code blocks · {}", app.blocks.len(), next),
            Style::default().fg(MUTED),
        ),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(ACCENT)),
    );

    frame.render_widget(header, area);
}

/// The toolbar row: filename on the left, buttons on the right.
fn toolbar_line(toolbar: &CodeBlockToolbar, now: Instant, width: usize) -> Line<'static> {
    let link = Style::default().fg(Color::White);
    let button = Style::default().fg(MUTED);
    let done = Style::default().fg(Color::Green);

    let left: Vec<Span> = match toolbar.header_label() {
        Some(name) => vec![
            Span::raw(format!("{} ", Icon::File.glyph())),
            Span::styled(name.to_string(), link.add_modifier(Modifier::UNDERLINED)),
        ],
        None => Vec::new(),
    };

    let mut right = Vec::new();
    let copy = toolbar.copy_label(now);
    let copy_style = if copy.icon == Icon::Check { done } else { button };
    right.push(Span::styled(
        format!("{} {}", copy.icon.glyph(), copy.text),
        copy_style,
    ));
    if let Some(action) = toolbar.action_label(now) {
        let style = if action.icon == Icon::Check { done } else { button };
        right.push(Span::raw("   "));
        right.push(Span::styled(
            format!("{} {}", action.icon.glyph(), action.text),
            style,
        ));
    }
    if toolbar.props().is_next_code_block {
        right.push(Span::styled("  ⏎", Style::default().fg(Color::Yellow)));
    }

    let used: usize = left.iter().chain(right.iter()).map(Span::width).sum();
    let mut spans = left;
    spans.push(Span::raw(" ".repeat(width.saturating_sub(used))));
    spans.extend(right);
    Line::from(spans)
}

fn render_transcript(frame: &mut Frame, app: &App, now: Instant, area: Rect) {
    let inner_width = area.width.saturating_sub(4) as usize;
    let mut lines: Vec<Line> = Vec::new();
    let mut selected_offset = 0usize;

    for (i, (block, toolbar)) in app.blocks.iter().zip(&app.toolbars).enumerate() {
        let selected = i == app.selected_index;
        if selected {
            selected_offset = lines.len();
        }
        let gutter = if selected {
            Span::styled("▌ ", Style::default().fg(ACCENT))
        } else {
            Span::raw("  ")
        };

        let mut bar = toolbar_line(toolbar, now, inner_width);
        bar.spans.insert(0, gutter.clone());
        let bar = bar.style(Style::default().add_modifier(Modifier::DIM).fg(MUTED));

        let lang = block.language.as_deref().unwrap_or("text");
        let code_style = Style::default().fg(Color::White);

        if !toolbar.props().bottom {
            lines.push(bar.clone());
        }
        lines.push(Line::from(vec![
            gutter.clone(),
            Span::styled(format!("── {} ", lang), Style::default().fg(MUTED)),
        ]));
        for code_line in block.text.lines() {
            lines.push(Line::from(vec![
                gutter.clone(),
                Span::styled(code_line.to_string(), code_style),
            ]));
        }
        if toolbar.props().bottom {
            lines.push(bar);
        }
        lines.push(Line::from(""));
    }

    if lines.is_empty() {
        lines.push(Line::from("No code blocks in this transcript"));
    }

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("💬 Code Blocks")
                .border_style(border_style(app, FocusPane::Transcript)),
        )
        .scroll((selected_offset.min(u16::MAX as usize) as u16, 0));

    frame.render_widget(paragraph, area);
}

fn render_preview(frame: &mut Frame, app: &App, host: &LocalHost, area: Rect) {
    let title = match host.current_file() {
        Some(path) => {
            let shown = path.strip_prefix(host.workspace()).unwrap_or(path);
            format!("📄 {}", shown.display())
        }
        None => "📄 No file open".to_string(),
    };

    let text: Vec<Line> = match host.preview() {
        Some(contents) => contents.lines().map(|l| Line::from(l.to_string())).collect(),
        None => vec![
            Line::from("Press [o] on a block with a filename to open it."),
            Line::from("Apply writes the selected block to the open file."),
        ],
    };

    let paragraph = Paragraph::new(text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(border_style(app, FocusPane::Preview)),
        )
        .wrap(Wrap { trim: false });

    frame.render_widget(paragraph, area);
}

fn render_terminal(frame: &mut Frame, app: &App, host: &LocalHost, area: Rect) {
    let Some(handle) = host.terminal() else {
        return;
    };

    let status = match handle.poll_status() {
        ExecutionStatus::Running => {
            format!("running {}s", handle.started_at.elapsed().as_secs())
        }
        ExecutionStatus::Succeeded => "done".to_string(),
        ExecutionStatus::Failed => match handle.poll_exit_code() {
            Some(code) => format!("exit {}", code),
            None => "failed".to_string(),
        },
    };

    let title = if app.terminal_scroll > 0 {
        format!("⌨ {} [{}] ↑{}", handle.command, status, app.terminal_scroll)
    } else {
        format!("⌨ {} [{}]", handle.command, status)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(border_style(app, FocusPane::Terminal));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(
        TerminalView::new(&handle.parser).scroll_offset(app.terminal_scroll),
        inner,
    );
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(status) = &app.status {
        let color = if status.is_error { Color::Red } else { Color::Green };
        let footer = Paragraph::new(status.text.clone()).style(Style::default().fg(color));
        frame.render_widget(footer, area);
        return;
    }

    let help_text = match app.focus {
        FocusPane::Transcript | FocusPane::Preview => {
            "[↑↓/jk] Select  [y] Copy  [Enter/a] Apply/Run  [o] Open file  [Ctrl+a] Apply next  [Tab] Switch  [q] Quit"
        }
        FocusPane::Terminal => "Keys go to the running command  [PgUp/PgDn] Scroll  [Esc/Tab] Leave terminal",
    };

    let footer = Paragraph::new(help_text).style(Style::default().fg(MUTED));
    frame.render_widget(footer, area);
}
