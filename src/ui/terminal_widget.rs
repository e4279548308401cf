//! # Embedded Terminal Widget
//!
//! Renders the vt100 screen of a "Run in terminal" command into the
//! terminal pane, keeping colors and text attributes.
//!
//! `scroll_offset` counts rows back from the bottom (0 = live output) and
//! maps directly onto vt100's `set_scrollback`.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::Widget,
};
use std::sync::{Arc, Mutex};

fn to_color(color: vt100::Color) -> Option<Color> {
    match color {
        vt100::Color::Default => None,
        vt100::Color::Idx(idx) => Some(Color::Indexed(idx)),
        vt100::Color::Rgb(r, g, b) => Some(Color::Rgb(r, g, b)),
    }
}

fn cell_style(cell: &vt100::Cell) -> Style {
    let mut style = Style::default();
    if let Some(fg) = to_color(cell.fgcolor()) {
        style = style.fg(fg);
    }
    if let Some(bg) = to_color(cell.bgcolor()) {
        style = style.bg(bg);
    }
    let attrs = [
        (cell.bold(), Modifier::BOLD),
        (cell.italic(), Modifier::ITALIC),
        (cell.underline(), Modifier::UNDERLINED),
        (cell.inverse(), Modifier::REVERSED),
    ];
    for (on, modifier) in attrs {
        if on {
            style = style.add_modifier(modifier);
        }
    }
    style
}

pub struct TerminalView<'a> {
    parser: &'a Arc<Mutex<vt100::Parser>>,
    scroll_offset: usize,
}

impl<'a> TerminalView<'a> {
    pub fn new(parser: &'a Arc<Mutex<vt100::Parser>>) -> Self {
        Self {
            parser,
            scroll_offset: 0,
        }
    }

    pub fn scroll_offset(mut self, offset: usize) -> Self {
        self.scroll_offset = offset;
        self
    }
}

impl Widget for TerminalView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let Ok(mut parser) = self.parser.lock() else {
            return;
        };

        let original_scrollback = parser.screen().scrollback();
        parser.screen_mut().set_scrollback(self.scroll_offset);

        {
            let screen = parser.screen();
            let (rows, cols) = screen.size();
            for y in 0..area.height.min(rows) {
                for x in 0..area.width.min(cols) {
                    if let Some(cell) = screen.cell(y, x) {
                        let contents = cell.contents();
                        let ch = if contents.is_empty() { " " } else { contents };
                        buf.set_string(area.x + x, area.y + y, ch, cell_style(cell));
                    }
                }
            }
        }

        parser.screen_mut().set_scrollback(original_scrollback);
    }
}

/// Number of history rows available above the live screen.
pub fn max_scrollback(parser: &Arc<Mutex<vt100::Parser>>) -> usize {
    let Ok(mut parser) = parser.lock() else {
        return 0;
    };
    let original = parser.screen().scrollback();
    parser.screen_mut().set_scrollback(usize::MAX);
    let max = parser.screen().scrollback();
    parser.screen_mut().set_scrollback(original);
    max
}
