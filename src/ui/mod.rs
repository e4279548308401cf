//! # UI Module
//!
//! The terminal interface of the transcript panel.
//!
//! ## Components
//!
//! - [`App`] - Panel state (blocks, toolbars, selection, apply sequence)
//! - [`mod@render`] - Rendering functions for drawing the TUI
//! - [`terminal_widget`] - vt100 screen widget for the terminal pane
//!
//! ## Layout
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                    Header                       │
//! ├─────────────────────────┬───────────────────────┤
//! │                         │     Current File      │
//! │   Code Blocks           │     (preview)         │
//! │   (toolbar + code)      ├───────────────────────┤
//! │                         │     Terminal          │
//! │                         │  (Run in terminal)    │
//! ├─────────────────────────┴───────────────────────┤
//! │               Footer / status                   │
//! └─────────────────────────────────────────────────┘
//! ```

pub mod app;
pub mod render;
pub mod terminal_widget;

pub use app::App;
pub use render::render;
