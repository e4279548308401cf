//! Blockbar - copy, apply, or run the code blocks of a chat transcript
//!
//! This library provides the code block toolbar (terminal command
//! classification, copy / apply / run actions with transient feedback), the
//! host bridge those actions go through, and the TUI that hosts them.

pub mod classify;
pub mod config;
pub mod error;
pub mod host;
pub mod sequence;
pub mod toolbar;
pub mod transcript;
pub mod ui;
