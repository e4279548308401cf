//! # PTY-based Terminal Runner
//!
//! Runs "Run in terminal" commands inside a pseudo-terminal so their output
//! shows up in the panel's terminal pane instead of taking over the screen.
//!
//! ## Architecture
//!
//! - `portable-pty` spawns `<shell> -c <command>` in a PTY
//! - a reader thread feeds PTY output into a `vt100` parser
//! - a waiter thread records the exit code
//! - the event loop polls [`PtyHandle`] and renders the vt100 screen

use anyhow::{Context, Result};
use portable_pty::{ChildKiller, CommandBuilder, NativePtySystem, PtySize, PtySystem};
use std::io::{Read, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Instant;

const SCROLLBACK_LINES: usize = 10_000;

/// Status of a terminal command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStatus {
    Running,
    Succeeded,
    Failed,
}

impl ExecutionStatus {
    pub fn is_finished(self) -> bool {
        self != ExecutionStatus::Running
    }
}

/// A running (or finished) terminal command.
pub struct PtyHandle {
    pub command: String,
    pub parser: Arc<Mutex<vt100::Parser>>,
    pub started_at: Instant,
    status: Arc<Mutex<ExecutionStatus>>,
    exit_code: Arc<Mutex<Option<i32>>>,
    killer: Mutex<Box<dyn ChildKiller + Send + Sync>>,
    // Keep the master alive so the PTY doesn't close prematurely
    _master: Arc<Mutex<Option<Box<dyn portable_pty::MasterPty + Send>>>>,
    writer: Arc<Mutex<Option<Box<dyn Write + Send>>>>,
}

impl PtyHandle {
    pub fn poll_status(&self) -> ExecutionStatus {
        self.status
            .lock()
            .map(|s| *s)
            .unwrap_or(ExecutionStatus::Failed)
    }

    pub fn poll_exit_code(&self) -> Option<i32> {
        self.exit_code.lock().ok().and_then(|ec| *ec)
    }

    /// Stop the command if it is still running.
    pub fn terminate(&self) {
        if self.poll_status().is_finished() {
            return;
        }
        if let Ok(mut killer) = self.killer.lock() {
            if let Err(e) = killer.kill() {
                tracing::debug!(command = %self.command, "kill failed: {}", e);
            }
        }
    }

    /// Forward keyboard input to the command's stdin.
    pub fn write_input(&self, data: &[u8]) -> Result<()> {
        if let Ok(mut writer_guard) = self.writer.lock() {
            if let Some(ref mut writer) = *writer_guard {
                writer.write_all(data).context("Failed to write to PTY")?;
                writer.flush().context("Failed to flush PTY writer")?;
            }
        }
        Ok(())
    }
}

impl Drop for PtyHandle {
    fn drop(&mut self) {
        self.terminate();
    }
}

/// Spawn `shell -c command` in a PTY of the given size, rooted at `cwd`.
pub fn spawn_shell_command(
    shell: &str,
    command: &str,
    cwd: &Path,
    cols: u16,
    rows: u16,
) -> Result<PtyHandle> {
    let pty_system = NativePtySystem::default();

    let pty_pair = pty_system
        .openpty(PtySize {
            rows,
            cols,
            pixel_width: 0,
            pixel_height: 0,
        })
        .context("Failed to open PTY")?;

    let mut cmd = CommandBuilder::new(shell);
    cmd.arg("-c");
    cmd.arg(command);
    cmd.cwd(cwd);

    let mut child = pty_pair
        .slave
        .spawn_command(cmd)
        .with_context(|| format!("Failed to spawn `{}` in PTY", shell))?;

    // Only the master side is needed for I/O
    drop(pty_pair.slave);

    let killer = Mutex::new(child.clone_killer());

    let parser = Arc::new(Mutex::new(vt100::Parser::new(rows, cols, SCROLLBACK_LINES)));
    let status = Arc::new(Mutex::new(ExecutionStatus::Running));
    let exit_code: Arc<Mutex<Option<i32>>> = Arc::new(Mutex::new(None));

    let mut reader = pty_pair
        .master
        .try_clone_reader()
        .context("Failed to clone PTY reader")?;

    let writer = pty_pair.master.take_writer().ok();
    let writer: Arc<Mutex<Option<Box<dyn Write + Send>>>> = Arc::new(Mutex::new(writer));

    let master: Arc<Mutex<Option<Box<dyn portable_pty::MasterPty + Send>>>> =
        Arc::new(Mutex::new(Some(pty_pair.master)));

    let parser_clone = Arc::clone(&parser);
    let master_clone = Arc::clone(&master);
    std::thread::spawn(move || {
        let mut buf = [0u8; 4096];
        loop {
            match reader.read(&mut buf) {
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    if let Ok(mut p) = parser_clone.lock() {
                        p.process(&buf[..n]);
                    }
                }
            }
        }
        if let Ok(mut m) = master_clone.lock() {
            m.take();
        }
    });

    let status_clone = Arc::clone(&status);
    let exit_clone = Arc::clone(&exit_code);
    std::thread::spawn(move || {
        let code = match child.wait() {
            Ok(exit_status) => i32::try_from(exit_status.exit_code()).unwrap_or(1),
            Err(_) => 1,
        };
        if let Ok(mut ec) = exit_clone.lock() {
            *ec = Some(code);
        }
        if let Ok(mut s) = status_clone.lock() {
            *s = if code == 0 {
                ExecutionStatus::Succeeded
            } else {
                ExecutionStatus::Failed
            };
        }
    });

    Ok(PtyHandle {
        command: command.to_string(),
        parser,
        started_at: Instant::now(),
        status,
        exit_code,
        killer,
        _master: master,
        writer,
    })
}
