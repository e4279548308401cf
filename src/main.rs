//! # Blockbar CLI Entry Point
//!
//! Opens a chat transcript (Markdown) and shows every fenced code block with
//! a toolbar to copy it, apply it to the open file, or run it in a terminal.
//!
//! ## Usage
//!
//! ```bash
//! # Browse the code blocks of a transcript
//! blockbar chat.md
//!
//! # Resolve filenames against a project and open a file to apply into
//! blockbar chat.md --workspace ~/src/app --open src/main.rs
//!
//! # Host without native clipboard: copy via OSC 52, no action button
//! blockbar chat.md --host-variant mediated
//!
//! # Print how each block is classified and exit
//! blockbar chat.md --debug
//! ```
//!
//! ## Key Bindings
//!
//! - `j` / `k` - Select next / previous code block
//! - `y` - Copy the selected block
//! - `Enter` / `a` - Apply the block, or run it when it is a shell command
//! - `o` - Open the block's file
//! - `Ctrl+a` - Apply the next block in the conversation
//! - `Tab` - Switch pane; keys typed in the terminal pane go to the command
//! - `q` - Quit
//!
//! Logs are written to `blockbar.log` in the platform data directory; set
//! `RUST_LOG` or pass `-v` to raise the level.

use blockbar::classify::is_terminal_code_block;
use blockbar::config::{Config, HostVariant};
use blockbar::host::{LocalHost, SystemClipboard};
use blockbar::transcript;
use blockbar::ui::{self, app::FocusPane, terminal_widget::max_scrollback, App};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::fs::{self, File};
use std::io;
use std::panic;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Rows moved per PageUp/PageDown in the terminal pane.
const TERMINAL_SCROLL_PAGE: usize = 10;

/// Trait for reading terminal events (allows dependency injection for testing)
trait EventReader {
    fn read_event(&mut self, timeout: Duration) -> Result<Option<Event>>;
}

/// Production event reader that uses crossterm's event polling + read
struct CrosstermEventReader;

impl EventReader for CrosstermEventReader {
    fn read_event(&mut self, timeout: Duration) -> Result<Option<Event>> {
        if event::poll(timeout).context("Failed to poll for events")? {
            Ok(Some(
                event::read().context("Failed to read keyboard event")?,
            ))
        } else {
            Ok(None)
        }
    }
}

/// Blockbar - copy, apply, or run the code blocks of a chat transcript
#[derive(Parser, Debug)]
#[command(name = "blockbar")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Copy, apply, or run the code blocks of a chat transcript", long_about = None)]
struct Args {
    /// Markdown transcript to read code blocks from
    #[arg(value_name = "TRANSCRIPT")]
    transcript: PathBuf,

    /// Directory that block filenames and commands are relative to
    #[arg(short, long, value_name = "DIR")]
    workspace: Option<PathBuf>,

    /// File to open as the apply target on startup
    #[arg(short, long, value_name = "FILE")]
    open: Option<String>,

    /// Host environment (overrides the config file)
    #[arg(long, value_enum)]
    host_variant: Option<HostVariant>,

    /// How long Copied / Applying... stays visible, in milliseconds
    #[arg(long, value_name = "MS")]
    feedback_ms: Option<u64>,

    /// Draw toolbars under the code instead of above it
    #[arg(long)]
    toolbar_bottom: bool,

    /// Config file to use instead of the default location
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print how each code block is classified and exit
    #[arg(long)]
    debug: bool,

    /// Verbose logging (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.verbose);

    // Restore the terminal if anything panics while the TUI is up
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let result = run_application(args).await;

    let _ = panic::take_hook();

    result
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    // The TUI owns stdout, so logs only go to a file
    let Some(file) = Config::data_dir().ok().and_then(|dir| open_log_file(&dir)) else {
        return;
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(false),
        )
        .with(filter)
        .init();
}

fn open_log_file(dir: &Path) -> Option<File> {
    fs::create_dir_all(dir).ok()?;
    File::options()
        .create(true)
        .append(true)
        .open(dir.join("blockbar.log"))
        .ok()
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load(),
    };
    if let Some(variant) = args.host_variant {
        config.host_variant = variant;
    }
    if let Some(ms) = args.feedback_ms {
        config.feedback_ms = ms;
    }
    Ok(config)
}

async fn run_application(args: Args) -> Result<()> {
    let config = load_config(&args)?;

    let blocks = transcript::load_transcript(&args.transcript)?;
    tracing::info!(
        transcript = %args.transcript.display(),
        blocks = blocks.len(),
        "loaded transcript"
    );

    if args.debug {
        println!("=== Code Blocks ===");
        for block in &blocks {
            let kind = if is_terminal_code_block(block.language.as_deref(), &block.text) {
                "terminal"
            } else {
                "file"
            };
            println!(
                "  #{} language={} filename={} kind={}",
                block.index + 1,
                block.language.as_deref().unwrap_or("-"),
                block.filename.as_deref().unwrap_or("-"),
                kind
            );
        }
        return Ok(());
    }

    let workspace = match &args.workspace {
        Some(dir) => dir
            .canonicalize()
            .with_context(|| format!("Failed to access directory: {}", dir.display()))?,
        None => std::env::current_dir().context("Failed to get current working directory")?,
    };

    let mut host = LocalHost::new(workspace, config.shell.clone());
    if let Some(file) = &args.open {
        host.open_file(file)
            .with_context(|| format!("Failed to open file: {}", file))?;
    }
    let mut clipboard = SystemClipboard::new();

    let title = args
        .transcript
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("Transcript")
        .to_string();
    let mut app = App::new(
        title,
        blocks,
        config.capabilities(),
        config.feedback_window(),
        args.toolbar_bottom,
    );

    enable_raw_mode().context("Failed to enable raw mode for terminal")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to setup terminal")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    let mut event_reader = CrosstermEventReader;
    let result = run_app(
        &mut terminal,
        &mut app,
        &mut host,
        &mut clipboard,
        &mut event_reader,
    );

    cleanup_terminal(&mut terminal)?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    host: &mut LocalHost,
    clipboard: &mut SystemClipboard,
    event_reader: &mut dyn EventReader,
) -> Result<()> {
    loop {
        let now = Instant::now();
        app.tick(now);

        let size = terminal.size().context("Failed to read terminal size")?;
        let (cols, rows) = ui::render::terminal_pane_size(size.width, size.height);
        host.set_terminal_size(cols, rows);

        terminal
            .draw(|f| ui::render(f, app, host, now))
            .context("Failed to draw terminal UI")?;

        // Poll faster while a command is producing output
        let running = host
            .terminal()
            .is_some_and(|t| !t.poll_status().is_finished());
        let poll_timeout = if running {
            Duration::from_millis(16)
        } else {
            Duration::from_millis(100)
        };

        let Some(event) = event_reader.read_event(poll_timeout)? else {
            continue;
        };

        let Event::Key(key) = event else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        app.status = None;

        if app.focus == FocusPane::Terminal && !matches!(key.code, KeyCode::Esc | KeyCode::Tab) {
            if let Some(handle) = host.terminal() {
                match key.code {
                    KeyCode::PageUp => {
                        let max = max_scrollback(&handle.parser);
                        app.scroll_terminal_up(TERMINAL_SCROLL_PAGE, max);
                        continue;
                    }
                    KeyCode::PageDown => {
                        app.scroll_terminal_down(TERMINAL_SCROLL_PAGE);
                        continue;
                    }
                    _ => app.reset_terminal_scroll(),
                }
            }
            if let (Some(handle), Some(bytes)) = (host.terminal(), key_to_bytes(key)) {
                if let Err(e) = handle.write_input(&bytes) {
                    tracing::warn!("Failed to forward input to terminal: {:#}", e);
                }
            }
            continue;
        }

        let has_terminal = host.terminal().is_some();
        app.handle_key(key, Instant::now(), has_terminal, host, clipboard);

        if app.should_quit {
            return Ok(());
        }
    }
}

/// Bytes a terminal would send for a key press.
fn key_to_bytes(key: KeyEvent) -> Option<Vec<u8>> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        if let KeyCode::Char(c) = key.code {
            let upper = c.to_ascii_uppercase();
            if upper.is_ascii_uppercase() {
                return Some(vec![upper as u8 - b'A' + 1]);
            }
        }
        return None;
    }

    let bytes = match key.code {
        KeyCode::Char(c) => c.to_string().into_bytes(),
        KeyCode::Enter => vec![b'\r'],
        KeyCode::Backspace => vec![0x7f],
        KeyCode::Up => b"\x1b[A".to_vec(),
        KeyCode::Down => b"\x1b[B".to_vec(),
        KeyCode::Right => b"\x1b[C".to_vec(),
        KeyCode::Left => b"\x1b[D".to_vec(),
        _ => return None,
    };
    Some(bytes)
}

fn cleanup_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;

    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to restore terminal")?;

    terminal.show_cursor().context("Failed to show cursor")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Mock event reader for testing that returns a predetermined sequence of events
    struct MockEventReader {
        events: VecDeque<Event>,
    }

    impl EventReader for MockEventReader {
        fn read_event(&mut self, _timeout: Duration) -> Result<Option<Event>> {
            Ok(self.events.pop_front())
        }
    }

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_mock_event_reader() {
        let mut reader = MockEventReader {
            events: VecDeque::from(vec![Event::Key(key(KeyCode::Enter, KeyModifiers::empty()))]),
        };
        assert!(matches!(
            reader.read_event(Duration::from_millis(10)).unwrap(),
            Some(Event::Key(KeyEvent {
                code: KeyCode::Enter,
                ..
            }))
        ));
        assert!(reader
            .read_event(Duration::from_millis(10))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_key_to_bytes() {
        assert_eq!(
            key_to_bytes(key(KeyCode::Char('x'), KeyModifiers::empty())),
            Some(b"x".to_vec())
        );
        assert_eq!(
            key_to_bytes(key(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(vec![3])
        );
        assert_eq!(
            key_to_bytes(key(KeyCode::Enter, KeyModifiers::empty())),
            Some(vec![b'\r'])
        );
        assert_eq!(key_to_bytes(key(KeyCode::F(1), KeyModifiers::empty())), None);
    }

    #[test]
    fn test_args_parsing() {
        let args = Args::try_parse_from([
            "blockbar",
            "chat.md",
            "--host-variant",
            "mediated",
            "--feedback-ms",
            "500",
            "-vv",
        ])
        .unwrap();
        assert_eq!(args.transcript, PathBuf::from("chat.md"));
        assert_eq!(args.host_variant, Some(HostVariant::Mediated));
        assert_eq!(args.feedback_ms, Some(500));
        assert_eq!(args.verbose, 2);
        assert!(!args.toolbar_bottom);
    }

    #[test]
    fn test_args_require_transcript() {
        assert!(Args::try_parse_from(["blockbar"]).is_err());
    }

    #[test]
    fn test_cli_overrides_config() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        fs::write(&config_path, r#"{"feedback_ms": 1000}"#).unwrap();

        let args = Args::try_parse_from([
            "blockbar",
            "chat.md",
            "--config",
            config_path.to_str().unwrap(),
            "--host-variant",
            "mediated",
        ])
        .unwrap();
        let config = load_config(&args).unwrap();
        assert_eq!(config.feedback_ms, 1000);
        assert_eq!(config.host_variant, HostVariant::Mediated);
    }

    #[tokio::test]
    async fn test_run_application_missing_transcript() {
        let args = Args::try_parse_from([
            "blockbar",
            "/nonexistent/chat.md",
            "--config",
            "/nonexistent/config.json",
        ])
        .unwrap();
        let err = run_application(args).await.unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to read transcript"));
    }
}
