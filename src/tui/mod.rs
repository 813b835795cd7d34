//! Terminal User Interface module for knowrn.
//!
//! Provides a single-screen TUI with a question input, loading/error line,
//! answer panel and source list, using ratatui for rendering and crossterm for
//! terminal management. Questions run on background workers so the loader stays
//! visible while the backend works.

use std::io;
use std::panic;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self as crossterm_event, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::info;

use crate::backend::QueryTransport;
use crate::session::Dispatcher;

mod app;
pub mod event;
mod ui;

pub use app::App;

/// How long to wait for input before redrawing.
const TICK: Duration = Duration::from_millis(100);

/// Initializes the terminal for TUI rendering.
///
/// Enables raw mode and enters the alternate screen.
///
/// # Errors
///
/// Returns an error if terminal initialization fails.
fn init_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).context("failed to create terminal")?;
    Ok(terminal)
}

/// Restores the terminal to its original state.
///
/// This should always be called before exiting the TUI, even in error cases,
/// to prevent terminal corruption.
///
/// # Errors
///
/// Returns an error if terminal restoration fails.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor().context("failed to show cursor")?;
    Ok(())
}

/// Minimal terminal restoration for the panic handler.
///
/// Ignores errors since we're likely already in a bad state.
fn restore_terminal_panic() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen);
}

/// Installs a panic hook that restores the terminal before panicking.
///
/// The original panic hook is preserved and called after restoration.
fn init_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        restore_terminal_panic();
        original_hook(panic_info);
    }));
}

/// Runs the main event loop for the TUI.
///
/// Exits when the user presses Esc or Ctrl+C, or an error occurs. The session is
/// closed on the way out so late responses are never applied.
///
/// # Errors
///
/// Returns an error if event polling, rendering, or terminal operations fail.
/// Terminal state is always restored, even on error.
pub fn run_event_loop(app: &mut App, dispatcher: &Dispatcher) -> Result<()> {
    let mut terminal = init_terminal()?;

    let result = run_event_loop_internal(app, dispatcher, &mut terminal);

    app.close();
    if let Err(e) = restore_terminal(&mut terminal) {
        eprintln!("Error restoring terminal: {e}");
    }

    result
}

/// Internal event loop implementation.
///
/// Each tick: apply finished requests, redraw, read at most one key, then hand
/// any newly submitted tickets to the dispatcher.
fn run_event_loop_internal(
    app: &mut App,
    dispatcher: &Dispatcher,
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
) -> Result<()> {
    loop {
        dispatcher.drain_into(app.session_mut());

        terminal.draw(|frame| {
            ui::draw(frame, app);
        })?;

        if crossterm_event::poll(TICK)?
            && let Event::Key(key) = crossterm_event::read()?
            && key.kind == KeyEventKind::Press
        {
            let should_quit = event::handle_key_event(app, key);
            if should_quit {
                break;
            }
        }

        for ticket in app.take_outbox() {
            info!(request = %ticket.id(), "submitting question");
            dispatcher.dispatch(ticket);
        }
    }

    Ok(())
}

/// Entry point for the TUI application.
///
/// # Errors
///
/// Returns an error if terminal initialization or the event loop fails.
pub fn run(transport: Arc<dyn QueryTransport>) -> Result<()> {
    init_panic_hook();

    let dispatcher = Dispatcher::new(transport);
    let mut app = App::new();

    run_event_loop(&mut app, &dispatcher).context("TUI event loop failed")?;

    Ok(())
}
