//! Keyboard event handling for the TUI.
//!
//! Maps crossterm keyboard events to application state changes. The input box
//! always has focus, so printable keys edit the question.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::app::App;

/// Lines scrolled by PageUp / PageDown.
const PAGE: u16 = 10;

/// Handles a keyboard event and updates the app state accordingly.
///
/// Returns `true` if the application should quit, `false` otherwise.
///
/// # Event Handling
///
/// - `Esc` / `Ctrl+C`: Quit application
/// - `Enter`: Submit the question (ignored when empty)
/// - Characters / `Backspace`: Edit the question
/// - `Up` / `Down`, `PageUp` / `PageDown`: Scroll the answer
/// - `Shift+Up` / `Shift+Down`: Scroll the source list
///
/// # Examples
///
/// ```
/// use knowrn::tui::{App, event::handle_key_event};
/// use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
///
/// let mut app = App::new();
/// let key = KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE);
/// let should_quit = handle_key_event(&mut app, key);
/// assert!(should_quit);
/// ```
pub fn handle_key_event(app: &mut App, key: KeyEvent) -> bool {
    if key.code == KeyCode::Esc {
        return true;
    }
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    match key.code {
        KeyCode::Enter => app.submit(),
        KeyCode::Char(c) if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT => {
            app.push_question_char(c);
        }
        KeyCode::Backspace => app.pop_question_char(),
        KeyCode::Down if key.modifiers.contains(KeyModifiers::SHIFT) => {
            app.scroll_sources_down(1);
        }
        KeyCode::Up if key.modifiers.contains(KeyModifiers::SHIFT) => {
            app.scroll_sources_up(1);
        }
        KeyCode::Down => app.scroll_answer_down(1),
        KeyCode::Up => app.scroll_answer_up(1),
        KeyCode::PageDown => app.scroll_answer_down(PAGE),
        KeyCode::PageUp => app.scroll_answer_up(PAGE),
        _ => {
            // Ignore other keys
        }
    }

    false
}
