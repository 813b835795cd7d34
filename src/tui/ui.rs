//! UI rendering functions for the TUI.
//!
//! Lays out the title, the question input, the status line (loader or error),
//! the answer panel and the sources list using ratatui widgets. Which blocks are
//! visible is decided by `view::render_model`; this module only places them.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};

use super::app::App;
use crate::view::{
    ANSWER_HEADING, LOADING_TEXT, PLACEHOLDER, SOURCES_HEADING, SUBMIT_LABEL, TITLE, ViewModel,
};

/// Rows taken by everything except the answer and sources panels.
const FIXED_ROWS: u16 = 6;

/// The answer panel never shrinks below this.
const MIN_ANSWER_ROWS: u16 = 3;

/// Main rendering function for the TUI.
///
/// # Arguments
///
/// * `frame` - The ratatui Frame to render into
/// * `app` - The application state
pub fn draw(frame: &mut Frame, app: &App) {
    let view = app.view();

    // The source list takes the rows it needs, up to what the answer panel leaves free.
    let sources_height = if view.shows_sources() {
        let wanted = u16::try_from(view.sources.len())
            .unwrap_or(u16::MAX)
            .saturating_add(2);
        let free = frame
            .area()
            .height
            .saturating_sub(FIXED_ROWS + MIN_ANSWER_ROWS);
        wanted.min(free.max(3))
    } else {
        0
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),              // Title
            Constraint::Length(3),              // Question input
            Constraint::Length(1),              // Loader / error
            Constraint::Min(MIN_ANSWER_ROWS),   // Answer
            Constraint::Length(sources_height), // Sources
            Constraint::Length(1),              // Shortcut bar
        ])
        .split(frame.area());

    render_title(frame, chunks[0]);
    render_input(frame, &view, chunks[1]);
    render_status(frame, &view, chunks[2]);
    if let Some(answer) = view.answer {
        render_answer(frame, answer, app.answer_scroll(), chunks[3]);
    }
    if view.shows_sources() {
        render_sources(frame, &view, app.sources_scroll(), chunks[4]);
    }
    render_shortcut_bar(frame, chunks[5]);
}

fn render_title(frame: &mut Frame, area: Rect) {
    let title = Paragraph::new(Line::from(Span::styled(
        TITLE,
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )));
    frame.render_widget(title, area);
}

/// Returns the longest suffix of `text` that fits in `max_width` columns.
fn visible_tail(text: &str, max_width: usize) -> &str {
    let mut width = 0;
    let mut start = text.len();
    for (i, c) in text.char_indices().rev() {
        let w = Span::raw(&text[i..i + c.len_utf8()]).width();
        if width + w > max_width {
            break;
        }
        width += w;
        start = i;
    }
    &text[start..]
}

/// Renders the question input with a cursor, or the placeholder when empty.
///
/// A question wider than the box shows its tail so the cursor stays visible.
fn render_input(frame: &mut Frame, view: &ViewModel<'_>, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Question")
        .title_bottom(Line::from(format!(" Enter: {SUBMIT_LABEL} ")).right_aligned())
        .border_style(Style::default().fg(Color::Cyan));

    let line = if view.question.is_empty() {
        Line::from(vec![
            Span::raw("█"),
            Span::styled(PLACEHOLDER, Style::default().fg(Color::DarkGray)),
        ])
    } else {
        // Two border columns plus one for the cursor.
        let room = usize::from(area.width.saturating_sub(3));
        Line::from(format!("{}█", visible_tail(view.question, room)))
    };

    frame.render_widget(Paragraph::new(line).block(block), area);
}

/// Renders the loading indicator and the error message.
///
/// Both are driven independently by the view; at most one is set at a time.
fn render_status(frame: &mut Frame, view: &ViewModel<'_>, area: Rect) {
    let mut spans = Vec::new();
    if view.loading {
        spans.push(Span::styled(LOADING_TEXT, Style::default().fg(Color::Yellow)));
    }
    if let Some(error) = view.error {
        spans.push(Span::styled(
            error.to_string(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Renders the answer as markdown inside a scrollable panel.
fn render_answer(frame: &mut Frame, answer: &str, scroll: u16, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(ANSWER_HEADING);
    let paragraph = Paragraph::new(tui_markdown::from_str(answer))
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));

    frame.render_widget(paragraph, area);
}

/// Renders the ordered source list, numbered by position.
///
/// When the list is taller than its panel, the title shows which rows are in view
/// and `scroll` picks the first one.
fn render_sources(frame: &mut Frame, view: &ViewModel<'_>, scroll: usize, area: Rect) {
    let total = view.sources.len();
    let rows = usize::from(area.height.saturating_sub(2));
    let first = scroll.min(total.saturating_sub(rows));
    let last = (first + rows).min(total);

    let title = if last - first < total {
        format!("{SOURCES_HEADING} {}-{last} of {total} (Shift+↑/↓)", first + 1)
    } else {
        SOURCES_HEADING.to_string()
    };
    let block = Block::default().borders(Borders::ALL).title(title);

    let items: Vec<ListItem> = view
        .numbered_sources()
        .into_iter()
        .skip(first)
        .take(rows)
        .map(|line| ListItem::new(Line::from(line)))
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}

/// Renders the shortcut bar at the bottom of the screen.
fn render_shortcut_bar(frame: &mut Frame, area: Rect) {
    let key_style = Style::default().fg(Color::Cyan);
    let sep_style = Style::default().fg(Color::DarkGray);

    let spans = vec![
        Span::styled("Enter", key_style),
        Span::raw(": ask"),
        Span::styled(" | ", sep_style),
        Span::styled("↑/↓ PgUp/PgDn", key_style),
        Span::raw(": scroll answer"),
        Span::styled(" | ", sep_style),
        Span::styled("Shift+↑/↓", key_style),
        Span::raw(": sources"),
        Span::styled(" | ", sep_style),
        Span::styled("Esc", key_style),
        Span::raw(": quit"),
    ];

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
