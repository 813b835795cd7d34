use crate::session::{Session, Ticket};
use crate::view::{ViewModel, render_model};

/// Application state for the TUI.
///
/// Wraps the question/answer session with the bits only a terminal needs:
/// answer scrolling and the queue of submitted tickets waiting to be dispatched.
#[derive(Debug, Default)]
pub struct App {
    /// Question and view state
    session: Session,
    /// Scroll offset of the answer panel
    answer_scroll: u16,
    /// First visible row of the source list
    sources_scroll: usize,
    /// Submitted tickets not yet handed to the dispatcher
    outbox: Vec<Ticket>,
}

impl App {
    /// Creates a new App with an empty question and nothing asked yet.
    ///
    /// # Examples
    ///
    /// ```
    /// use knowrn::tui::App;
    ///
    /// let app = App::new();
    /// assert_eq!(app.session().question(), "");
    /// assert!(!app.view().loading);
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the underlying session.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Returns the underlying session for applying completions.
    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Returns what the view should show right now.
    pub fn view(&self) -> ViewModel<'_> {
        render_model(&self.session)
    }

    /// Adds a character to the question.
    pub fn push_question_char(&mut self, c: char) {
        self.session.push_char(c);
    }

    /// Removes the last character of the question (Backspace).
    pub fn pop_question_char(&mut self) {
        self.session.pop_char();
    }

    /// Submits the current question (Enter).
    ///
    /// Empty questions are ignored. The submit stays available while a request is
    /// in flight; the newer request supersedes the older one.
    ///
    /// # Examples
    ///
    /// ```
    /// use knowrn::tui::App;
    ///
    /// let mut app = App::new();
    /// app.submit();
    /// assert!(app.take_outbox().is_empty());
    ///
    /// app.push_question_char('?');
    /// app.submit();
    /// assert_eq!(app.take_outbox().len(), 1);
    /// assert!(app.view().loading);
    /// ```
    pub fn submit(&mut self) {
        if let Some(ticket) = self.session.begin_submit() {
            self.answer_scroll = 0;
            self.sources_scroll = 0;
            self.outbox.push(ticket);
        }
    }

    /// Takes the tickets submitted since the last call.
    pub fn take_outbox(&mut self) -> Vec<Ticket> {
        std::mem::take(&mut self.outbox)
    }

    /// Returns the answer panel scroll offset.
    pub fn answer_scroll(&self) -> u16 {
        self.answer_scroll
    }

    /// Scrolls the answer panel down by the specified amount.
    pub fn scroll_answer_down(&mut self, amount: u16) {
        self.answer_scroll = self.answer_scroll.saturating_add(amount);
    }

    /// Scrolls the answer panel up by the specified amount.
    pub fn scroll_answer_up(&mut self, amount: u16) {
        self.answer_scroll = self.answer_scroll.saturating_sub(amount);
    }

    /// Returns the first visible row of the source list.
    pub fn sources_scroll(&self) -> usize {
        self.sources_scroll
    }

    /// Scrolls the source list down, stopping at the last source.
    pub fn scroll_sources_down(&mut self, amount: usize) {
        let last = self.session.state().sources().len().saturating_sub(1);
        self.sources_scroll = self.sources_scroll.saturating_add(amount).min(last);
    }

    /// Scrolls the source list up by the specified amount.
    pub fn scroll_sources_up(&mut self, amount: usize) {
        self.sources_scroll = self.sources_scroll.saturating_sub(amount);
    }

    /// Tears the view down; responses still in flight will be ignored.
    pub fn close(&mut self) {
        self.session.close();
        self.outbox.clear();
    }
}
