//! Rendering rule for a session.
//!
//! `render_model` is a pure function of the session: it decides which blocks are
//! visible and what they contain. The terminal UI lays the blocks out with ratatui;
//! the CLI prints them through the `Display` impl.

use std::fmt;

use crate::session::Session;

/// Heading shown at the top of the view.
pub const TITLE: &str = "RAG Assistant 🤖";
/// Placeholder shown in an empty input.
pub const PLACEHOLDER: &str = "Ask your question...";
/// Label of the submit action.
pub const SUBMIT_LABEL: &str = "Ask";
/// Loading indicator text.
pub const LOADING_TEXT: &str = "⏳ Thinking...";
/// Heading of the answer block.
pub const ANSWER_HEADING: &str = "Answer:";
/// Heading of the sources block.
pub const SOURCES_HEADING: &str = "Sources:";

/// Visible blocks of the view, borrowed from the session.
///
/// The title and the form are always visible and the submit action is never
/// disabled, so they carry no flags here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewModel<'a> {
    /// Current input value
    pub question: &'a str,
    /// Show the loading indicator
    pub loading: bool,
    /// Error block text
    pub error: Option<&'a str>,
    /// Answer block text
    pub answer: Option<&'a str>,
    /// Source list, shown when non-empty
    pub sources: &'a [String],
}

impl ViewModel<'_> {
    /// Returns true if the sources block is visible.
    pub fn shows_sources(&self) -> bool {
        !self.sources.is_empty()
    }

    /// Returns the sources as display lines, numbered from 1 by position.
    pub fn numbered_sources(&self) -> Vec<String> {
        self.sources
            .iter()
            .enumerate()
            .map(|(idx, src)| format!("{}. {}", idx + 1, src))
            .collect()
    }
}

/// Computes what the view shows for `session`.
///
/// # Examples
///
/// ```
/// use knowrn::session::Session;
/// use knowrn::view::render_model;
///
/// let mut session = Session::new();
/// session.set_question("What is RAG?");
/// session.begin_submit();
///
/// let model = render_model(&session);
/// assert!(model.loading);
/// assert_eq!(model.answer, None);
/// ```
pub fn render_model(session: &Session) -> ViewModel<'_> {
    let state = session.state();
    let loading = state.is_loading();

    ViewModel {
        question: session.question(),
        loading,
        error: state.error().filter(|e| !e.is_empty()),
        answer: state
            .answer()
            .map(|a| a.text())
            .filter(|text| !loading && !text.is_empty()),
        sources: state.sources(),
    }
}

/// Plain-text rendering of the dynamic blocks, for non-interactive output.
impl fmt::Display for ViewModel<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut blocks: Vec<String> = Vec::new();

        if self.loading {
            blocks.push(LOADING_TEXT.to_string());
        }
        if let Some(error) = self.error {
            blocks.push(error.to_string());
        }
        if let Some(answer) = self.answer {
            blocks.push(format!("{ANSWER_HEADING}\n{answer}"));
        }
        if self.shows_sources() {
            blocks.push(format!(
                "{SOURCES_HEADING}\n{}",
                self.numbered_sources().join("\n")
            ));
        }

        write!(f, "{}", blocks.join("\n\n"))
    }
}
