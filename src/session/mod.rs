//! Question/answer session state.
//!
//! A `Session` owns the question being edited and a single `ViewState` describing
//! what the answer area shows. Every submit issues a new `RequestId`; only the
//! completion carrying the latest id is applied, so a slow response can never
//! overwrite a newer one, and nothing is applied after `close()`.

use std::fmt;

use tracing::{debug, error};

use crate::answer::{Answer, QueryResponse};
use crate::backend::{BackendError, QueryTransport};

mod dispatch;

pub use dispatch::{Completion, Dispatcher};

/// The one message users see for any backend failure.
pub const FAILURE_MESSAGE: &str = "❌ Failed to connect to backend. Please try again.";

/// Sequence number of a submitted question within one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

impl RequestId {
    /// Returns the raw sequence number.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A submitted question waiting to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    id: RequestId,
    question: String,
}

impl Ticket {
    /// Returns the request id the completion must carry.
    pub fn id(&self) -> RequestId {
        self.id
    }

    /// Returns the question to send.
    pub fn question(&self) -> &str {
        &self.question
    }
}

/// What the answer area currently shows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ViewState {
    /// Nothing asked yet
    #[default]
    Idle,
    /// A request is in flight
    Loading,
    /// The latest request succeeded
    Success(Answer),
    /// The latest request failed
    Failure { message: String },
}

impl ViewState {
    /// Returns true while a request is in flight.
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Returns the answer, if the latest request succeeded.
    pub fn answer(&self) -> Option<&Answer> {
        match self {
            Self::Success(answer) => Some(answer),
            _ => None,
        }
    }

    /// Returns the source list; empty unless the latest request succeeded.
    pub fn sources(&self) -> &[String] {
        match self {
            Self::Success(answer) => answer.sources(),
            _ => &[],
        }
    }

    /// Returns the user-facing error message, if the latest request failed.
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failure { message } => Some(message),
            _ => None,
        }
    }
}

/// State of one question/answer view.
#[derive(Debug, Clone, Default)]
pub struct Session {
    question: String,
    state: ViewState,
    /// Last issued sequence number; 0 means none issued yet
    latest: u64,
    closed: bool,
}

impl Session {
    /// Creates an idle session with an empty question.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the question being edited.
    pub fn question(&self) -> &str {
        &self.question
    }

    /// Returns the current view state.
    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Returns the id of the most recent submit, if any.
    pub fn latest_request(&self) -> Option<RequestId> {
        (self.latest > 0).then_some(RequestId(self.latest))
    }

    /// Replaces the question.
    pub fn set_question(&mut self, question: impl Into<String>) {
        self.question = question.into();
    }

    /// Appends a character to the question.
    pub fn push_char(&mut self, c: char) {
        self.question.push(c);
    }

    /// Removes the last character of the question.
    pub fn pop_char(&mut self) {
        self.question.pop();
    }

    /// Starts a submit.
    ///
    /// Returns `None` without touching the state when the question is empty or the
    /// session is closed. Otherwise the state becomes `Loading`, clearing any previous
    /// answer, sources or error, and a ticket with a fresh id is returned.
    ///
    /// A submit while another is in flight is allowed; the earlier one becomes stale.
    ///
    /// # Examples
    ///
    /// ```
    /// use knowrn::session::{Session, ViewState};
    ///
    /// let mut session = Session::new();
    /// assert!(session.begin_submit().is_none());
    ///
    /// session.set_question("What is RAG?");
    /// let ticket = session.begin_submit().unwrap();
    /// assert_eq!(ticket.question(), "What is RAG?");
    /// assert_eq!(session.state(), &ViewState::Loading);
    /// ```
    pub fn begin_submit(&mut self) -> Option<Ticket> {
        if self.closed || self.question.is_empty() {
            return None;
        }

        if self.state.is_loading() {
            debug!(superseded = self.latest, "submit while a request is in flight");
        }

        self.latest += 1;
        self.state = ViewState::Loading;

        Some(Ticket {
            id: RequestId(self.latest),
            question: self.question.clone(),
        })
    }

    /// Applies the outcome of a request.
    ///
    /// Returns `false` and leaves the state untouched if `id` is not the latest
    /// submit or the session is closed. On failure the cause is logged and the
    /// state shows `FAILURE_MESSAGE`.
    pub fn complete(
        &mut self,
        id: RequestId,
        result: Result<QueryResponse, BackendError>,
    ) -> bool {
        if self.closed || id.0 != self.latest {
            debug!(request = %id, latest = self.latest, "discarding stale response");
            return false;
        }

        self.state = match result {
            Ok(response) => {
                let answer = Answer::from(response);
                debug!(request = %id, sources = answer.sources().len(), "answer received");
                ViewState::Success(answer)
            }
            Err(e) => {
                error!(request = %id, error = %e, "query failed");
                ViewState::Failure {
                    message: FAILURE_MESSAGE.to_string(),
                }
            }
        };
        true
    }

    /// Submits the question and waits for `transport` to answer.
    ///
    /// Returns the request id, or `None` if nothing was submitted.
    pub fn submit_with(&mut self, transport: &dyn QueryTransport) -> Option<RequestId> {
        let ticket = self.begin_submit()?;
        let result = transport.query(ticket.question());
        self.complete(ticket.id(), result);
        Some(ticket.id())
    }

    /// Closes the session; in-flight requests will no longer be applied.
    pub fn close(&mut self) {
        self.closed = true;
        self.latest += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answer::NO_ANSWER_FALLBACK;

    fn response(answer: &str, sources: &[&str]) -> QueryResponse {
        QueryResponse {
            answer: Some(answer.to_string()),
            sources: Some(sources.iter().map(|s| s.to_string()).collect()),
            question: None,
        }
    }

    #[test]
    fn new_session_is_idle() {
        let session = Session::new();
        assert_eq!(session.question(), "");
        assert_eq!(session.state(), &ViewState::Idle);
        assert_eq!(session.latest_request(), None);
    }

    #[test]
    fn editing_the_question() {
        let mut session = Session::new();
        session.push_char('h');
        session.push_char('i');
        assert_eq!(session.question(), "hi");
        session.pop_char();
        assert_eq!(session.question(), "h");
        session.set_question("replaced");
        assert_eq!(session.question(), "replaced");
    }

    #[test]
    fn empty_question_is_not_submitted() {
        let mut session = Session::new();
        assert!(session.begin_submit().is_none());
        assert_eq!(session.state(), &ViewState::Idle);
        assert_eq!(session.latest_request(), None);
    }

    #[test]
    fn whitespace_question_is_submitted_verbatim() {
        let mut session = Session::new();
        session.set_question("   \t");

        let ticket = session.begin_submit().unwrap();
        assert_eq!(ticket.question(), "   \t");
        assert!(session.state().is_loading());
    }

    #[test]
    fn submit_enters_loading_and_keeps_question() {
        let mut session = Session::new();
        session.set_question("Who is Nishant?");

        let ticket = session.begin_submit().unwrap();
        assert_eq!(ticket.question(), "Who is Nishant?");
        assert!(session.state().is_loading());
        assert_eq!(session.question(), "Who is Nishant?");
        assert_eq!(session.latest_request(), Some(ticket.id()));
    }

    #[test]
    fn successful_completion_shows_answer_and_sources() {
        let mut session = Session::new();
        session.set_question("q");
        let ticket = session.begin_submit().unwrap();

        assert!(session.complete(ticket.id(), Ok(response("X", &["a", "b"]))));

        let answer = session.state().answer().unwrap();
        assert_eq!(answer.text(), "X");
        assert_eq!(session.state().sources(), ["a", "b"]);
        assert!(!session.state().is_loading());
        assert_eq!(session.state().error(), None);
    }

    #[test]
    fn empty_answer_uses_fallback() {
        let mut session = Session::new();
        session.set_question("q");
        let ticket = session.begin_submit().unwrap();

        session.complete(ticket.id(), Ok(QueryResponse::default()));
        assert_eq!(session.state().answer().unwrap().text(), NO_ANSWER_FALLBACK);
        assert!(session.state().sources().is_empty());
    }

    #[test]
    fn failure_shows_fixed_message_only() {
        let mut session = Session::new();
        session.set_question("q");
        let ticket = session.begin_submit().unwrap();

        session.complete(ticket.id(), Err(BackendError::Http { status: 500 }));

        assert_eq!(session.state().error(), Some(FAILURE_MESSAGE));
        assert!(session.state().answer().is_none());
        assert!(session.state().sources().is_empty());
        assert!(!session.state().is_loading());
    }

    #[test]
    fn new_submit_clears_previous_answer_and_error() {
        let mut session = Session::new();
        session.set_question("q");

        let first = session.begin_submit().unwrap();
        session.complete(first.id(), Ok(response("X", &["a"])));

        session.begin_submit().unwrap();
        assert_eq!(session.state(), &ViewState::Loading);
        assert!(session.state().sources().is_empty());

        let third = session.begin_submit().unwrap();
        session.complete(third.id(), Err(BackendError::Http { status: 502 }));
        let fourth = session.begin_submit().unwrap();
        assert_eq!(session.state().error(), None);
        assert!(fourth.id() > third.id());
    }

    #[test]
    fn stale_completion_is_discarded() {
        let mut session = Session::new();
        session.set_question("first");
        let first = session.begin_submit().unwrap();
        session.set_question("second");
        let second = session.begin_submit().unwrap();

        // Second resolves first, then the slow first response arrives.
        assert!(session.complete(second.id(), Ok(response("second answer", &[]))));
        assert!(!session.complete(first.id(), Ok(response("first answer", &["old"]))));

        assert_eq!(session.state().answer().unwrap().text(), "second answer");
        assert!(session.state().sources().is_empty());
    }

    #[test]
    fn stale_completion_does_not_end_loading() {
        let mut session = Session::new();
        session.set_question("q");
        let first = session.begin_submit().unwrap();
        let _second = session.begin_submit().unwrap();

        assert!(!session.complete(first.id(), Err(BackendError::Http { status: 500 })));
        assert!(session.state().is_loading());
    }

    #[test]
    fn closed_session_ignores_completions_and_submits() {
        let mut session = Session::new();
        session.set_question("q");
        let ticket = session.begin_submit().unwrap();

        session.close();
        assert!(session.closed);
        assert!(!session.complete(ticket.id(), Ok(response("late", &[]))));
        assert!(session.begin_submit().is_none());
    }

    #[test]
    fn submit_with_runs_transport_once() {
        use std::sync::Mutex;

        struct Recording(Mutex<Vec<String>>);

        impl QueryTransport for Recording {
            fn query(&self, question: &str) -> Result<QueryResponse, BackendError> {
                self.0.lock().unwrap().push(question.to_string());
                Ok(QueryResponse {
                    answer: Some("42".to_string()),
                    ..QueryResponse::default()
                })
            }
        }

        let transport = Recording(Mutex::new(Vec::new()));
        let mut session = Session::new();
        session.set_question("meaning of life");

        let id = session.submit_with(&transport);
        assert_eq!(id, session.latest_request());
        assert_eq!(*transport.0.lock().unwrap(), vec!["meaning of life"]);
        assert_eq!(session.state().answer().unwrap().text(), "42");
    }

    #[test]
    fn request_id_display() {
        assert_eq!(RequestId(7).to_string(), "#7");
        assert_eq!(RequestId(7).get(), 7);
    }
}
