//! Types for backend query requests and answers.

use serde::{Deserialize, Serialize};

/// Text shown when the backend answers without an answer.
pub const NO_ANSWER_FALLBACK: &str = "No answer found.";

/// Request body sent to the backend: `{"question": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryRequest {
    /// The question, sent verbatim
    pub question: String,
}

impl QueryRequest {
    /// Creates a request for the given question.
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
        }
    }
}

/// Response body returned by the backend.
///
/// Both fields are optional; the backend also echoes the question back,
/// which is accepted but not required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct QueryResponse {
    /// Generated answer text
    #[serde(default)]
    pub answer: Option<String>,
    /// Source identifiers (file names or source kinds) of the retrieved documents
    #[serde(default)]
    pub sources: Option<Vec<String>>,
    /// Question echoed by the backend
    #[serde(default)]
    pub question: Option<String>,
}

/// An answer ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    /// The answer text, never empty
    text: String,
    /// Ordered source identifiers
    sources: Vec<String>,
}

impl Answer {
    /// Creates an answer, substituting `NO_ANSWER_FALLBACK` for empty text.
    pub fn new(text: impl Into<String>, sources: Vec<String>) -> Self {
        let text = text.into();
        let text = if text.is_empty() {
            NO_ANSWER_FALLBACK.to_string()
        } else {
            text
        };
        Self { text, sources }
    }

    /// Returns the answer text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the source identifiers in backend order.
    pub fn sources(&self) -> &[String] {
        &self.sources
    }
}

impl From<QueryResponse> for Answer {
    fn from(response: QueryResponse) -> Self {
        Self::new(
            response.answer.unwrap_or_default(),
            response.sources.unwrap_or_default(),
        )
    }
}
