//! Wire types for the backend query service and the normalized answer.
//!
//! The backend returns a loosely-shaped JSON object; this module turns it into
//! an `Answer` with the fallback text and empty-source rules applied.

mod types;

pub use types::{Answer, NO_ANSWER_FALLBACK, QueryRequest, QueryResponse};
