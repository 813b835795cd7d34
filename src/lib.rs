pub mod answer;
pub mod backend;
pub mod cli;
pub mod commands;
pub mod session;
pub mod tui;
pub mod utils;
pub mod view;

pub use answer::{Answer, NO_ANSWER_FALLBACK, QueryRequest, QueryResponse};
pub use backend::{BackendClient, BackendClientBuilder, BackendError, QueryTransport};
pub use session::{Dispatcher, FAILURE_MESSAGE, RequestId, Session, Ticket, ViewState};
pub use view::{ViewModel, render_model};
