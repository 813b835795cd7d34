//! Background execution of submitted questions.
//!
//! Each ticket runs on its own worker thread; results come back over a channel and
//! are applied to the session by the UI loop, which keeps the loading state visible
//! while the backend works.

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use super::{RequestId, Session, Ticket};
use crate::answer::QueryResponse;
use crate::backend::{BackendError, QueryTransport};

/// Outcome of one dispatched request.
#[derive(Debug)]
pub struct Completion {
    /// Id of the ticket this completes
    pub id: RequestId,
    /// Backend response or the error that prevented one
    pub result: Result<QueryResponse, BackendError>,
}

/// Runs tickets against a transport off the UI thread.
///
/// Dropping the dispatcher drops the receiving end of the channel, so workers that
/// finish afterwards have nowhere to deliver and their results are lost.
pub struct Dispatcher {
    transport: Arc<dyn QueryTransport>,
    tx: Sender<Completion>,
    rx: Receiver<Completion>,
}

impl Dispatcher {
    /// Creates a dispatcher for the given transport.
    pub fn new(transport: Arc<dyn QueryTransport>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self { transport, tx, rx }
    }

    /// Sends the ticket's question on a new worker thread.
    ///
    /// If the worker cannot be spawned, a failed completion is queued instead.
    pub fn dispatch(&self, ticket: Ticket) {
        let id = ticket.id();
        let transport = Arc::clone(&self.transport);
        let tx = self.tx.clone();

        let spawned = thread::Builder::new()
            .name(format!("knowrn-query-{}", id.get()))
            .spawn(move || {
                let result = transport.query(ticket.question());
                if tx.send(Completion { id, result }).is_err() {
                    debug!(request = %id, "dispatcher gone, dropping response");
                }
            });

        if let Err(e) = spawned {
            warn!(request = %id, error = %e, "failed to spawn query worker");
            // The receiver lives in `self`, so this send cannot fail.
            let _ = self.tx.send(Completion {
                id,
                result: Err(BackendError::Worker(e)),
            });
        }
    }

    /// Returns the next finished request without blocking.
    fn try_next(&self) -> Option<Completion> {
        self.rx.try_recv().ok()
    }

    /// Applies every finished request to `session`.
    ///
    /// Returns how many completions changed the session; stale ones are dropped.
    pub fn drain_into(&self, session: &mut Session) -> usize {
        let mut applied = 0;
        while let Some(completion) = self.try_next() {
            if session.complete(completion.id, completion.result) {
                applied += 1;
            }
        }
        applied
    }

    /// Waits up to `timeout` for one completion and applies it to `session`.
    ///
    /// Returns `true` if a completion arrived (whether or not it was stale).
    pub fn wait_into(&self, session: &mut Session, timeout: Duration) -> bool {
        match self.rx.recv_timeout(timeout) {
            Ok(completion) => {
                session.complete(completion.id, completion.result);
                true
            }
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => false,
        }
    }
}
