//! The request cycle: one user submission, one backend round-trip, and the
//! outcome folded back into the store.

use crate::api::ChatBackend;
use crate::store::{ChatStore, Message, Role, Turn};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

/// How a finished request cycle ended.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    Replied(Message),
    Failed(String),
}

/// Result of handing input to [`ChatSession::submit`].
pub enum Submission {
    /// The user message was recorded and a request is in flight.
    Dispatched(PendingReply),
    /// Blank input; nothing happened.
    Empty,
    /// A request is already pending; the input was dropped.
    Busy,
}

/// Handle on an in-flight request cycle.
pub struct PendingReply {
    handle: JoinHandle<CycleOutcome>,
    store: Arc<ChatStore>,
}

impl PendingReply {
    pub async fn wait(self) -> CycleOutcome {
        match self.handle.await {
            Ok(outcome) => outcome,
            Err(e) => {
                // The cycle never reached its reconcile step; restore a
                // consistent state ourselves.
                error!(error = %e, "chat request task did not complete");
                let message = format!("Request aborted: {}", e);
                self.store.set_error(Some(message.clone()));
                self.store.set_loading(false);
                CycleOutcome::Failed(message)
            }
        }
    }
}

#[derive(Clone)]
pub struct ChatSession {
    store: Arc<ChatStore>,
    backend: Arc<dyn ChatBackend>,
}

impl ChatSession {
    pub fn new(store: Arc<ChatStore>, backend: Arc<dyn ChatBackend>) -> Self {
        Self { store, backend }
    }

    pub fn store(&self) -> &Arc<ChatStore> {
        &self.store
    }

    pub fn backend(&self) -> &Arc<dyn ChatBackend> {
        &self.backend
    }

    /// Records `input` as a user message and dispatches the request.
    ///
    /// The append and the loading flag happen before this returns; the
    /// network call runs on a spawned task, so this must be called from
    /// inside a tokio runtime.
    pub fn submit(&self, input: &str) -> Submission {
        if input.trim().is_empty() {
            return Submission::Empty;
        }

        let turn = match self.store.begin_turn(input) {
            Ok(turn) => turn,
            Err(_) => {
                debug!("request pending, submission ignored");
                return Submission::Busy;
            }
        };

        let handle = tokio::spawn(run_cycle(
            self.store.clone(),
            self.backend.clone(),
            turn,
        ));
        Submission::Dispatched(PendingReply {
            handle,
            store: self.store.clone(),
        })
    }
}

/// Sends `turn` to the backend and reconciles the result into `store`.
///
/// Errors never escape: a failure becomes the store's error text, the
/// conversation keeps the user message and gains nothing else.
pub async fn run_cycle(
    store: Arc<ChatStore>,
    backend: Arc<dyn ChatBackend>,
    turn: Turn,
) -> CycleOutcome {
    let outcome = match backend.send_chat(&turn.conversation, &turn.settings).await {
        Ok(response) => CycleOutcome::Replied(store.add_message(Role::Assistant, response)),
        Err(e) => {
            warn!(error = %e, "chat request failed");
            let message = e.to_string();
            store.set_error(Some(message.clone()));
            CycleOutcome::Failed(message)
        }
    };
    store.set_loading(false);
    outcome
}
