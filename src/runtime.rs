//! Runtime for live and replayed sessions
//!
//! One task owns the [`SessionStore`]. Live events, user actions and replays
//! all reach it as [`Request`]s over a channel, so state changes are applied
//! one at a time; observers follow along through broadcast [`Update`]s.

mod executor;
pub mod replay;
pub mod store;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use executor::SessionRuntime;
pub use replay::{replay_batch, ReplayController};
pub use store::{Clock, Input, SessionStore, SystemClock, UserAction};
pub use traits::*;

use crate::protocol::Envelope;
use crate::state_machine::{AppState, NotifyLevel};
use crate::view::TerminalWrite;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;

/// Work submitted to a session runtime
#[derive(Debug, Clone)]
pub enum Request {
    /// Envelope received from the live connection
    Event(Envelope),
    User(UserAction),
    /// Fetch a persisted session and replay it
    Replay { session_id: String },
}

/// Events sent to observers
#[derive(Debug, Clone)]
pub enum Update {
    State(Arc<AppState>),
    Notice { level: NotifyLevel, message: String },
    Terminal(Vec<TerminalWrite>),
}

/// Handle to interact with a running session
#[derive(Clone)]
pub struct SessionHandle {
    requests: mpsc::Sender<Request>,
    updates: broadcast::Sender<Update>,
    cancel: CancellationToken,
}

impl SessionHandle {
    async fn send(&self, request: Request) -> Result<(), String> {
        self.requests
            .send(request)
            .await
            .map_err(|e| format!("Failed to send request: {e}"))
    }

    /// Queue an envelope received from the live connection
    ///
    /// # Errors
    ///
    /// Fails if the runtime has stopped.
    pub async fn send_event(&self, envelope: Envelope) -> Result<(), String> {
        self.send(Request::Event(envelope)).await
    }

    /// Queue a user action
    ///
    /// # Errors
    ///
    /// Fails if the runtime has stopped.
    pub async fn dispatch(&self, action: UserAction) -> Result<(), String> {
        self.send(Request::User(action)).await
    }

    /// Queue a replay of a persisted session
    ///
    /// # Errors
    ///
    /// Fails if the runtime has stopped.
    pub async fn replay(&self, session_id: impl Into<String>) -> Result<(), String> {
        self.send(Request::Replay {
            session_id: session_id.into(),
        })
        .await
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Update> {
        self.updates.subscribe()
    }

    /// Stop the runtime, abandoning any replay in progress
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}
