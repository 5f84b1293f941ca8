//! Replay of persisted sessions
//!
//! A replayed log goes through the same [`SessionStore::apply`] path as live
//! events. [`ReplayController`] turns the stored log into store inputs; the
//! executor paces them, [`replay_batch`] applies them back to back.

use super::store::{Input, SessionStore};
use crate::api::StoredEvent;
use crate::protocol::Envelope;
use crate::state_machine::{Action, Effect};

#[derive(Debug, Clone)]
pub struct ReplayController {
    session_id: String,
    events: Vec<StoredEvent>,
}

impl ReplayController {
    #[must_use]
    pub fn new(session_id: impl Into<String>, events: Vec<StoredEvent>) -> Self {
        Self {
            session_id: session_id.into(),
            events,
        }
    }

    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Workspace recorded on the first event
    #[must_use]
    pub fn workspace(&self) -> Option<String> {
        self.events
            .first()
            .and_then(|e| e.workspace_dir.clone())
            .filter(|w| !w.is_empty())
    }

    #[must_use]
    pub fn started(&self) -> Input {
        Input::Internal(Action::ReplayStarted {
            session_id: self.session_id.clone(),
            workspace: self.workspace(),
        })
    }

    #[must_use]
    pub fn finished(&self) -> Input {
        Input::Internal(Action::ReplayFinished)
    }

    /// Stored events as the envelopes the live path would have received
    pub fn envelopes(&self) -> impl Iterator<Item = Envelope> + '_ {
        self.events.iter().filter_map(|event| {
            let envelope = event.to_envelope();
            if envelope.is_none() {
                tracing::warn!(
                    session_id = %self.session_id,
                    event_id = %event.id,
                    "Skipping stored event without a type"
                );
            }
            envelope
        })
    }
}

/// Apply a whole log without pacing
pub fn replay_batch(store: &mut SessionStore, replay: &ReplayController) -> Vec<Effect> {
    let mut effects = store.apply(replay.started());
    for envelope in replay.envelopes() {
        effects.extend(store.apply(Input::Event(envelope)));
    }
    effects.extend(store.apply(replay.finished()));
    effects
}
