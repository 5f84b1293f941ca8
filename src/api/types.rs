//! Session history wire types

use crate::protocol::Envelope;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One entry of the session history list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: String,
    #[serde(default)]
    pub workspace_dir: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub device_id: String,
    /// Text of the session's first user message
    #[serde(default)]
    pub first_message: String,
}

/// One persisted event of a session log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredEvent {
    pub id: String,
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub event_type: String,
    /// The `{type, content}` message as it was sent live, as an object or as JSON text
    #[serde(default)]
    pub event_payload: Value,
    #[serde(default)]
    pub workspace_dir: Option<String>,
}

impl StoredEvent {
    /// Normalize into the envelope the live path would have received.
    ///
    /// Returns `None` for payloads without a `type`.
    #[must_use]
    pub fn to_envelope(&self) -> Option<Envelope> {
        match &self.event_payload {
            Value::String(text) => {
                let payload: Value = serde_json::from_str(text).ok()?;
                Envelope::from_payload(self.id.clone(), &payload)
            }
            payload => Envelope::from_payload(self.id.clone(), payload),
        }
    }
}

/// Response of the session list endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionsResponse {
    #[serde(default)]
    pub sessions: Vec<SessionSummary>,
}

/// Response of the event log endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventsResponse {
    #[serde(default)]
    pub events: Vec<StoredEvent>,
}
