//! Inbound event envelope

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Canonical shape every inbound event is normalized to before it reaches the reducer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub content: Value,
}

impl Envelope {
    #[must_use]
    pub fn new(id: impl Into<String>, kind: impl Into<String>, content: Value) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            content,
        }
    }

    /// Build an envelope from a persisted `{type, content}` payload and its storage id.
    ///
    /// Returns `None` when the payload has no string `type`.
    #[must_use]
    pub fn from_payload(id: impl Into<String>, payload: &Value) -> Option<Self> {
        let kind = payload.get("type")?.as_str()?;
        let content = payload.get("content").cloned().unwrap_or(Value::Null);
        Some(Self::new(id, kind, content))
    }
}
