//! Mock implementations for testing
//!
//! These mocks enable runtime tests without a live backend.

use super::store::Clock;
use super::traits::*;
use crate::api::{ApiError, SessionSummary, StoredEvent};
use crate::protocol::Command;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

// ============================================================================
// Clock
// ============================================================================

/// Clock that only moves when told to; clones share the same time
#[derive(Debug, Clone)]
pub struct FixedClock(Arc<AtomicI64>);

impl FixedClock {
    pub fn new(millis: i64) -> Self {
        Self(Arc::new(AtomicI64::new(millis)))
    }

    pub fn set(&self, millis: i64) {
        self.0.store(millis, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.0.load(Ordering::SeqCst)
    }
}

// ============================================================================
// Mock Transport
// ============================================================================

/// Transport that records every command it is asked to send
pub struct MockTransport {
    connected: AtomicBool,
    fail_sends: AtomicBool,
    /// Record of all delivered commands
    pub sent: Mutex<Vec<Command>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            connected: AtomicBool::new(true),
            fail_sends: AtomicBool::new(false),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    /// Make every following send fail while still reporting connected
    pub fn fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }

    pub fn recorded_commands(&self) -> Vec<Command> {
        self.sent.lock().unwrap().clone()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MockTransport {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn send(&self, command: &Command) -> Result<(), TransportError> {
        if !self.is_connected() {
            return Err(TransportError::Disconnected);
        }
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(TransportError::Send("socket closed mid-send".to_string()));
        }
        self.sent.lock().unwrap().push(command.clone());
        Ok(())
    }
}

// ============================================================================
// Mock Session API
// ============================================================================

/// In-memory session history
#[derive(Default)]
pub struct MockSessionApi {
    logs: Mutex<HashMap<String, Vec<StoredEvent>>>,
    /// Record of requested session ids
    pub requests: Mutex<Vec<String>>,
}

impl MockSessionApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_log(self, session_id: impl Into<String>, events: Vec<StoredEvent>) -> Self {
        self.logs.lock().unwrap().insert(session_id.into(), events);
        self
    }
}

#[async_trait]
impl SessionApi for MockSessionApi {
    async fn list_sessions(&self, device_id: &str) -> Result<Vec<SessionSummary>, ApiError> {
        let logs = self.logs.lock().unwrap();
        Ok(logs
            .keys()
            .map(|id| SessionSummary {
                id: id.clone(),
                workspace_dir: format!("/ws/{id}"),
                created_at: String::new(),
                device_id: device_id.to_string(),
                first_message: String::new(),
            })
            .collect())
    }

    async fn session_events(&self, session_id: &str) -> Result<Vec<StoredEvent>, ApiError> {
        self.requests.lock().unwrap().push(session_id.to_string());
        self.logs
            .lock()
            .unwrap()
            .get(session_id)
            .cloned()
            .ok_or_else(|| ApiError::Io {
                path: session_id.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such session"),
            })
    }
}

// ============================================================================
// Fixtures
// ============================================================================

/// A stored event of `session_id` whose workspace is `/ws/{session_id}`
pub fn stored_event(id: &str, session_id: &str, payload: Value) -> StoredEvent {
    StoredEvent {
        id: id.to_string(),
        session_id: session_id.to_string(),
        timestamp: "2025-03-01T10:00:00".to_string(),
        event_type: payload
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        event_payload: payload,
        workspace_dir: Some(format!("/ws/{session_id}")),
    }
}
