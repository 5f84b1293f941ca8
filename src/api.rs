//! Clients for the session history endpoints
//!
//! `GET /api/sessions/{device_id}` lists sessions and
//! `GET /api/sessions/{session_id}/events` returns a session's event log.

mod client;
mod error;
mod types;

pub use client::{FileSessionApi, HttpSessionApi};
pub use error::ApiError;
pub use types::{EventsResponse, SessionSummary, SessionsResponse, StoredEvent};
