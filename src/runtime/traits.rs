//! Trait abstractions for runtime I/O
//!
//! These traits enable testing the executor with mock implementations.

use crate::api::{ApiError, SessionSummary, StoredEvent};
use crate::protocol::Command;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("not connected to the agent")]
    Disconnected,

    #[error("failed to encode command: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("send failed: {0}")]
    Send(String),
}

/// Outbound connection to the agent backend
#[async_trait]
pub trait Transport: Send + Sync {
    fn is_connected(&self) -> bool;

    /// Deliver one command; never retried by the caller
    async fn send(&self, command: &Command) -> Result<(), TransportError>;
}

/// Persisted session history
#[async_trait]
pub trait SessionApi: Send + Sync {
    async fn list_sessions(&self, device_id: &str) -> Result<Vec<SessionSummary>, ApiError>;

    /// Ordered event log of one session
    async fn session_events(&self, session_id: &str) -> Result<Vec<StoredEvent>, ApiError>;
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }

    async fn send(&self, command: &Command) -> Result<(), TransportError> {
        (**self).send(command).await
    }
}

#[async_trait]
impl<T: SessionApi + ?Sized> SessionApi for Arc<T> {
    async fn list_sessions(&self, device_id: &str) -> Result<Vec<SessionSummary>, ApiError> {
        (**self).list_sessions(device_id).await
    }

    async fn session_events(&self, session_id: &str) -> Result<Vec<StoredEvent>, ApiError> {
        (**self).session_events(session_id).await
    }
}

// ============================================================================
// Production Adapters
// ============================================================================

/// Transport for offline use: commands are logged instead of sent
#[derive(Debug, Clone, Default)]
pub struct LoggingTransport;

#[async_trait]
impl Transport for LoggingTransport {
    fn is_connected(&self) -> bool {
        true
    }

    async fn send(&self, command: &Command) -> Result<(), TransportError> {
        let payload = serde_json::to_string(command)?;
        tracing::info!(command = %command.kind(), payload = %payload, "Outbound command");
        Ok(())
    }
}
