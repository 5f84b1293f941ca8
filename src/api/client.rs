//! Session history adapters

use super::error::ApiError;
use super::types::{EventsResponse, SessionSummary, SessionsResponse, StoredEvent};
use crate::runtime::SessionApi;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::path::PathBuf;
use std::time::Duration;

/// Session history served by the agent backend
#[derive(Debug, Clone)]
pub struct HttpSessionApi {
    client: Client,
    base_url: String,
}

impl HttpSessionApi {
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = format!("{}{path}", self.base_url);
        tracing::debug!(url = %url, "Fetching session history");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ApiError::Status { url, status, body });
        }
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl SessionApi for HttpSessionApi {
    async fn list_sessions(&self, device_id: &str) -> Result<Vec<SessionSummary>, ApiError> {
        let response: SessionsResponse = self.get(&format!("/api/sessions/{device_id}")).await?;
        Ok(response.sessions)
    }

    async fn session_events(&self, session_id: &str) -> Result<Vec<StoredEvent>, ApiError> {
        let response: EventsResponse = self.get(&format!("/api/sessions/{session_id}/events")).await?;
        Ok(response.events)
    }
}

/// A session log saved to disk in the `{events: [...]}` response shape
#[derive(Debug, Clone)]
pub struct FileSessionApi {
    path: PathBuf,
}

impl FileSessionApi {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn load(&self) -> Result<Vec<StoredEvent>, ApiError> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| ApiError::Io {
                path: self.path.display().to_string(),
                source,
            })?;
        let response: EventsResponse = serde_json::from_str(&text)?;
        Ok(response.events)
    }
}

#[async_trait]
impl SessionApi for FileSessionApi {
    /// The file holds a single session
    async fn list_sessions(&self, _device_id: &str) -> Result<Vec<SessionSummary>, ApiError> {
        let events = self.load().await?;
        let Some(first) = events.first() else {
            return Ok(Vec::new());
        };
        let first_message = events
            .iter()
            .filter_map(StoredEvent::to_envelope)
            .find(|env| env.kind == "user_message")
            .and_then(|env| env.content.get("text").and_then(|t| t.as_str()).map(str::to_string))
            .unwrap_or_default();
        Ok(vec![SessionSummary {
            id: first.session_id.clone(),
            workspace_dir: first.workspace_dir.clone().unwrap_or_default(),
            created_at: first.timestamp.clone(),
            device_id: String::new(),
            first_message,
        }])
    }

    async fn session_events(&self, session_id: &str) -> Result<Vec<StoredEvent>, ApiError> {
        let events = self.load().await?;
        if let Some(other) = events.iter().find(|e| !e.session_id.is_empty() && e.session_id != session_id) {
            tracing::warn!(
                requested = %session_id,
                found = %other.session_id,
                "Saved log belongs to a different session"
            );
        }
        Ok(events)
    }
}
