//! Client configuration from the environment

use crate::state_machine::SessionContext;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_MODEL: &str = "claude-3-7-sonnet@20250219";
/// Model the agent is re-initialized with after a replay
pub const DEFAULT_REPLAY_MODEL: &str = "claude-3-opus-20240229";
pub const DEFAULT_REPLAY_DELAY: Duration = Duration::from_millis(1500);
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var}={value:?} is not a valid number of {unit}")]
    InvalidDuration {
        var: &'static str,
        value: String,
        unit: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub api_url: String,
    /// Device whose sessions are listed; sessions are scoped per device
    pub device_id: Option<String>,
    pub default_model: String,
    pub replay_model: String,
    pub replay_delay: Duration,
    pub http_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            device_id: None,
            default_model: DEFAULT_MODEL.to_string(),
            replay_model: DEFAULT_REPLAY_MODEL.to_string(),
            replay_delay: DEFAULT_REPLAY_DELAY,
            http_timeout: DEFAULT_HTTP_TIMEOUT,
        }
    }
}

impl ClientConfig {
    /// Read the configuration, falling back to defaults for unset or blank variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidDuration`] if a delay or timeout variable is not a whole number.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let replay_delay = match var("AGENT_REPLAY_DELAY_MS") {
            Some(value) => Duration::from_millis(parse(&value, "AGENT_REPLAY_DELAY_MS", "milliseconds")?),
            None => defaults.replay_delay,
        };
        let http_timeout = match var("AGENT_HTTP_TIMEOUT_SECS") {
            Some(value) => Duration::from_secs(parse(&value, "AGENT_HTTP_TIMEOUT_SECS", "seconds")?),
            None => defaults.http_timeout,
        };

        Ok(Self {
            api_url: var("AGENT_API_URL").unwrap_or(defaults.api_url),
            device_id: var("AGENT_DEVICE_ID"),
            default_model: var("DEFAULT_MODEL").unwrap_or(defaults.default_model),
            replay_model: var("AGENT_REPLAY_MODEL").unwrap_or(defaults.replay_model),
            replay_delay,
            http_timeout,
        })
    }

    #[must_use]
    pub fn session_context(&self) -> SessionContext {
        SessionContext::new(&self.default_model, &self.replay_model)
    }
}

fn parse(value: &str, var: &'static str, unit: &'static str) -> Result<u64, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidDuration {
        var,
        value: value.to_string(),
        unit,
    })
}
