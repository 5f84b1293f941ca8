//! Effects produced by state transitions

use crate::protocol::Command;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyLevel {
    Info,
    Error,
}

/// Effects to be executed after a state transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Deliver a command to the backend
    Send(Command),

    /// Show a user-visible notification
    Notify { level: NotifyLevel, message: String },

    /// The current action was set or its step changed; refresh the auxiliary view
    FocusAction { message_id: String },
}

impl Effect {
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Effect::Notify {
            level: NotifyLevel::Error,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn focus(message_id: impl Into<String>) -> Self {
        Effect::FocusAction {
            message_id: message_id.into(),
        }
    }
}
