//! Actions that drive state transitions

use super::state::Tab;
use crate::protocol::{CommandKind, InboundEvent, SearchMode, ToolSettings};

/// Everything that can change session state.
///
/// Inbound events and user actions arrive here already stamped with ids and
/// timestamps, so [`super::reduce`] stays deterministic.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// An event decoded from the backend, live or replayed
    Inbound {
        id: String,
        event: InboundEvent,
        at: i64,
    },

    // User actions
    SubmitQuery {
        message_id: String,
        text: String,
        search_mode: SearchMode,
        file_type_filter: Option<Vec<String>>,
        path_filter: Option<String>,
        at: i64,
    },
    EditQuery {
        text: String,
    },
    StartEditing {
        message_id: String,
    },
    StopEditing,
    Cancel,
    EnhancePrompt,
    SetQuestion {
        text: String,
    },
    /// Click-through on a transcript action
    SelectAction {
        message_id: String,
    },
    SetActiveTab(Tab),
    SetToolSettings(ToolSettings),
    SelectModel {
        model: String,
    },
    UploadStarted,
    NewSession,

    // Replay lifecycle
    ReplayStarted {
        session_id: String,
        workspace: Option<String>,
    },
    ReplayFinished,
    ReplayFailed,

    /// An outbound command could not be delivered
    CommandDropped {
        kind: CommandKind,
    },
}
