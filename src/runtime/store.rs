//! Session store: the single owner of [`AppState`]
//!
//! Every change goes through [`SessionStore::apply`]. Inputs are stamped with
//! ids and timestamps here, decoded if needed, and handed to the pure reducer.

use crate::protocol::{CommandKind, Envelope, InboundEvent, SearchMode, ToolSettings};
use crate::state_machine::{reduce, Action, AppState, Effect, SessionContext, Tab, Transition};

/// Source of message timestamps
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// User-initiated actions, before they are given an identity
#[derive(Debug, Clone, PartialEq)]
pub enum UserAction {
    Submit {
        text: String,
        search_mode: SearchMode,
        file_type_filter: Option<Vec<String>>,
        path_filter: Option<String>,
    },
    Edit {
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
}

impl UserAction {
    #[must_use]
    pub fn submit(text: impl Into<String>) -> Self {
        Self::Submit {
            text: text.into(),
            search_mode: SearchMode::default(),
            file_type_filter: None,
            path_filter: None,
        }
    }

    /// The command this action sends, for actions that need the transport
    #[must_use]
    pub fn command_kind(&self) -> Option<CommandKind> {
        match self {
            Self::Submit { .. } => Some(CommandKind::Query),
            Self::Edit { .. } => Some(CommandKind::EditQuery),
            Self::Cancel => Some(CommandKind::Cancel),
            Self::EnhancePrompt => Some(CommandKind::EnhancePrompt),
            _ => None,
        }
    }

    fn into_action(self, id: String, at: i64) -> Action {
        match self {
            Self::Submit {
                text,
                search_mode,
                file_type_filter,
                path_filter,
            } => Action::SubmitQuery {
                message_id: id,
                text,
                search_mode,
                file_type_filter,
                path_filter,
                at,
            },
            Self::Edit { text } => Action::EditQuery { text },
            Self::StartEditing { message_id } => Action::StartEditing { message_id },
            Self::StopEditing => Action::StopEditing,
            Self::Cancel => Action::Cancel,
            Self::EnhancePrompt => Action::EnhancePrompt,
            Self::SetQuestion { text } => Action::SetQuestion { text },
            Self::SelectAction { message_id } => Action::SelectAction { message_id },
            Self::SetActiveTab(tab) => Action::SetActiveTab(tab),
            Self::SetToolSettings(settings) => Action::SetToolSettings(settings),
            Self::SelectModel { model } => Action::SelectModel { model },
            Self::UploadStarted => Action::UploadStarted,
            Self::NewSession => Action::NewSession,
        }
    }
}

/// Anything that can be applied to the store
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    /// Backend event, live or replayed
    Event(Envelope),
    User(UserAction),
    /// Transitions the runtime raises itself (replay lifecycle, dropped commands)
    Internal(Action),
}

impl Input {
    /// Whether applying this input replaces the transcript wholesale
    #[must_use]
    pub fn resets_transcript(&self) -> bool {
        matches!(
            self,
            Input::User(UserAction::NewSession) | Input::Internal(Action::ReplayStarted { .. })
        )
    }
}

pub struct SessionStore {
    context: SessionContext,
    state: AppState,
    clock: Box<dyn Clock>,
    last_at: i64,
}

impl SessionStore {
    #[must_use]
    pub fn new(context: SessionContext) -> Self {
        Self::with_clock(context, SystemClock)
    }

    #[must_use]
    pub fn with_clock(context: SessionContext, clock: impl Clock + 'static) -> Self {
        Self {
            state: AppState::new(&context),
            context,
            clock: Box::new(clock),
            last_at: i64::MIN,
        }
    }

    #[must_use]
    pub fn state(&self) -> &AppState {
        &self.state
    }

    #[must_use]
    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    /// Apply one input and return the effects the caller must execute
    pub fn apply(&mut self, input: Input) -> Vec<Effect> {
        let Some(action) = self.stamp(input) else {
            return Vec::new();
        };
        let Transition { state, effects } = reduce(&self.state, &self.context, action);
        self.state = state;
        effects
    }

    fn stamp(&mut self, input: Input) -> Option<Action> {
        match input {
            Input::Event(envelope) => {
                let event = InboundEvent::decode(&envelope)?;
                tracing::debug!(event_id = %envelope.id, kind = event.kind(), "Applying event");
                Some(Action::Inbound {
                    id: envelope.id,
                    event,
                    at: self.tick(),
                })
            }
            Input::User(action) => {
                let id = uuid::Uuid::new_v4().to_string();
                let at = self.tick();
                Some(action.into_action(id, at))
            }
            Input::Internal(action) => Some(action),
        }
    }

    /// Monotonically non-decreasing timestamp
    fn tick(&mut self) -> i64 {
        self.last_at = self.last_at.max(self.clock.now_millis());
        self.last_at
    }
}
