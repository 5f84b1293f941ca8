//! Transcript state types

use super::correlator::Correlator;
use crate::protocol::ToolSettings;
use crate::tools::ToolKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

// ============================================================================
// Transcript entries
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// One tool invocation, optionally paired with its result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionStep {
    #[serde(rename = "type")]
    pub tool: ToolKind,
    pub data: ActionData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionData {
    pub tool_input: Value,
    /// Absent until a result has been merged in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    pub is_result: bool,
    /// Correlation key assigned when the call was opened
    pub call_id: String,
}

impl ActionStep {
    #[must_use]
    pub fn call(tool: ToolKind, tool_input: Value, call_id: impl Into<String>) -> Self {
        Self {
            tool,
            data: ActionData {
                tool_input,
                result: None,
                is_result: false,
                call_id: call_id.into(),
            },
        }
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        !self.data.is_result
    }

    /// `tool_input.<key>` as a string, if present
    #[must_use]
    pub fn input_str(&self, key: &str) -> Option<&str> {
        self.data.tool_input.get(key).and_then(Value::as_str)
    }
}

/// One transcript entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<ActionStep>,
    /// Milliseconds since the epoch; informational only, never used for ordering
    pub timestamp: i64,
}

impl Message {
    #[must_use]
    pub fn text(id: impl Into<String>, role: Role, content: impl Into<String>, timestamp: i64) -> Self {
        Self {
            id: id.into(),
            role,
            content: Some(content.into()),
            action: None,
            timestamp,
        }
    }

    #[must_use]
    pub fn with_action(id: impl Into<String>, action: ActionStep, timestamp: i64) -> Self {
        Self {
            id: id.into(),
            role: Role::Assistant,
            content: None,
            action: Some(action),
            timestamp,
        }
    }

    /// Whether the entry has anything to show. Empty entries remain valid
    /// placeholders in the transcript.
    #[must_use]
    pub fn is_renderable(&self) -> bool {
        self.content.as_deref().is_some_and(|c| !c.is_empty()) || self.action.is_some()
    }
}

// ============================================================================
// Session state
// ============================================================================

/// Auxiliary panel with focus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tab {
    #[default]
    Browser,
    Code,
    Terminal,
}

/// Immutable defaults the reducer needs to build and reset state
#[derive(Debug, Clone, PartialEq)]
pub struct SessionContext {
    /// Model selected for a fresh session
    pub default_model: String,
    /// Model sent with `init_agent` after a replay completes
    pub replay_model: String,
    pub tool_settings: ToolSettings,
}

impl SessionContext {
    #[must_use]
    pub fn new(default_model: impl Into<String>, replay_model: impl Into<String>) -> Self {
        Self {
            default_model: default_model.into(),
            replay_model: replay_model.into(),
            tool_settings: ToolSettings::default(),
        }
    }
}

/// Only reasoning-capable models accept an extended thinking budget
#[must_use]
pub fn supports_extended_thinking(model: &str) -> bool {
    model.contains("claude")
}

/// The externally observable session state
#[derive(Debug, Clone, PartialEq, Serialize)]
#[allow(clippy::struct_excessive_bools)] // flags are set and cleared independently
pub struct AppState {
    pub messages: Vec<Message>,
    pub is_loading: bool,
    pub is_completed: bool,
    pub is_stopped: bool,
    pub is_uploading: bool,
    pub is_generating_prompt: bool,
    /// Id of the message whose action drives the auxiliary view
    pub current_action: Option<String>,
    pub active_tab: Tab,
    pub active_file: String,
    pub current_question: String,
    pub workspace: String,
    pub session_id: Option<String>,
    pub uploaded_files: Vec<String>,
    pub files_content: BTreeMap<String, String>,
    /// Last navigated URL, kept across unrelated tool calls
    pub browser_url: String,
    /// Id of the message being edited
    pub editing_message: Option<String>,
    pub tool_settings: ToolSettings,
    pub selected_model: String,
    #[serde(skip)]
    pub(crate) correlator: Correlator,
}

impl AppState {
    #[must_use]
    pub fn new(context: &SessionContext) -> Self {
        Self {
            messages: Vec::new(),
            is_loading: false,
            is_completed: false,
            is_stopped: false,
            is_uploading: false,
            is_generating_prompt: false,
            current_action: None,
            active_tab: Tab::default(),
            active_file: String::new(),
            current_question: String::new(),
            workspace: String::new(),
            session_id: None,
            uploaded_files: Vec::new(),
            files_content: BTreeMap::new(),
            browser_url: String::new(),
            editing_message: None,
            tool_settings: context.tool_settings,
            selected_model: context.default_model.clone(),
            correlator: Correlator::default(),
        }
    }

    #[must_use]
    pub fn message(&self, id: &str) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    pub(crate) fn message_mut(&mut self, id: &str) -> Option<&mut Message> {
        self.messages.iter_mut().find(|m| m.id == id)
    }

    #[must_use]
    pub fn position(&self, id: &str) -> Option<usize> {
        self.messages.iter().position(|m| m.id == id)
    }

    /// The message holding the current action
    #[must_use]
    pub fn current_action_message(&self) -> Option<&Message> {
        self.current_action.as_deref().and_then(|id| self.message(id))
    }

    /// The action step driving the auxiliary view, resolved through its message
    #[must_use]
    pub fn current_action(&self) -> Option<&ActionStep> {
        self.current_action_message().and_then(|m| m.action.as_ref())
    }

    #[must_use]
    pub fn editing_message(&self) -> Option<&Message> {
        self.editing_message.as_deref().and_then(|id| self.message(id))
    }

    /// Number of tool calls still waiting for a result
    #[must_use]
    pub fn open_calls(&self) -> usize {
        self.correlator.len()
    }

    /// Uploaded files as the backend expects them: relative to the workspace root
    #[must_use]
    pub fn upload_refs(&self) -> Vec<String> {
        self.uploaded_files.iter().map(|f| format!(".{f}")).collect()
    }

    /// Resolve a tool-reported path against the session workspace
    #[must_use]
    pub fn workspace_path(&self, path: &str) -> String {
        if self.workspace.is_empty() || path.starts_with(&self.workspace) {
            path.to_string()
        } else {
            format!("{}/{}", self.workspace, path.trim_start_matches('/'))
        }
    }

    /// Session id implied by the workspace directory name
    #[must_use]
    pub fn workspace_session_id(&self) -> Option<String> {
        self.workspace
            .rsplit('/')
            .next()
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx() -> SessionContext {
        SessionContext::new("claude-test", "claude-replay")
    }

    #[test]
    fn test_current_action_resolves_through_message() {
        let mut state = AppState::new(&ctx());
        state.messages.push(Message::with_action(
            "m1",
            ActionStep::call(ToolKind::Bash, json!({"command": "ls"}), "m1"),
            1,
        ));
        state.current_action = Some("m1".to_string());
        assert_eq!(state.current_action().unwrap().input_str("command"), Some("ls"));

        state.message_mut("m1").unwrap().action.as_mut().unwrap().data.is_result = true;
        assert!(!state.current_action().unwrap().is_open());
    }

    #[test]
    fn test_empty_message_is_not_renderable() {
        let msg = Message {
            id: "m".to_string(),
            role: Role::Assistant,
            content: None,
            action: None,
            timestamp: 0,
        };
        assert!(!msg.is_renderable());
        assert!(Message::text("t", Role::User, "hi", 0).is_renderable());
    }

    #[test]
    fn test_workspace_path_resolution() {
        let mut state = AppState::new(&ctx());
        assert_eq!(state.workspace_path("a.py"), "a.py");
        state.workspace = "/data/ws/abc".to_string();
        assert_eq!(state.workspace_path("src/a.py"), "/data/ws/abc/src/a.py");
        assert_eq!(state.workspace_path("/data/ws/abc/b.py"), "/data/ws/abc/b.py");
        assert_eq!(state.workspace_session_id().as_deref(), Some("abc"));
    }

    #[test]
    fn test_upload_refs_are_workspace_relative() {
        let mut state = AppState::new(&ctx());
        state.uploaded_files = vec!["/uploads/a.csv".to_string()];
        assert_eq!(state.upload_refs(), vec!["./uploads/a.csv".to_string()]);
    }

    #[test]
    fn test_reasoning_models() {
        assert!(supports_extended_thinking("claude-3-7-sonnet"));
        assert!(!supports_extended_thinking("gpt-4o"));
    }
}
