//! Pure state transition function
//!
//! `reduce` never mutates the state it is given: it returns the next state and
//! the effects to run, so a live session and a replayed event log go through
//! exactly the same code.

use super::correlator::{call_text, merged_result, navigation_url, Resolution};
use super::state::{supports_extended_thinking, ActionData, ActionStep, AppState, Message, Role, SessionContext};
use super::{Action, Effect, NotifyLevel};
use crate::protocol::{Command, CommandKind, InboundEvent, ThinkingArgs};
use crate::tools::ToolKind;
use crate::view::{route, Surface};
use serde_json::Value;
use std::collections::HashSet;

/// Result of a state transition
#[derive(Debug)]
pub struct Transition {
    pub state: AppState,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn new(state: AppState) -> Self {
        Self {
            state,
            effects: vec![],
        }
    }

    fn effect(&mut self, effect: Effect) {
        self.effects.push(effect);
    }
}

/// Pure transition function
#[must_use]
pub fn reduce(state: &AppState, context: &SessionContext, action: Action) -> Transition {
    let mut t = Transition::new(state.clone());

    match action {
        Action::Inbound { id, event, at } => apply_event(&mut t, id, event, at),

        // ============================================================
        // User actions
        // ============================================================
        Action::SubmitQuery {
            message_id,
            text,
            search_mode,
            file_type_filter,
            path_filter,
            at,
        } => {
            let query = Command::Query {
                text,
                resume: !t.state.messages.is_empty(),
                files: t.state.upload_refs(),
                search_mode,
                file_type_filter,
                path_filter,
            };
            submit_query(&mut t, message_id, query, at);
        }

        Action::EditQuery { text } => edit_query(&mut t, text),

        Action::StartEditing { message_id } => {
            if t.state.message(&message_id).is_some() {
                t.state.editing_message = Some(message_id);
            }
        }

        Action::StopEditing => t.state.editing_message = None,

        Action::Cancel => {
            t.state.is_loading = false;
            t.state.is_stopped = true;
            t.effect(Effect::Send(Command::Cancel {}));
        }

        Action::EnhancePrompt => {
            let s = &mut t.state;
            s.is_generating_prompt = true;
            let command = Command::EnhancePrompt {
                model_name: s.selected_model.clone(),
                text: s.current_question.clone(),
                files: s.upload_refs(),
                tool_args: ThinkingArgs { thinking_tokens: 0 },
            };
            t.effect(Effect::Send(command));
        }

        Action::SetQuestion { text } => t.state.current_question = text,

        Action::SelectAction { message_id } => focus(&mut t, &message_id),

        Action::SetActiveTab(tab) => t.state.active_tab = tab,

        Action::SetToolSettings(settings) => t.state.tool_settings = settings,

        Action::SelectModel { model } => {
            if !supports_extended_thinking(&model) {
                t.state.tool_settings.thinking_tokens = 0;
            }
            t.state.selected_model = model;
        }

        Action::UploadStarted => t.state.is_uploading = true,

        Action::NewSession => t.state = AppState::new(context),

        // ============================================================
        // Replay lifecycle
        // ============================================================
        Action::ReplayStarted {
            session_id,
            workspace,
        } => {
            let mut s = AppState::new(context);
            s.session_id = Some(session_id);
            s.workspace = workspace.unwrap_or_default();
            s.is_loading = true;
            t.state = s;
        }

        Action::ReplayFinished => {
            t.effect(Effect::Send(Command::InitAgent {
                model_name: context.replay_model.clone(),
                tool_args: context.tool_settings,
            }));
            t.state.is_loading = false;
            t.state.is_completed = true;
        }

        Action::ReplayFailed => t.state.is_loading = false,

        Action::CommandDropped { kind } => match kind {
            CommandKind::InitAgent | CommandKind::Query | CommandKind::Cancel => {
                t.state.is_loading = false;
            }
            CommandKind::EditQuery => {
                t.state.is_loading = false;
                t.state.editing_message = None;
            }
            CommandKind::EnhancePrompt => t.state.is_generating_prompt = false,
        },
    }

    t
}

/// Start a turn. Blank questions and questions sent mid-turn are ignored.
fn submit_query(t: &mut Transition, message_id: String, query: Command, at: i64) {
    let Command::Query { text, .. } = &query else {
        return;
    };
    let s = &mut t.state;
    if text.trim().is_empty() || s.is_loading {
        return;
    }
    s.is_loading = true;
    s.is_completed = false;
    s.is_stopped = false;
    s.current_question.clear();

    let needs_init = s.session_id.is_none();
    if needs_init {
        s.session_id = s.workspace_session_id();
    }
    s.messages.push(Message::text(message_id, Role::User, text.clone(), at));

    if needs_init {
        let init = Command::InitAgent {
            model_name: s.selected_model.clone(),
            tool_args: s.tool_settings,
        };
        t.effect(Effect::Send(init));
    }
    t.effect(Effect::Send(query));
}

/// Rewrite the message being edited and drop everything after it
fn edit_query(t: &mut Transition, text: String) {
    let s = &mut t.state;
    let index = s.editing_message.as_deref().and_then(|id| s.position(id));
    if let Some(index) = index {
        s.messages.truncate(index + 1);
        if let Some(edited) = s.messages.get_mut(index) {
            edited.content = Some(text.clone());
        }
        drop_truncated_references(s);
    }
    s.is_completed = false;
    s.is_stopped = false;
    s.is_loading = true;
    s.editing_message = None;
    let files = s.upload_refs();
    t.effect(Effect::Send(Command::EditQuery { text, files }));
}

fn apply_event(t: &mut Transition, id: String, event: InboundEvent, at: i64) {
    match event {
        InboundEvent::UserMessage { text } => {
            t.state.messages.push(Message::text(id, Role::User, text, at));
        }

        InboundEvent::PromptGenerated { result } => {
            t.state.is_generating_prompt = false;
            t.state.current_question = result;
        }

        InboundEvent::Processing => t.state.is_loading = true,

        InboundEvent::WorkspaceInfo { path } => t.state.workspace = path,

        InboundEvent::ConnectionEstablished { workspace_path } => {
            if let Some(path) = workspace_path {
                t.state.workspace = path;
            }
        }

        InboundEvent::AgentThinking { text } => {
            t.state
                .messages
                .push(Message::text(id, Role::Assistant, text, at));
        }

        InboundEvent::ToolCall {
            tool,
            input,
            call_id,
        } => open_call(t, id, tool, input, call_id, at),

        InboundEvent::ToolResult {
            tool,
            result,
            call_id,
        } => close_call(t, id, tool, result, call_id, at),

        InboundEvent::FileEdit { path, content } => {
            let path = t.state.workspace_path(&path);
            t.state.files_content.insert(path, content);
        }

        InboundEvent::AgentResponse { text } => {
            t.state
                .messages
                .push(Message::text(id, Role::Assistant, text, at));
            t.state.is_completed = true;
            t.state.is_loading = false;
        }

        InboundEvent::AgentResponseInterrupted => t.state.is_loading = false,

        InboundEvent::UploadSuccess { files } => {
            t.state.is_uploading = false;
            t.state
                .uploaded_files
                .extend(files.into_iter().map(|f| f.path));
        }

        InboundEvent::System { message } => {
            if !message.is_empty() {
                t.effect(Effect::Notify {
                    level: NotifyLevel::Info,
                    message,
                });
            }
        }

        InboundEvent::Error { message } => {
            t.effect(Effect::error(message));
            t.state.is_uploading = false;
            t.state.is_loading = false;
            t.state.is_generating_prompt = false;
        }

        InboundEvent::AgentInitialized
        | InboundEvent::BrowserUse
        | InboundEvent::StreamComplete
        | InboundEvent::Pong => {}
    }
}

fn open_call(
    t: &mut Transition,
    id: String,
    tool: ToolKind,
    input: Value,
    call_id: Option<String>,
    at: i64,
) {
    if tool.is_flattened_to_text() {
        t.state.messages.push(Message {
            id,
            role: Role::Assistant,
            content: call_text(&tool, &input),
            action: None,
            timestamp: at,
        });
        return;
    }

    if let Some(url) = navigation_url(&input) {
        t.state.browser_url = url.to_string();
    }
    let call_id = call_id.unwrap_or_else(|| id.clone());
    t.state.correlator.open(call_id.clone(), id.clone(), tool.clone());
    t.state
        .messages
        .push(Message::with_action(id.clone(), ActionStep::call(tool, input, call_id), at));
    focus(t, &id);
}

fn close_call(
    t: &mut Transition,
    id: String,
    tool: ToolKind,
    result: Value,
    call_id: Option<String>,
    at: i64,
) {
    if tool == ToolKind::BrowserUse {
        t.state
            .messages
            .push(Message::text(id, Role::Assistant, value_text(&result), at));
        return;
    }
    if tool.drops_result() {
        return;
    }

    match t.state.correlator.resolve(&tool, call_id.as_deref()) {
        Resolution::Matched { message_id, .. } => {
            if let Some(step) = t
                .state
                .message_mut(&message_id)
                .and_then(|m| m.action.as_mut())
            {
                step.data.result = merged_result(&tool, result);
                step.data.is_result = true;
            }
            if t.state.current_action.as_deref() == Some(message_id.as_str()) {
                focus(t, &message_id);
            }
        }
        Resolution::Unmatched => {
            tracing::warn!(
                event_id = %id,
                tool = %tool,
                "Tool result has no open call; appending it as a standalone step"
            );
            let step = ActionStep {
                data: ActionData {
                    tool_input: Value::Null,
                    result: merged_result(&tool, result),
                    is_result: true,
                    call_id: call_id.unwrap_or_else(|| id.clone()),
                },
                tool,
            };
            t.state.messages.push(Message::with_action(id, step, at));
        }
    }
}

/// Point the auxiliary view at a message's action
fn focus(t: &mut Transition, message_id: &str) {
    let Some(step) = t.state.message(message_id).and_then(|m| m.action.as_ref()) else {
        return;
    };
    let surface = route(Some(&step.tool));
    let file = match surface {
        Surface::Code => step
            .input_str("path")
            .or_else(|| step.input_str("file"))
            .map(str::to_string),
        _ => None,
    };

    let s = &mut t.state;
    s.current_action = Some(message_id.to_string());
    if let Some(tab) = surface.tab() {
        s.active_tab = tab;
    }
    if let Some(file) = file {
        s.active_file = s.workspace_path(&file);
    }
    t.effect(Effect::focus(message_id));
}

/// Forget pointers into messages removed by an edit
fn drop_truncated_references(s: &mut AppState) {
    let kept: HashSet<String> = s.messages.iter().map(|m| m.id.clone()).collect();
    s.correlator.retain_messages(|id| kept.contains(id));
    if s.current_action.as_ref().is_some_and(|id| !kept.contains(id)) {
        s.current_action = None;
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
