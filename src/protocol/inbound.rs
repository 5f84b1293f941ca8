//! Typed inbound events decoded from envelopes

use super::Envelope;
use crate::tools::ToolKind;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Events the backend emits about agent activity
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    ConnectionEstablished { workspace_path: Option<String> },
    AgentInitialized,
    UserMessage { text: String },
    PromptGenerated { result: String },
    Processing,
    WorkspaceInfo { path: String },
    AgentThinking { text: String },
    ToolCall {
        tool: ToolKind,
        input: Value,
        call_id: Option<String>,
    },
    FileEdit { path: String, content: String },
    BrowserUse,
    ToolResult {
        tool: ToolKind,
        result: Value,
        call_id: Option<String>,
    },
    AgentResponse { text: String },
    AgentResponseInterrupted,
    StreamComplete,
    UploadSuccess { files: Vec<UploadedFile> },
    System { message: String },
    Pong,
    Error { message: String },
}

/// One acknowledged upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub path: String,
    #[serde(default)]
    pub saved_path: String,
}

#[derive(Deserialize)]
#[allow(clippy::struct_field_names)] // field names are fixed by the wire format
struct ToolCallContent {
    tool_name: String,
    #[serde(default)]
    tool_input: Value,
    #[serde(default)]
    tool_call_id: Option<String>,
}

#[derive(Deserialize)]
struct ToolResultContent {
    tool_name: String,
    #[serde(default)]
    result: Value,
    #[serde(default)]
    tool_call_id: Option<String>,
}

#[derive(Deserialize)]
struct UploadContent {
    #[serde(default)]
    files: Vec<UploadedFile>,
}

impl InboundEvent {
    /// Decode an envelope into a typed event.
    ///
    /// Types outside the accepted set, and tool events without a tool name,
    /// decode to `None`. Missing text fields decode as empty strings.
    #[must_use]
    pub fn decode(envelope: &Envelope) -> Option<Self> {
        let content = &envelope.content;
        let event = match envelope.kind.as_str() {
            "connection_established" => Self::ConnectionEstablished {
                workspace_path: opt_str(content, "workspace_path"),
            },
            "agent_initialized" => Self::AgentInitialized,
            "user_message" => Self::UserMessage {
                text: str_field(content, "text"),
            },
            "prompt_generated" => Self::PromptGenerated {
                result: str_field(content, "result"),
            },
            "processing" => Self::Processing,
            "workspace_info" => Self::WorkspaceInfo {
                path: str_field(content, "path"),
            },
            "agent_thinking" => Self::AgentThinking {
                text: str_field(content, "text"),
            },
            "tool_call" => {
                let call: ToolCallContent = parse(envelope)?;
                Self::ToolCall {
                    tool: ToolKind::from(call.tool_name),
                    input: call.tool_input,
                    call_id: call.tool_call_id,
                }
            }
            "file_edit" => Self::FileEdit {
                path: str_field(content, "path"),
                content: str_field(content, "content"),
            },
            "browser_use" => Self::BrowserUse,
            "tool_result" => {
                let result: ToolResultContent = parse(envelope)?;
                Self::ToolResult {
                    tool: ToolKind::from(result.tool_name),
                    result: result.result,
                    call_id: result.tool_call_id,
                }
            }
            "agent_response" => Self::AgentResponse {
                text: str_field(content, "text"),
            },
            "agent_response_interrupted" => Self::AgentResponseInterrupted,
            "stream_complete" => Self::StreamComplete,
            "upload_success" => {
                let upload: UploadContent = parse(envelope)?;
                Self::UploadSuccess {
                    files: upload.files,
                }
            }
            "system" => Self::System {
                message: str_field(content, "message"),
            },
            "pong" => Self::Pong,
            "error" => Self::Error {
                message: str_field(content, "message"),
            },
            other => {
                tracing::debug!(event_id = %envelope.id, kind = %other, "Ignoring unknown event type");
                return None;
            }
        };
        Some(event)
    }

    /// Wire name of the event type
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ConnectionEstablished { .. } => "connection_established",
            Self::AgentInitialized => "agent_initialized",
            Self::UserMessage { .. } => "user_message",
            Self::PromptGenerated { .. } => "prompt_generated",
            Self::Processing => "processing",
            Self::WorkspaceInfo { .. } => "workspace_info",
            Self::AgentThinking { .. } => "agent_thinking",
            Self::ToolCall { .. } => "tool_call",
            Self::FileEdit { .. } => "file_edit",
            Self::BrowserUse => "browser_use",
            Self::ToolResult { .. } => "tool_result",
            Self::AgentResponse { .. } => "agent_response",
            Self::AgentResponseInterrupted => "agent_response_interrupted",
            Self::StreamComplete => "stream_complete",
            Self::UploadSuccess { .. } => "upload_success",
            Self::System { .. } => "system",
            Self::Pong => "pong",
            Self::Error { .. } => "error",
        }
    }
}

fn parse<T: DeserializeOwned>(envelope: &Envelope) -> Option<T> {
    match serde_json::from_value(envelope.content.clone()) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            tracing::debug!(
                event_id = %envelope.id,
                kind = %envelope.kind,
                error = %e,
                "Ignoring event with malformed content"
            );
            None
        }
    }
}

fn opt_str(content: &Value, key: &str) -> Option<String> {
    content.get(key).and_then(Value::as_str).map(str::to_string)
}

fn str_field(content: &Value, key: &str) -> String {
    opt_str(content, key).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn env(kind: &str, content: Value) -> Envelope {
        Envelope::new("evt-1", kind, content)
    }

    #[test]
    fn test_unknown_type_decodes_to_none() {
        assert_eq!(InboundEvent::decode(&env("telemetry", json!({"x": 1}))), None);
    }

    #[test]
    fn test_tool_call_decodes_input_and_optional_id() {
        let event = InboundEvent::decode(&env(
            "tool_call",
            json!({"tool_name": "bash", "tool_input": {"command": "ls"}}),
        ))
        .unwrap();
        match event {
            InboundEvent::ToolCall { tool, input, call_id } => {
                assert_eq!(tool, ToolKind::Bash);
                assert_eq!(input["command"], "ls");
                assert!(call_id.is_none());
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_tool_result_without_tool_name_is_ignored() {
        assert!(InboundEvent::decode(&env("tool_result", json!({"result": "x"}))).is_none());
    }

    #[test]
    fn test_upload_success_decodes_files() {
        let event = InboundEvent::decode(&env(
            "upload_success",
            json!({"files": [{"path": "/x.png", "saved_path": "/tmp/x.png"}]}),
        ))
        .unwrap();
        assert_eq!(
            event,
            InboundEvent::UploadSuccess {
                files: vec![UploadedFile {
                    path: "/x.png".to_string(),
                    saved_path: "/tmp/x.png".to_string(),
                }]
            }
        );
    }

    #[test]
    fn test_missing_text_is_empty() {
        let event = InboundEvent::decode(&env("agent_response", Value::Null)).unwrap();
        assert_eq!(event, InboundEvent::AgentResponse { text: String::new() });
        assert_eq!(event.kind(), "agent_response");
    }
}
