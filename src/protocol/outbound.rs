//! Outbound commands sent to the backend

use serde::{Deserialize, Serialize};

/// Agent tool configuration sent with `init_agent`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolSettings {
    /// Extended multi-step research behavior
    pub deep_research: bool,
    /// Document extraction
    pub pdf: bool,
    /// Web browsing tool
    pub browser: bool,
    /// 0 selects the standard reasoning budget, anything above it the extended one
    pub thinking_tokens: u32,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            deep_research: false,
            pdf: true,
            browser: true,
            thinking_tokens: 10_000,
        }
    }
}

/// Which corpora a query may search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    #[default]
    All,
    Internal,
    External,
}

/// Reasoning configuration for `enhance_prompt`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ThinkingArgs {
    pub thinking_tokens: u32,
}

/// Outbound `{type, content}` envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "content", rename_all = "snake_case")]
pub enum Command {
    InitAgent {
        model_name: String,
        tool_args: ToolSettings,
    },
    Query {
        text: String,
        resume: bool,
        files: Vec<String>,
        search_mode: SearchMode,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        file_type_filter: Option<Vec<String>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        path_filter: Option<String>,
    },
    EditQuery {
        text: String,
        files: Vec<String>,
    },
    Cancel {},
    EnhancePrompt {
        model_name: String,
        text: String,
        files: Vec<String>,
        tool_args: ThinkingArgs,
    },
}

/// Discriminant of [`Command`], used to pick which in-flight flag a dropped command clears
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    InitAgent,
    Query,
    EditQuery,
    Cancel,
    EnhancePrompt,
}

impl Command {
    #[must_use]
    pub fn kind(&self) -> CommandKind {
        match self {
            Self::InitAgent { .. } => CommandKind::InitAgent,
            Self::Query { .. } => CommandKind::Query,
            Self::EditQuery { .. } => CommandKind::EditQuery,
            Self::Cancel {} => CommandKind::Cancel,
            Self::EnhancePrompt { .. } => CommandKind::EnhancePrompt,
        }
    }
}

impl std::fmt::Display for CommandKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::InitAgent => "init_agent",
            Self::Query => "query",
            Self::EditQuery => "edit_query",
            Self::Cancel => "cancel",
            Self::EnhancePrompt => "enhance_prompt",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cancel_serializes_with_empty_content() {
        let value = serde_json::to_value(Command::Cancel {}).unwrap();
        assert_eq!(value, json!({"type": "cancel", "content": {}}));
    }

    #[test]
    fn test_query_omits_absent_filters() {
        let value = serde_json::to_value(Command::Query {
            text: "find revenue".to_string(),
            resume: false,
            files: vec!["./uploads/a.csv".to_string()],
            search_mode: SearchMode::Internal,
            file_type_filter: None,
            path_filter: None,
        })
        .unwrap();
        assert_eq!(
            value,
            json!({
                "type": "query",
                "content": {
                    "text": "find revenue",
                    "resume": false,
                    "files": ["./uploads/a.csv"],
                    "search_mode": "internal"
                }
            })
        );
    }

    #[test]
    fn test_init_agent_carries_tool_settings() {
        let value = serde_json::to_value(Command::InitAgent {
            model_name: "m".to_string(),
            tool_args: ToolSettings::default(),
        })
        .unwrap();
        assert_eq!(value["content"]["tool_args"]["thinking_tokens"], 10_000);
        assert_eq!(value["content"]["tool_args"]["pdf"], true);
    }

    #[test]
    fn test_command_kind_display() {
        assert_eq!(Command::Cancel {}.kind().to_string(), "cancel");
    }
}
