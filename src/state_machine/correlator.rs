//! Tool-call/result correlation
//!
//! The backend reports results without a reliable call id. Every call is
//! given a correlation key when it is opened (the backend's `tool_call_id` if
//! it sent one, otherwise the id of the message holding the call) and results
//! are matched against the table of open calls:
//!
//! 1. an explicit `tool_call_id` on the result that names an open call wins
//!    (the latest one, if the id was reused);
//! 2. otherwise the most recently opened call for the same tool is used.
//!
//! With one call in flight at a time, rule 2 is the same as pairing a result
//! with the immediately preceding call.

use crate::tools::ToolKind;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
struct OpenCall {
    call_id: String,
    message_id: String,
    tool: ToolKind,
}

/// Table of tool calls still waiting for their result, oldest first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Correlator {
    open: Vec<OpenCall>,
}

/// Outcome of matching a result against the open calls
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Matched { message_id: String, call_id: String },
    Unmatched,
}

impl Correlator {
    pub fn open(&mut self, call_id: impl Into<String>, message_id: impl Into<String>, tool: ToolKind) {
        let call_id = call_id.into();
        if self.open.iter().any(|c| c.call_id == call_id) {
            tracing::warn!(call_id = %call_id, "Tool call id reused while an earlier call is still open");
        }
        self.open.push(OpenCall {
            call_id,
            message_id: message_id.into(),
            tool,
        });
    }

    /// Find and close the call a result belongs to
    pub fn resolve(&mut self, tool: &ToolKind, call_id: Option<&str>) -> Resolution {
        let explicit = call_id.and_then(|id| self.open.iter().rposition(|c| c.call_id == id));
        let index = explicit.or_else(|| self.open.iter().rposition(|c| &c.tool == tool));

        match index {
            Some(index) => {
                let call = self.open.remove(index);
                Resolution::Matched {
                    message_id: call.message_id,
                    call_id: call.call_id,
                }
            }
            None => Resolution::Unmatched,
        }
    }

    /// Forget calls whose message is no longer in the transcript
    pub fn retain_messages(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.open.retain(|c| keep(&c.message_id));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.open.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }
}

/// Text shown for a call that is flattened into an ordinary assistant message
#[must_use]
pub fn call_text(tool: &ToolKind, input: &Value) -> Option<String> {
    let keys: &[&str] = match tool {
        ToolKind::SequentialThinking => &["thought"],
        ToolKind::MessageUser => &["text"],
        ToolKind::ReturnControlToUser => &["text", "message"],
        _ => return None,
    };
    keys.iter()
        .find_map(|key| input.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}

/// Payload stored on the action step when a result is merged in.
///
/// Browser interaction results keep only the data of the first image block;
/// every other tool keeps the raw payload.
#[must_use]
pub fn merged_result(tool: &ToolKind, result: Value) -> Option<Value> {
    if !tool.is_browser_interaction() {
        return Some(result);
    }
    let Value::Array(blocks) = result else {
        return None;
    };
    blocks
        .into_iter()
        .find(|block| block.get("type").and_then(Value::as_str) == Some("image"))
        .and_then(|block| block.get("source")?.get("data").cloned())
}

/// The URL a call navigates to, if its input carries one
#[must_use]
pub fn navigation_url(input: &Value) -> Option<&str> {
    input
        .get("url")
        .and_then(Value::as_str)
        .filter(|url| !url.is_empty())
}
