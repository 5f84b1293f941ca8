//! Terminal scrollback replay for shell actions
//!
//! Focusing a shell action writes its command and output into the terminal.
//! Each message renders each phase at most once, no matter how often it is
//! focused again.

use crate::state_machine::Message;
use crate::tools::ToolKind;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;

/// Written after the output of every command
pub const PROMPT_MARKER: &str = "$ ";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum TerminalWrite {
    /// Text followed by a line break
    Line(String),
    /// Text written as-is
    Raw(String),
}

pub trait TerminalSink {
    fn write(&mut self, write: &TerminalWrite);
}

/// In-memory terminal used by the CLI and tests
#[derive(Debug, Default)]
pub struct Scrollback {
    lines: Vec<String>,
    pending: String,
}

impl Scrollback {
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Text written since the last line break
    #[must_use]
    pub fn pending(&self) -> &str {
        &self.pending
    }
}

impl TerminalSink for Scrollback {
    fn write(&mut self, write: &TerminalWrite) {
        match write {
            TerminalWrite::Line(text) => {
                let mut line = std::mem::take(&mut self.pending);
                line.push_str(text);
                self.lines.push(line);
            }
            TerminalWrite::Raw(text) => self.pending.push_str(text),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Phase {
    Command,
    Output,
}

#[derive(Debug, Default)]
pub struct TerminalReplay {
    rendered: HashSet<(String, Phase)>,
}

impl TerminalReplay {
    /// Writes for a focused message that have not been emitted yet
    pub fn render(&mut self, message: &Message) -> Vec<TerminalWrite> {
        let Some(step) = message.action.as_ref().filter(|a| a.tool == ToolKind::Bash) else {
            return Vec::new();
        };

        let mut writes = Vec::new();
        if self.rendered.insert((message.id.clone(), Phase::Command)) {
            let command = step.input_str("command").unwrap_or_default();
            writes.push(TerminalWrite::Line(command.to_string()));
        }

        if let Some(result) = step.data.result.as_ref().filter(|_| step.data.is_result) {
            if self.rendered.insert((message.id.clone(), Phase::Output)) {
                let output = match result {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                writes.extend(output.split('\n').map(|line| TerminalWrite::Line(line.to_string())));
                writes.push(TerminalWrite::Raw(PROMPT_MARKER.to_string()));
            }
        }
        writes
    }

    /// Forget everything rendered; used when the transcript is replaced
    pub fn reset(&mut self) {
        self.rendered.clear();
    }
}
