//! Tool categories the agent backend reports
//!
//! The backend names tools with plain strings. Known names map onto a closed
//! set of variants; anything else is carried through as [`ToolKind::Other`] so
//! it can still be stored as an action step.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ToolKind {
    SequentialThinking,
    MessageUser,
    ReturnControlToUser,
    Presentation,
    Bash,
    StrReplaceEditor,
    WebSearch,
    VisitWebpage,
    ImageSearch,
    ImageGenerate,
    BrowserUse,
    BrowserView,
    BrowserNavigation,
    BrowserRestart,
    BrowserWait,
    BrowserScrollDown,
    BrowserScrollUp,
    BrowserClick,
    BrowserEnterText,
    BrowserPressKey,
    BrowserGetSelectOptions,
    BrowserSelectDropdownOption,
    BrowserSwitchTab,
    BrowserOpenNewTab,
    InternalSearch,
    ContentSearch,
    ListFiles,
    ReadFile,
    WriteToFile,
    GenerateReport,
    Other(String),
}

impl ToolKind {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::SequentialThinking => "sequential_thinking",
            Self::MessageUser => "message_user",
            Self::ReturnControlToUser => "return_control_to_user",
            Self::Presentation => "presentation",
            Self::Bash => "bash",
            Self::StrReplaceEditor => "str_replace_editor",
            Self::WebSearch => "web_search",
            Self::VisitWebpage => "visit_webpage",
            Self::ImageSearch => "image_search",
            Self::ImageGenerate => "generate_image_from_text",
            Self::BrowserUse => "browser_use",
            Self::BrowserView => "browser_view",
            Self::BrowserNavigation => "browser_navigation",
            Self::BrowserRestart => "browser_restart",
            Self::BrowserWait => "browser_wait",
            Self::BrowserScrollDown => "browser_scroll_down",
            Self::BrowserScrollUp => "browser_scroll_up",
            Self::BrowserClick => "browser_click",
            Self::BrowserEnterText => "browser_enter_text",
            Self::BrowserPressKey => "browser_press_key",
            Self::BrowserGetSelectOptions => "browser_get_select_options",
            Self::BrowserSelectDropdownOption => "browser_select_dropdown_option",
            Self::BrowserSwitchTab => "browser_switch_tab",
            Self::BrowserOpenNewTab => "browser_open_new_tab",
            Self::InternalSearch => "internal_search",
            Self::ContentSearch => "content_search",
            Self::ListFiles => "list_files",
            Self::ReadFile => "read_file",
            Self::WriteToFile => "write_to_file",
            Self::GenerateReport => "generate_report",
            Self::Other(name) => name,
        }
    }

    /// Tools whose call is shown as plain assistant text instead of an action step
    #[must_use]
    pub fn is_flattened_to_text(&self) -> bool {
        matches!(
            self,
            Self::SequentialThinking | Self::MessageUser | Self::ReturnControlToUser
        )
    }

    /// Tools whose results never reach the transcript as action steps
    #[must_use]
    pub fn drops_result(&self) -> bool {
        self.is_flattened_to_text() || matches!(self, Self::Presentation)
    }

    /// Browser tools whose result is reduced to the first screenshot
    #[must_use]
    pub fn is_browser_interaction(&self) -> bool {
        matches!(
            self,
            Self::BrowserView
                | Self::BrowserNavigation
                | Self::BrowserRestart
                | Self::BrowserWait
                | Self::BrowserScrollDown
                | Self::BrowserScrollUp
                | Self::BrowserClick
                | Self::BrowserEnterText
                | Self::BrowserPressKey
                | Self::BrowserGetSelectOptions
                | Self::BrowserSelectDropdownOption
                | Self::BrowserSwitchTab
                | Self::BrowserOpenNewTab
        )
    }
}

impl From<&str> for ToolKind {
    fn from(name: &str) -> Self {
        match name {
            "sequential_thinking" => Self::SequentialThinking,
            "message_user" => Self::MessageUser,
            "return_control_to_user" => Self::ReturnControlToUser,
            "presentation" => Self::Presentation,
            "bash" => Self::Bash,
            "str_replace_editor" => Self::StrReplaceEditor,
            "web_search" => Self::WebSearch,
            "visit_webpage" => Self::VisitWebpage,
            "image_search" => Self::ImageSearch,
            "generate_image_from_text" => Self::ImageGenerate,
            "browser_use" => Self::BrowserUse,
            "browser_view" => Self::BrowserView,
            "browser_navigation" => Self::BrowserNavigation,
            "browser_restart" => Self::BrowserRestart,
            "browser_wait" => Self::BrowserWait,
            "browser_scroll_down" => Self::BrowserScrollDown,
            "browser_scroll_up" => Self::BrowserScrollUp,
            "browser_click" => Self::BrowserClick,
            "browser_enter_text" => Self::BrowserEnterText,
            "browser_press_key" => Self::BrowserPressKey,
            "browser_get_select_options" => Self::BrowserGetSelectOptions,
            "browser_select_dropdown_option" => Self::BrowserSelectDropdownOption,
            "browser_switch_tab" => Self::BrowserSwitchTab,
            "browser_open_new_tab" => Self::BrowserOpenNewTab,
            "internal_search" => Self::InternalSearch,
            "content_search" => Self::ContentSearch,
            "list_files" => Self::ListFiles,
            "read_file" => Self::ReadFile,
            "write_to_file" => Self::WriteToFile,
            "generate_report" => Self::GenerateReport,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for ToolKind {
    fn from(name: String) -> Self {
        match ToolKind::from(name.as_str()) {
            Self::Other(_) => Self::Other(name),
            known => known,
        }
    }
}

impl From<ToolKind> for String {
    fn from(kind: ToolKind) -> Self {
        match kind {
            ToolKind::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
