//! Tool category to auxiliary surface mapping

use crate::state_machine::Tab;
use crate::tools::ToolKind;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Surface {
    Search,
    Image,
    Browser,
    Terminal,
    Code,
    Placeholder,
}

impl Surface {
    /// Tab that hosts the surface; the placeholder leaves the tab alone
    #[must_use]
    pub fn tab(self) -> Option<Tab> {
        match self {
            Surface::Search | Surface::Image | Surface::Browser => Some(Tab::Browser),
            Surface::Terminal => Some(Tab::Terminal),
            Surface::Code => Some(Tab::Code),
            Surface::Placeholder => None,
        }
    }
}

/// Pick the surface for the current action's tool
#[must_use]
pub fn route(tool: Option<&ToolKind>) -> Surface {
    let Some(tool) = tool else {
        return Surface::Placeholder;
    };
    match tool {
        ToolKind::WebSearch => Surface::Search,
        ToolKind::ImageGenerate | ToolKind::ImageSearch => Surface::Image,
        ToolKind::BrowserUse | ToolKind::VisitWebpage => Surface::Browser,
        t if t.is_browser_interaction() => Surface::Browser,
        ToolKind::Bash => Surface::Terminal,
        ToolKind::StrReplaceEditor => Surface::Code,
        _ => Surface::Placeholder,
    }
}
