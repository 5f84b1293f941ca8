//! View models for the auxiliary surfaces

use super::router::{route, Surface};
use crate::state_machine::{ActionStep, AppState};
use crate::tools::ToolKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "surface", rename_all = "snake_case")]
pub enum SurfaceContent {
    Placeholder,
    Search(SearchView),
    Image(ImageView),
    Browser(BrowserView),
    Terminal,
    Code(CodeView),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BrowserView {
    pub url: String,
    /// Base64 screenshot of a browser interaction
    pub screenshot: Option<String>,
    /// Page text returned by a webpage visit
    pub raw: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchView {
    pub query: Option<String>,
    pub hits: Vec<SearchHit>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageView {
    pub label: Option<String>,
    pub images: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CodeView {
    pub path: String,
    pub content: Option<String>,
}

#[derive(Deserialize)]
struct ImageHit {
    image_url: String,
}

/// Derive what the routed surface should display
#[must_use]
pub fn content_for(state: &AppState) -> SurfaceContent {
    let step = state.current_action();
    match route(step.map(|s| &s.tool)) {
        Surface::Placeholder => SurfaceContent::Placeholder,
        Surface::Terminal => SurfaceContent::Terminal,
        Surface::Browser => SurfaceContent::Browser(browser(state, step)),
        Surface::Search => SurfaceContent::Search(SearchView {
            query: step.and_then(|s| s.input_str("query")).map(str::to_string),
            hits: step
                .and_then(|s| structured::<Vec<SearchHit>>(s.data.result.as_ref()))
                .unwrap_or_default(),
        }),
        Surface::Image => SurfaceContent::Image(image(step)),
        Surface::Code => SurfaceContent::Code(code(state, step)),
    }
}

fn browser(state: &AppState, step: Option<&ActionStep>) -> BrowserView {
    let result_text = || step.and_then(|s| s.data.result.as_ref()).and_then(Value::as_str).map(str::to_string);
    let tool = step.map(|s| &s.tool);
    BrowserView {
        url: step
            .and_then(|s| s.input_str("url"))
            .unwrap_or(state.browser_url.as_str())
            .to_string(),
        screenshot: tool.filter(|t| t.is_browser_interaction()).and_then(|_| result_text()),
        raw: tool.filter(|t| **t == ToolKind::VisitWebpage).and_then(|_| result_text()),
    }
}

fn image(step: Option<&ActionStep>) -> ImageView {
    let output = step.and_then(|s| s.input_str("output_filename"));
    let label = output
        .or_else(|| step.and_then(|s| s.input_str("query")))
        .map(str::to_string);
    let images = match step.map(|s| &s.tool) {
        Some(ToolKind::ImageSearch) => step
            .and_then(|s| structured::<Vec<ImageHit>>(s.data.result.as_ref()))
            .map(|hits| hits.into_iter().map(|h| h.image_url).collect())
            .unwrap_or_default(),
        _ => output.map(|o| vec![o.to_string()]).unwrap_or_default(),
    };
    ImageView { label, images }
}

fn code(state: &AppState, step: Option<&ActionStep>) -> CodeView {
    let content = state
        .files_content
        .get(&state.active_file)
        .cloned()
        .or_else(|| step.and_then(|s| s.input_str("file_text")).map(str::to_string));
    CodeView {
        path: state.active_file.clone(),
        content,
    }
}

/// Decode a structured result that may arrive as JSON text or as JSON.
/// Anything malformed is treated as absent.
fn structured<T: serde::de::DeserializeOwned>(result: Option<&Value>) -> Option<T> {
    let parsed = match result? {
        Value::String(text) => serde_json::from_str(text),
        other => serde_json::from_value(other.clone()),
    };
    match parsed {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!(error = %e, "Malformed structured tool result");
            None
        }
    }
}
