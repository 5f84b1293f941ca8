//! Auxiliary view derived from the current action
//!
//! Nothing here owns state: the surface, its content and the terminal writes
//! are all computed from [`AppState`](crate::state_machine::AppState).

mod content;
mod router;
mod terminal;

pub use content::{content_for, BrowserView, CodeView, ImageView, SearchHit, SearchView, SurfaceContent};
pub use router::{route, Surface};
pub use terminal::{Scrollback, TerminalReplay, TerminalSink, TerminalWrite, PROMPT_MARKER};
