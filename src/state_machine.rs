//! Transcript state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions: every
//! inbound event and user action is an [`Action`] fed to [`reduce`], which
//! returns the next [`AppState`] plus the [`Effect`]s the runtime must execute.

mod action;
pub mod correlator;
mod effect;
pub(crate) mod reduce;
pub mod state;

#[cfg(test)]
mod proptests;

pub use action::Action;
pub use correlator::{Correlator, Resolution};
pub use effect::{Effect, NotifyLevel};
pub use reduce::{reduce, Transition};
pub use state::{ActionData, ActionStep, AppState, Message, Role, SessionContext, Tab};
