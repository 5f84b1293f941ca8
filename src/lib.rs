//! Agent session transcripts
//!
//! Reconstructs a single consistent transcript, plus the action that drives
//! the auxiliary view, from the event stream an agent backend emits. Live
//! events and replayed session logs go through the same reducer.

pub mod api;
pub mod config;
pub mod protocol;
pub mod runtime;
pub mod state_machine;
pub mod tools;
pub mod view;
