//! Wire protocol shared with the agent backend
//!
//! Every message in either direction is an envelope whose `content` schema is
//! keyed by its `type`. Inbound envelopes additionally carry an `id`.

mod envelope;
mod inbound;
mod outbound;

pub use envelope::Envelope;
pub use inbound::{InboundEvent, UploadedFile};
pub use outbound::{Command, CommandKind, SearchMode, ThinkingArgs, ToolSettings};
