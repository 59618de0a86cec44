//! Session domain module.
//!
//! This module contains the client-held workflow session, the chat
//! transcript types and the stage state machine.
//!
//! # Module Structure
//!
//! - `model`: The live workflow session (`WorkflowSession`)
//! - `message`: Chat message types (`MessageRole`, `ChatMessage`)
//! - `stage`: Stage state machine (`Stage`, `StageKind`)

mod message;
mod model;
mod stage;

// Re-export public API
pub use message::{ChatMessage, MessageRole};
pub use model::WorkflowSession;
pub use stage::{Stage, StageKind};
