//! Workflow session model.
//!
//! The session is the single piece of client-held state correlating an
//! upload, the reviewed data and the chat transcript across otherwise
//! stateless backend calls.

use serde::{Deserialize, Serialize};

use super::message::ChatMessage;
use crate::extraction::ExtractedData;

/// A live session issued by the backend on a successful upload.
///
/// Exactly one session is live at a time. It is held in memory only and
/// disappears with the process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowSession {
    /// Opaque identifier issued by the backend
    pub id: String,
    /// Field values extracted from the uploaded document
    pub extracted: ExtractedData,
    /// Canonical chat transcript, replaced wholesale by each chat response
    pub chat_history: Vec<ChatMessage>,
    /// Timestamp when the session was installed (ISO 8601 format)
    pub created_at: String,
}

impl WorkflowSession {
    pub fn new(id: impl Into<String>, extracted: ExtractedData) -> Self {
        Self {
            id: id.into(),
            extracted,
            chat_history: Vec::new(),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}
