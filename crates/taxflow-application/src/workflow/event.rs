//! Events published by the workflow whenever something on screen changes.

use serde::Serialize;
use taxflow_core::session::StageKind;

use super::state::StatusMessage;
use crate::view::{ChatView, ComparisonView, ReviewFormView};

/// A change a front-end should re-render.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum WorkflowEvent {
    /// The workflow moved to a new stage.
    StageChanged(StageKind),
    /// The status line was replaced or cleared.
    Status(Option<StatusMessage>),
    /// The review form was rendered or edited.
    ReviewForm(ReviewFormView),
    /// The review form was hidden after a successful submission.
    ReviewFormHidden,
    /// A complete comparison is ready for display.
    Comparison(ComparisonView),
    /// The chat panel changed (placeholder, transcript or error lines).
    Chat(ChatView),
}
