//! Workflow stage state machine.
//!
//! Stages only move forward. A failed async step returns to the stage that
//! issued it so the same action can be retried; a failed upload restores
//! whatever stage was showing before the upload began.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TaxflowError};
use crate::review::ReviewForm;
use crate::tax::{TaxComparison, TaxComputation};

/// Fieldless mirror of [`Stage`], used in errors, events and logs.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StageKind {
    Idle,
    Uploading,
    Reviewing,
    Submitting,
    Comparing,
    ChatLoading,
    ChatReady,
}

impl StageKind {
    /// Whether an async call owned by this stage is in flight.
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Uploading | Self::Submitting)
    }

    /// Whether the workflow may move from `self` to `next`.
    pub fn permits(&self, next: StageKind) -> bool {
        use StageKind::*;
        match (self, next) {
            // A new upload may start from any resting stage.
            (from, Uploading) => !from.is_busy(),
            (Uploading, to) => !to.is_busy(),
            (Reviewing, Submitting) => true,
            (Submitting, Reviewing | Comparing) => true,
            (Comparing, ChatLoading) => true,
            (ChatLoading, ChatLoading | ChatReady) => true,
            (ChatReady, ChatReady) => true,
            _ => false,
        }
    }
}

/// Current stage of the workflow, carrying the data that stage displays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Stage {
    /// Nothing uploaded yet.
    #[default]
    Idle,
    /// Upload in flight. Holds the stage to restore if it fails.
    Uploading { previous: Box<Stage> },
    /// Review form visible and editable.
    Reviewing { form: ReviewForm },
    /// Review persisted and tax calculation in progress.
    Submitting { form: ReviewForm },
    /// Tax result received but incomplete; nothing is displayed.
    Comparing { computation: TaxComputation },
    /// Comparison shown; chat bootstrap pending or failed.
    ChatLoading { comparison: TaxComparison },
    /// Comparison shown and chat transcript available.
    ChatReady { comparison: TaxComparison },
}

impl Stage {
    pub fn kind(&self) -> StageKind {
        match self {
            Self::Idle => StageKind::Idle,
            Self::Uploading { .. } => StageKind::Uploading,
            Self::Reviewing { .. } => StageKind::Reviewing,
            Self::Submitting { .. } => StageKind::Submitting,
            Self::Comparing { .. } => StageKind::Comparing,
            Self::ChatLoading { .. } => StageKind::ChatLoading,
            Self::ChatReady { .. } => StageKind::ChatReady,
        }
    }

    /// Moves to `next` if the state machine allows it.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` and leaves the stage untouched otherwise.
    pub fn advance(&mut self, next: Stage) -> Result<()> {
        let (from, to) = (self.kind(), next.kind());
        if !from.permits(to) {
            return Err(TaxflowError::InvalidTransition { from, to });
        }
        *self = next;
        Ok(())
    }

    /// Enters `Uploading`, remembering the current stage.
    pub fn begin_upload(&mut self) -> Result<()> {
        let previous = Box::new(self.clone());
        self.advance(Stage::Uploading { previous })
    }

    /// Leaves `Uploading` after a failure, restoring the pre-upload stage.
    pub fn abort_upload(&mut self) -> Result<()> {
        match std::mem::take(self) {
            Stage::Uploading { previous } => {
                *self = *previous;
                Ok(())
            }
            other => {
                let from = other.kind();
                *self = other;
                Err(TaxflowError::InvalidTransition {
                    from,
                    to: StageKind::Idle,
                })
            }
        }
    }

    /// Review form currently displayed, if any.
    pub fn review_form(&self) -> Option<&ReviewForm> {
        match self {
            Self::Reviewing { form } | Self::Submitting { form } => Some(form),
            _ => None,
        }
    }

    /// Comparison currently displayed, if any.
    pub fn comparison(&self) -> Option<&TaxComparison> {
        match self {
            Self::ChatLoading { comparison } | Self::ChatReady { comparison } => Some(comparison),
            _ => None,
        }
    }
}
