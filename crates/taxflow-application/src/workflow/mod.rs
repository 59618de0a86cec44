//! Workflow controller.
//!
//! [`TaxWorkflow`] is a cheap, cloneable handle over the single
//! [`WorkflowState`]. Stage handlers live in submodules:
//! - `upload`: document upload and session creation
//! - `review`: form edits, persist-then-calculate submission
//! - `chat`: chat bootstrap and turns
//!
//! Handlers never hold the state lock across a backend call. They validate
//! and move to the in-flight stage under the lock, release it for the call,
//! then re-acquire it to apply the outcome.

mod chat;
mod event;
mod review;
mod state;
mod upload;

pub use chat::{ChatTurn, TurnOutcome};
pub use event::WorkflowEvent;
pub use state::{ChatTicket, StatusLevel, StatusMessage, WorkflowState};

use std::sync::Arc;

use taxflow_core::TaxflowError;
use taxflow_core::backend::TaxBackend;
use taxflow_core::error::Result;
use taxflow_core::session::StageKind;
use tokio::sync::{Mutex, RwLock, RwLockWriteGuard, mpsc};

use crate::view::{self, WorkflowView};

/// Drives one user through upload, review, comparison and chat.
#[derive(Clone)]
pub struct TaxWorkflow {
    state: Arc<RwLock<WorkflowState>>,
    backend: Arc<dyn TaxBackend>,
    subscribers: Arc<Mutex<Vec<mpsc::UnboundedSender<WorkflowEvent>>>>,
}

impl TaxWorkflow {
    /// Creates a workflow in the `Idle` stage with no session.
    pub fn new(backend: Arc<dyn TaxBackend>) -> Self {
        Self {
            state: Arc::new(RwLock::new(WorkflowState::new())),
            backend,
            subscribers: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Returns a copy of the current state.
    pub async fn snapshot(&self) -> WorkflowState {
        self.state.read().await.clone()
    }

    /// Renders the current state.
    pub async fn view(&self) -> WorkflowView {
        view::render(&*self.state.read().await)
    }

    pub async fn stage(&self) -> StageKind {
        self.state.read().await.stage_kind()
    }

    /// Registers a new event subscriber.
    ///
    /// Dropping the receiver unsubscribes it on the next publish.
    pub async fn subscribe(&self) -> mpsc::UnboundedReceiver<WorkflowEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.lock().await.push(tx);
        rx
    }

    async fn publish(&self, events: Vec<WorkflowEvent>) {
        if events.is_empty() {
            return;
        }
        let mut subscribers = self.subscribers.lock().await;
        for event in events {
            subscribers.retain(|tx| tx.send(event.clone()).is_ok());
        }
    }

    /// Reports a local failure on the status line and returns it.
    async fn reject<T>(
        &self,
        mut state: RwLockWriteGuard<'_, WorkflowState>,
        err: TaxflowError,
    ) -> Result<T> {
        tracing::debug!("[Workflow] Rejected in {}: {}", state.stage_kind(), err);
        let status = StatusMessage::error(err.to_string());
        state.set_status(status.clone());
        drop(state);

        self.publish(vec![WorkflowEvent::Status(Some(status))]).await;
        Err(err)
    }
}
