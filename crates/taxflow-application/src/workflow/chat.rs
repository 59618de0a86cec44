use serde::Serialize;
use taxflow_core::backend::{BackendResult, ChatRequest, ChatResponse};
use taxflow_core::error::Result;
use taxflow_core::session::{Stage, StageKind};
use taxflow_core::{BackendCall, TaxflowError};

use super::{ChatTicket, TaxWorkflow, WorkflowEvent};
use crate::view;

/// A chat turn that has been shown locally and is ready to send.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatTurn {
    ticket: ChatTicket,
    request: ChatRequest,
}

impl ChatTurn {
    pub fn ticket(&self) -> &ChatTicket {
        &self.ticket
    }

    /// Body of the chat-continue call for this turn.
    pub fn request(&self) -> &ChatRequest {
        &self.request
    }
}

/// What became of a chat response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnOutcome {
    /// The returned transcript replaced the local one.
    Applied,
    /// A newer chat call was issued, or the session was replaced, before
    /// this response arrived. Nothing changed.
    Discarded,
}

impl TaxWorkflow {
    /// Opens the advisory chat for the displayed comparison.
    ///
    /// Clears the transcript, shows the loading placeholder and asks the
    /// backend for its opening message. Also used to retry a failed
    /// bootstrap; there is no automatic retry.
    ///
    /// # Errors
    ///
    /// `InvalidStage` unless the chat is loading, or `Remote` if the
    /// bootstrap call fails.
    pub async fn start_chat(&self) -> Result<TurnOutcome> {
        let (ticket, request, chat_view) = {
            let mut state = self.state.write().await;
            let kind = state.stage_kind();
            if kind != StageKind::ChatLoading {
                return self
                    .reject(state, TaxflowError::invalid_stage("start the chat", kind))
                    .await;
            }
            let Some((ticket, request)) = state.prepare_chat_open() else {
                return self.reject(state, TaxflowError::NoSession).await;
            };
            (ticket, request, view::render_chat(&state))
        };
        self.publish(vec![WorkflowEvent::Chat(chat_view)]).await;

        tracing::info!("[Chat] Opening chat for session {}", request.session_id);
        let outcome = self.backend.chat(&request).await;
        self.apply_chat_response(&ticket, BackendCall::OpenChat, outcome)
            .await
    }

    /// Appends a user message to the local transcript and prepares the
    /// chat-continue call carrying it.
    ///
    /// The message is visible to renderers as soon as this returns. Pass the
    /// backend's answer to [`complete_chat_turn`](Self::complete_chat_turn).
    ///
    /// # Errors
    ///
    /// `EmptyMessage` for blank text (nothing is reported), or
    /// `InvalidStage` unless the chat is ready.
    pub async fn begin_chat_turn(&self, text: &str) -> Result<ChatTurn> {
        let text = text.trim();
        if text.is_empty() {
            return Err(TaxflowError::EmptyMessage);
        }

        let (turn, chat_view) = {
            let mut state = self.state.write().await;
            let kind = state.stage_kind();
            if kind != StageKind::ChatReady {
                return self
                    .reject(state, TaxflowError::invalid_stage("send a chat message", kind))
                    .await;
            }
            let Some((ticket, request)) = state.prepare_chat_turn(text) else {
                return self.reject(state, TaxflowError::NoSession).await;
            };
            (ChatTurn { ticket, request }, view::render_chat(&state))
        };
        self.publish(vec![WorkflowEvent::Chat(chat_view)]).await;

        tracing::debug!("[Chat] Turn {} queued", turn.ticket.seq());
        Ok(turn)
    }

    /// Applies the backend's answer to a turn started with
    /// [`begin_chat_turn`](Self::begin_chat_turn).
    ///
    /// # Errors
    ///
    /// `Remote` if the call failed and the turn is still current. The
    /// optimistic user message stays in the transcript.
    pub async fn complete_chat_turn(
        &self,
        turn: ChatTurn,
        outcome: BackendResult<ChatResponse>,
    ) -> Result<TurnOutcome> {
        self.apply_chat_response(&turn.ticket, BackendCall::ContinueChat, outcome)
            .await
    }

    /// Sends one chat turn and waits for the answer.
    pub async fn send_chat_message(&self, text: &str) -> Result<TurnOutcome> {
        let turn = self.begin_chat_turn(text).await?;
        let outcome = self.backend.chat(turn.request()).await;
        self.complete_chat_turn(turn, outcome).await
    }

    async fn apply_chat_response(
        &self,
        ticket: &ChatTicket,
        call: BackendCall,
        outcome: BackendResult<ChatResponse>,
    ) -> Result<TurnOutcome> {
        let mut state = self.state.write().await;
        if !state.accepts(ticket) {
            tracing::debug!(
                "[Chat] Discarding stale {} response #{} for session {}",
                call,
                ticket.seq(),
                ticket.session_id()
            );
            return Ok(TurnOutcome::Discarded);
        }

        let mut events = Vec::new();
        let result = match outcome {
            Ok(response) => {
                tracing::info!(
                    "[Chat] Transcript updated ({} messages)",
                    response.chat_history.len()
                );
                state.replace_chat_history(response.chat_history);
                let before = state.stage_kind();
                mark_chat_ready(state.stage_mut())?;
                if state.stage_kind() != before {
                    events.push(WorkflowEvent::StageChanged(state.stage_kind()));
                }
                Ok(TurnOutcome::Applied)
            }
            Err(source) => {
                tracing::warn!("[Chat] {} failed: {}", call, source);
                let err = TaxflowError::remote(call, source);
                state.push_chat_error(err.to_string());
                Err(err)
            }
        };

        events.push(WorkflowEvent::Chat(view::render_chat(&state)));
        drop(state);
        self.publish(events).await;
        result
    }
}

/// Marks the bootstrap as done. When an upload is in flight the stage it
/// will fall back to is updated instead.
fn mark_chat_ready(stage: &mut Stage) -> Result<()> {
    match stage {
        Stage::ChatLoading { comparison } => {
            let comparison = *comparison;
            stage.advance(Stage::ChatReady { comparison })
        }
        Stage::Uploading { previous } => mark_chat_ready(previous),
        _ => Ok(()),
    }
}
