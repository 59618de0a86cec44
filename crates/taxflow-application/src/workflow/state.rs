//! Workflow state - the single owned value behind a [`super::TaxWorkflow`].
//!
//! Holds the live session, the current stage and what the user was last
//! told. Chat calls are tagged with tickets so that only the most recently
//! issued call for the current session may touch the transcript.

use serde::Serialize;
use taxflow_core::backend::ChatRequest;
use taxflow_core::extraction::ExtractedData;
use taxflow_core::session::{ChatMessage, Stage, StageKind, WorkflowSession};

/// Severity of a status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusLevel {
    Success,
    Error,
}

/// The single inline status line shown above the workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusMessage {
    pub level: StatusLevel,
    pub text: String,
}

impl StatusMessage {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            level: StatusLevel::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: StatusLevel::Error,
            text: text.into(),
        }
    }
}

/// Identifies one issued chat call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatTicket {
    seq: u64,
    session_id: String,
}

impl ChatTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

/// Client-held workflow state.
///
/// At most one session is live. Installing a new one replaces the previous
/// session together with its transcript.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WorkflowState {
    session: Option<WorkflowSession>,
    stage: Stage,
    status: Option<StatusMessage>,
    /// Inline error lines under the transcript, cleared on every re-render
    chat_errors: Vec<String>,
    /// Sequence number of the last issued chat call
    chat_seq: u64,
}

impl WorkflowState {
    pub fn new() -> Self {
        Self::default()
    }

    // ============================================================================
    // Session
    // ============================================================================

    pub fn session(&self) -> Option<&WorkflowSession> {
        self.session.as_ref()
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.id.as_str())
    }

    pub fn extracted(&self) -> Option<&ExtractedData> {
        self.session.as_ref().map(|s| &s.extracted)
    }

    /// Canonical transcript of the live session, empty without one.
    pub fn chat_history(&self) -> &[ChatMessage] {
        self.session
            .as_ref()
            .map(|s| s.chat_history.as_slice())
            .unwrap_or_default()
    }

    /// Replaces the live session unconditionally.
    pub fn install_session(&mut self, session: WorkflowSession) {
        if let Some(previous) = self.session.as_ref() {
            tracing::debug!(
                "[Workflow] Replacing session {} with {}",
                previous.id,
                session.id
            );
        }
        self.session = Some(session);
        self.chat_errors.clear();
    }

    // ============================================================================
    // Stage
    // ============================================================================

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn stage_kind(&self) -> StageKind {
        self.stage.kind()
    }

    /// The stage whose content is on screen. While an upload is in flight
    /// that is the stage the upload started from.
    pub fn displayed_stage(&self) -> &Stage {
        let mut stage = &self.stage;
        while let Stage::Uploading { previous } = stage {
            stage = previous;
        }
        stage
    }

    pub(crate) fn stage_mut(&mut self) -> &mut Stage {
        &mut self.stage
    }

    // ============================================================================
    // Status
    // ============================================================================

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    pub fn set_status(&mut self, status: StatusMessage) {
        self.status = Some(status);
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    // ============================================================================
    // Chat
    // ============================================================================

    pub fn chat_errors(&self) -> &[String] {
        &self.chat_errors
    }

    pub(crate) fn push_chat_error(&mut self, message: impl Into<String>) {
        self.chat_errors.push(message.into());
    }

    /// Clears the transcript and builds the chat-open call.
    pub(crate) fn prepare_chat_open(&mut self) -> Option<(ChatTicket, ChatRequest)> {
        let session = self.session.as_mut()?;
        session.chat_history.clear();
        let request = ChatRequest::open(session.id.clone(), session.extracted.clone());

        self.chat_errors.clear();
        let ticket = self.issue_chat_ticket(&request.session_id);
        Some((ticket, request))
    }

    /// Appends the user's message and builds the chat-continue call whose
    /// history includes it.
    pub(crate) fn prepare_chat_turn(&mut self, text: &str) -> Option<(ChatTicket, ChatRequest)> {
        let session = self.session.as_mut()?;
        session.chat_history.push(ChatMessage::user(text));
        let request = ChatRequest::turn(
            session.id.clone(),
            text,
            session.chat_history.clone(),
            session.extracted.clone(),
        );

        self.chat_errors.clear();
        let ticket = self.issue_chat_ticket(&request.session_id);
        Some((ticket, request))
    }

    /// Replaces the transcript with the backend's copy.
    pub(crate) fn replace_chat_history(&mut self, history: Vec<ChatMessage>) {
        if let Some(session) = self.session.as_mut() {
            session.chat_history = history;
        }
        self.chat_errors.clear();
    }

    /// Issues a ticket for a new chat call against the live session.
    /// Any ticket issued earlier becomes stale.
    pub(crate) fn issue_chat_ticket(&mut self, session_id: &str) -> ChatTicket {
        self.chat_seq += 1;
        ChatTicket {
            seq: self.chat_seq,
            session_id: session_id.to_string(),
        }
    }

    /// Whether a response for `ticket` may still be applied.
    pub fn accepts(&self, ticket: &ChatTicket) -> bool {
        ticket.seq == self.chat_seq && self.session_id() == Some(ticket.session_id.as_str())
    }
}
