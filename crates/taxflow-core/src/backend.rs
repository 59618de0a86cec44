//! Backend port.
//!
//! Defines the request/response contract of the remote services the workflow
//! talks to. Document extraction, tax computation and chat generation all
//! happen behind this trait; the workflow only sees its inputs and outputs.

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{BackendError, Result};
use crate::extraction::ExtractedData;
use crate::review::ReviewSubmission;
use crate::session::ChatMessage;
use crate::tax::TaxComputation;

/// A type alias for results returned by backend implementations.
pub type BackendResult<T> = std::result::Result<T, BackendError>;

/// A document selected for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadDocument {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl UploadDocument {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    /// Reads a document from disk.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the file cannot be read.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document.pdf".to_string());
        Ok(Self { file_name, bytes })
    }
}

/// Successful upload: a new session and its initial extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub session_id: String,
    #[serde(default)]
    pub extracted_data: ExtractedData,
}

/// Body of the calculate-tax call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculateTaxRequest {
    pub session_id: String,
    pub data: ReviewSubmission,
}

/// Body of the chat call.
///
/// The bootstrap call carries an empty history and no `user_message`; turns
/// carry both the new message and the full transcript including it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub session_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_message: Option<String>,
    pub chat_history: Vec<ChatMessage>,
    pub user_data: ExtractedData,
}

impl ChatRequest {
    /// Opening call: empty history, extraction as context.
    pub fn open(session_id: impl Into<String>, user_data: ExtractedData) -> Self {
        Self {
            session_id: session_id.into(),
            user_message: None,
            chat_history: Vec::new(),
            user_data,
        }
    }

    /// Follow-up call for one user turn.
    pub fn turn(
        session_id: impl Into<String>,
        user_message: impl Into<String>,
        chat_history: Vec<ChatMessage>,
        user_data: ExtractedData,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            user_message: Some(user_message.into()),
            chat_history,
            user_data,
        }
    }
}

/// Canonical transcript returned by the chat call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub chat_history: Vec<ChatMessage>,
}

/// An abstract backend for the four workflow calls.
///
/// Any non-success outcome is reported as a [`BackendError`]; callers treat
/// every variant the same way.
#[async_trait]
pub trait TaxBackend: Send + Sync {
    /// Uploads a document and returns a new session with its extraction.
    async fn upload_document(&self, document: &UploadDocument) -> BackendResult<UploadResponse>;

    /// Persists reviewed values against a session.
    async fn submit_review(
        &self,
        session_id: &str,
        submission: &ReviewSubmission,
    ) -> BackendResult<()>;

    /// Computes both regimes for the reviewed values.
    async fn calculate_tax(&self, request: &CalculateTaxRequest) -> BackendResult<TaxComputation>;

    /// Opens or continues the advisory chat.
    async fn chat(&self, request: &ChatRequest) -> BackendResult<ChatResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_open_request_has_no_user_message() {
        let data: ExtractedData = serde_json::from_value(json!({"gross_salary": 1})).unwrap();
        let body = serde_json::to_value(ChatRequest::open("s-1", data)).unwrap();

        assert_eq!(
            body,
            json!({"session_id": "s-1", "chat_history": [], "user_data": {"gross_salary": 1}})
        );
    }

    #[test]
    fn test_turn_request_carries_message_and_history() {
        let history = vec![ChatMessage::assistant("Hi"), ChatMessage::user("Help")];
        let body = serde_json::to_value(ChatRequest::turn(
            "s-1",
            "Help",
            history,
            ExtractedData::default(),
        ))
        .unwrap();

        assert_eq!(body["user_message"], "Help");
        assert_eq!(body["chat_history"][1]["role"], "user");
        assert_eq!(body["chat_history"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_document_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("form16.pdf");
        std::fs::write(&path, b"%PDF-1.4").unwrap();

        let document = UploadDocument::from_path(&path).await.unwrap();
        assert_eq!(document.file_name, "form16.pdf");
        assert_eq!(document.bytes, b"%PDF-1.4");

        let missing = UploadDocument::from_path(dir.path().join("nope.pdf")).await;
        assert!(missing.is_err());
    }
}
