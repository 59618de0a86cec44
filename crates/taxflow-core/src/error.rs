//! Error types for the TaxFlow application.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::session::StageKind;

/// Identifies which backend call produced a remote failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum BackendCall {
    Upload,
    SubmitReview,
    CalculateTax,
    OpenChat,
    ContinueChat,
    Health,
}

impl BackendCall {
    /// The generic, user-facing message reported when this call fails.
    ///
    /// Status codes are never surfaced; every non-success response maps to
    /// the same message for a given call.
    pub fn failure_message(&self) -> &'static str {
        match self {
            Self::Upload => "Failed to upload and extract PDF.",
            Self::SubmitReview => "Failed to submit reviewed data.",
            Self::CalculateTax => "Failed to calculate tax.",
            Self::OpenChat => "Failed to start chat.",
            Self::ContinueChat => "Failed to get AI response.",
            Self::Health => "Backend health check failed.",
        }
    }
}

/// Low-level failure raised by a [`crate::backend::TaxBackend`] implementation.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackendError {
    /// The request never produced a response (connection refused, DNS, timeout).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The backend answered with a non-success HTTP status.
    #[error("Backend returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body could not be decoded.
    #[error("Failed to decode response: {0}")]
    Decode(String),
}

/// A shared error type for the entire TaxFlow application.
///
/// Validation variants are raised before any network activity; `Remote`
/// wraps whatever the backend port reported.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TaxflowError {
    /// Upload attempted without a selected document
    #[error("Please select a PDF file.")]
    NoFileSelected,

    /// Review submitted before any upload established a session
    #[error("No session found. Please upload a PDF first.")]
    NoSession,

    /// Chat message was empty after trimming
    #[error("Chat message is empty")]
    EmptyMessage,

    /// Selected document could not be read from disk
    #[error("Could not read {path}: {reason}")]
    UnreadableDocument { path: String, reason: String },

    /// Unknown review field name
    #[error("Unknown review field: {0}")]
    UnknownField(String),

    /// Unknown tax regime name
    #[error("Unknown tax regime: {0}")]
    UnknownRegime(String),

    /// Action not permitted in the current stage
    #[error("Cannot {action} while {stage}")]
    InvalidStage {
        action: &'static str,
        stage: StageKind,
    },

    /// Stage transition rejected by the state machine
    #[error("Invalid stage transition: {from} -> {to}")]
    InvalidTransition { from: StageKind, to: StageKind },

    /// Backend call failed
    #[error("{}", .call.failure_message())]
    Remote {
        call: BackendCall,
        source: BackendError,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },
}

impl TaxflowError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Remote error for the given call
    pub fn remote(call: BackendCall, source: BackendError) -> Self {
        Self::Remote { call, source }
    }

    /// Creates an InvalidStage error
    pub fn invalid_stage(action: &'static str, stage: StageKind) -> Self {
        Self::InvalidStage { action, stage }
    }

    /// Creates an UnreadableDocument error from a failed read
    pub fn unreadable_document(path: &std::path::Path, source: TaxflowError) -> Self {
        let reason = match source {
            Self::Io { message } => message,
            other => other.to_string(),
        };
        Self::UnreadableDocument {
            path: path.display().to_string(),
            reason,
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this failure was detected locally, before any network call.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::NoFileSelected
                | Self::UnreadableDocument { .. }
                | Self::NoSession
                | Self::EmptyMessage
                | Self::UnknownField(_)
                | Self::UnknownRegime(_)
                | Self::InvalidStage { .. }
                | Self::InvalidTransition { .. }
        )
    }

    /// Check if this failure came back from the backend.
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote { .. })
    }

    /// Returns the backend call that failed, if this is a remote error.
    pub fn failed_call(&self) -> Option<BackendCall> {
        match self {
            Self::Remote { call, .. } => Some(*call),
            _ => None,
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for TaxflowError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for TaxflowError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for TaxflowError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, TaxflowError>`.
pub type Result<T> = std::result::Result<T, TaxflowError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_error_shows_generic_message() {
        let err = TaxflowError::remote(
            BackendCall::CalculateTax,
            BackendError::Status {
                status: 500,
                body: "Supabase error".to_string(),
            },
        );

        assert_eq!(err.to_string(), "Failed to calculate tax.");
        assert!(err.is_remote());
        assert!(!err.is_validation());
        assert_eq!(err.failed_call(), Some(BackendCall::CalculateTax));
    }

    #[test]
    fn test_validation_errors() {
        assert!(TaxflowError::NoSession.is_validation());
        assert!(TaxflowError::NoFileSelected.is_validation());
        assert_eq!(
            TaxflowError::NoSession.to_string(),
            "No session found. Please upload a PDF first."
        );
        assert_eq!(
            TaxflowError::invalid_stage("submit review", StageKind::Idle).to_string(),
            "Cannot submit review while idle"
        );
    }

    #[test]
    fn test_unreadable_document_keeps_io_reason() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.pdf");
        let err = TaxflowError::unreadable_document(std::path::Path::new("docs/form16.pdf"), io.into());

        assert!(err.is_validation());
        assert!(err.to_string().starts_with("Could not read docs/form16.pdf: missing.pdf"));
    }

    #[test]
    fn test_health_failure_message() {
        let err = TaxflowError::remote(
            BackendCall::Health,
            BackendError::Transport("connection refused".to_string()),
        );
        assert_eq!(err.to_string(), "Backend health check failed.");
        assert_eq!(err.failed_call(), Some(BackendCall::Health));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.pdf");
        let err: TaxflowError = io.into();
        assert!(matches!(err, TaxflowError::Io { ref message } if message.contains("NotFound")));
    }
}
