//! Chat message types.
//!
//! This module contains types for representing messages in the advisory
//! chat transcript, including roles and message content.

use serde::{Deserialize, Serialize};

/// Represents the role of a message in the chat transcript.
///
/// The backend is the source of truth for the transcript and may include
/// roles the client never renders (such as its `system` prompt). Those are
/// kept verbatim so the transcript round-trips unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MessageRole {
    /// Message from the user.
    User,
    /// Message from the advisor.
    Assistant,
    /// Any other role supplied by the backend.
    Other(String),
}

impl MessageRole {
    pub fn as_str(&self) -> &str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Other(role) => role,
        }
    }
}

impl From<String> for MessageRole {
    fn from(role: String) -> Self {
        match role.as_str() {
            "user" => Self::User,
            "assistant" => Self::Assistant,
            _ => Self::Other(role),
        }
    }
}

impl From<MessageRole> for String {
    fn from(role: MessageRole) -> Self {
        match role {
            MessageRole::Other(role) => role,
            known => known.as_str().to_string(),
        }
    }
}

/// A single message in the chat transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// The role of the message sender.
    pub role: MessageRole,
    /// The content of the message.
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_roles_round_trip_verbatim() {
        let transcript: Vec<ChatMessage> = serde_json::from_value(json!([
            {"role": "system", "content": "You are a helpful Indian tax advisor."},
            {"role": "assistant", "content": "Would you like to know more?"},
            {"role": "user", "content": "Yes"}
        ]))
        .unwrap();

        assert_eq!(transcript[0].role, MessageRole::Other("system".to_string()));
        assert_eq!(transcript[1].role, MessageRole::Assistant);
        assert_eq!(transcript[2], ChatMessage::user("Yes"));

        let back = serde_json::to_value(&transcript).unwrap();
        assert_eq!(back[0]["role"], "system");
        assert_eq!(back[2]["role"], "user");
    }
}
