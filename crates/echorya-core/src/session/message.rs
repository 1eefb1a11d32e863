//! Conversation message types.
//!
//! This module contains types for representing one turn of a chat session.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents the author of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Message typed by the user.
    User,
    /// Reply produced by the language model.
    Model,
}

impl MessageRole {
    /// Wire name used by the language-model API ("user" / "model").
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Model => "model",
        }
    }
}

/// A single message in a chat session.
///
/// Messages are never edited after creation; a session only ever receives
/// a new, longer sequence that contains them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Unique message identifier (UUID format).
    pub id: String,
    /// The author of the message.
    pub role: MessageRole,
    /// The message text as typed or returned by the model.
    pub text: String,
    /// Creation time in epoch milliseconds.
    pub timestamp: i64,
}

impl Message {
    /// Creates a message with a fresh id, stamped with the current time.
    pub fn new(role: MessageRole, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            text: text.into(),
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(MessageRole::User, text)
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self::new(MessageRole::Model, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serializes_lowercase() {
        let json = serde_json::to_string(&MessageRole::Model).unwrap();
        assert_eq!(json, "\"model\"");
        assert_eq!(MessageRole::User.as_str(), "user");
    }

    #[test]
    fn test_messages_get_unique_ids() {
        let a = Message::user("hello");
        let b = Message::user("hello");
        assert_ne!(a.id, b.id);
        assert!(a.timestamp > 0);
        assert_eq!(a.role, MessageRole::User);
    }
}
