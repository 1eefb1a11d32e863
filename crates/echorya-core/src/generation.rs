//! Language-model collaborator interface.
//!
//! Replies and failures travel as a tagged `Result`, so an error can never
//! be mistaken for assistant content.

use crate::session::{Message, MessageRole};
use thiserror::Error;

/// Sentence shown when no model could be configured at startup.
pub const NOT_INITIALIZED_MESSAGE: &str = "AI Service not initialized. Please check API Key.";
/// Sentence shown when the model answered without any text.
pub const EMPTY_RESPONSE_MESSAGE: &str = "I couldn't generate a response at this time.";
/// Sentence shown for any other request failure.
pub const REQUEST_FAILED_MESSAGE: &str =
    "I encountered an error processing your request. Please try again.";

/// One prior turn of a conversation, as sent to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryTurn {
    pub role: MessageRole,
    pub text: String,
}

impl From<&Message> for HistoryTurn {
    fn from(message: &Message) -> Self {
        Self {
            role: message.role,
            text: message.text.clone(),
        }
    }
}

/// Builds the history sent alongside a prompt from a session's messages.
pub fn history_from(messages: &[Message]) -> Vec<HistoryTurn> {
    messages.iter().map(HistoryTurn::from).collect()
}

/// Failure of a single generation request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// No credential was available when the model client was built.
    #[error("language model is not initialized")]
    NotInitialized,

    /// The request never produced an HTTP response.
    #[error("request failed: {message}")]
    Request { message: String, retryable: bool },

    /// The service answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Http {
        status: u16,
        message: String,
        retryable: bool,
        retry_after_secs: Option<u64>,
    },

    /// The response body could not be decoded.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// The response contained no text.
    #[error("response contained no text")]
    EmptyResponse,
}

impl GenerationError {
    /// Short sentence suitable for showing to the user.
    pub fn user_message(&self) -> &'static str {
        match self {
            GenerationError::NotInitialized => NOT_INITIALIZED_MESSAGE,
            GenerationError::EmptyResponse => EMPTY_RESPONSE_MESSAGE,
            _ => REQUEST_FAILED_MESSAGE,
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            GenerationError::Request { retryable, .. }
            | GenerationError::Http { retryable, .. } => *retryable,
            _ => false,
        }
    }
}

/// A hosted language model that answers a prompt given prior turns.
#[async_trait::async_trait]
pub trait LanguageModel: Send + Sync {
    /// Short human-readable name of the backing model.
    fn model_name(&self) -> &str;

    /// Generates a reply to `prompt`. `history` holds the earlier turns in
    /// order and does not include `prompt` itself.
    async fn generate(
        &self,
        prompt: &str,
        history: &[HistoryTurn],
    ) -> Result<String, GenerationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_preserves_order_and_roles() {
        let messages = vec![Message::user("hi"), Message::model("hello")];
        let history = history_from(&messages);
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, MessageRole::User);
        assert_eq!(history[1].text, "hello");
    }

    #[test]
    fn test_user_messages() {
        assert_eq!(
            GenerationError::NotInitialized.user_message(),
            NOT_INITIALIZED_MESSAGE
        );
        assert_eq!(
            GenerationError::EmptyResponse.user_message(),
            EMPTY_RESPONSE_MESSAGE
        );
        assert_eq!(
            GenerationError::Decode("x".into()).user_message(),
            REQUEST_FAILED_MESSAGE
        );
    }

    #[test]
    fn test_retryable_flags() {
        let http = GenerationError::Http {
            status: 503,
            message: "overloaded".into(),
            retryable: true,
            retry_after_secs: Some(2),
        };
        assert!(http.is_retryable());
        assert!(!GenerationError::NotInitialized.is_retryable());
    }
}
