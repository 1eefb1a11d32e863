//! Chat session domain model.
//!
//! A session is one conversation thread. Its title starts out untitled and
//! is derived from the first message the moment the session stops being
//! empty; after that it only changes through an explicit rename.

use super::message::Message;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Title shown for a session that has not been titled yet.
pub const UNTITLED_SESSION_TITLE: &str = "New Session";

/// Number of characters kept when deriving a title from a message.
pub const DERIVED_TITLE_CHARS: usize = 25;

/// The title of a chat session.
///
/// The transition `Untitled -> Titled` is one-way.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", content = "text", rename_all = "snake_case")]
pub enum SessionTitle {
    #[default]
    Untitled,
    Titled(String),
}

impl SessionTitle {
    /// Builds a title from the text of a session's first message.
    ///
    /// Keeps the first 25 characters and appends `...` only when the text
    /// was actually cut.
    pub fn derive_from(text: &str) -> Self {
        let mut chars = text.chars();
        let head: String = chars.by_ref().take(DERIVED_TITLE_CHARS).collect();
        if chars.next().is_some() {
            SessionTitle::Titled(format!("{head}..."))
        } else {
            SessionTitle::Titled(head)
        }
    }

    pub fn is_untitled(&self) -> bool {
        matches!(self, SessionTitle::Untitled)
    }

    /// The text displayed for this title.
    pub fn as_str(&self) -> &str {
        match self {
            SessionTitle::Untitled => UNTITLED_SESSION_TITLE,
            SessionTitle::Titled(text) => text,
        }
    }
}

impl fmt::Display for SessionTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One conversation thread held by the [`SessionStore`](super::SessionStore).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSession {
    /// Unique session identifier (UUID format)
    pub id: String,
    /// Session title
    pub title: SessionTitle,
    /// Ordered message history
    pub messages: Vec<Message>,
    /// Creation time in epoch milliseconds
    pub created_at: i64,
}

impl ChatSession {
    /// Creates an empty, untitled session with a fresh id.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: SessionTitle::Untitled,
            messages: Vec::new(),
            created_at: chrono::Utc::now().timestamp_millis(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Replaces the message sequence and derives the title if this is the
    /// first time the session holds any messages.
    pub(crate) fn replace_messages(&mut self, messages: Vec<Message>) {
        if self.title.is_untitled() {
            if let Some(first) = messages.first() {
                self.title = SessionTitle::derive_from(&first.text);
            }
        }
        self.messages = messages;
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_is_used_verbatim() {
        let title = SessionTitle::derive_from("Make a lo-fi beat");
        assert_eq!(title, SessionTitle::Titled("Make a lo-fi beat".to_string()));
    }

    #[test]
    fn test_long_text_is_truncated_with_ellipsis() {
        let text = "Split the stems of my new synthwave track please";
        let title = SessionTitle::derive_from(text);
        assert_eq!(title.as_str(), "Split the stems of my new...");
        assert_eq!(title.as_str().chars().count(), DERIVED_TITLE_CHARS + 3);
    }

    #[test]
    fn test_exactly_25_chars_is_not_truncated() {
        let text = "abcdefghijklmnopqrstuvwxy";
        assert_eq!(text.chars().count(), 25);
        assert_eq!(SessionTitle::derive_from(text).as_str(), text);
    }

    #[test]
    fn test_truncation_counts_characters_not_bytes() {
        let text = "转换这首歌曲为简谱并分析和弦结构然后生成一段新的旋律给我听一下";
        let title = SessionTitle::derive_from(text);
        assert!(title.as_str().ends_with("..."));
        assert_eq!(title.as_str().chars().count(), DERIVED_TITLE_CHARS + 3);
    }

    #[test]
    fn test_untitled_displays_sentinel() {
        let session = ChatSession::new();
        assert!(session.is_empty());
        assert_eq!(session.title.to_string(), UNTITLED_SESSION_TITLE);
    }

    #[test]
    fn test_replace_messages_titles_once() {
        let mut session = ChatSession::new();
        session.replace_messages(vec![Message::user("first prompt")]);
        assert_eq!(session.title.as_str(), "first prompt");

        let mut messages = session.messages.clone();
        messages.push(Message::model("a reply that would make a different title"));
        session.replace_messages(messages);
        assert_eq!(session.title.as_str(), "first prompt");
        assert_eq!(session.messages.len(), 2);
    }

    #[test]
    fn test_replace_with_empty_keeps_untitled() {
        let mut session = ChatSession::new();
        session.replace_messages(Vec::new());
        assert!(session.title.is_untitled());
    }
}
