use serde::{Deserialize, Serialize};

/// Change notifications published by the [`SessionStore`](super::SessionStore).
///
/// Subscribers receive these after the store has restored its
/// current-session invariant, so `current_id()` is always valid when a
/// callback runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreEvent {
    /// A new session was inserted.
    SessionCreated { session_id: String },
    /// The current session pointer moved.
    CurrentChanged { session_id: String },
    /// A session's message sequence was replaced.
    MessagesReplaced {
        session_id: String,
        message_count: usize,
    },
    /// A session was renamed, either explicitly or by title derivation.
    SessionRenamed { session_id: String, title: String },
    /// A session was removed.
    SessionDeleted { session_id: String },
}
