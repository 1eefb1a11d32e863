use super::event::StoreEvent;
use super::message::Message;
use super::model::{ChatSession, SessionTitle};
use crate::error::{EchoryaError, Result};
use std::fmt;
use tracing::debug;

/// Handle returned by [`SessionStore::subscribe`].
pub type SubscriptionId = u64;

type Listener = Box<dyn Fn(&StoreEvent) + Send + Sync>;

/// Which rule [`SessionStore::go_home`] applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HomeNavigation {
    /// The current session was already empty.
    StayedOnCurrent(String),
    /// Switched to the most recently created empty session.
    ReusedEmpty(String),
    /// No empty session existed, so a new one was created.
    Created(String),
}

impl HomeNavigation {
    pub fn session_id(&self) -> &str {
        match self {
            HomeNavigation::StayedOnCurrent(id)
            | HomeNavigation::ReusedEmpty(id)
            | HomeNavigation::Created(id) => id,
        }
    }
}

/// In-memory collection of chat sessions and the pointer to the current one.
///
/// `SessionStore` is responsible for:
/// - Creating, selecting, renaming and deleting sessions
/// - Replacing a session's messages (the only content mutation path)
/// - Keeping the current-session pointer on a live session
/// - Notifying subscribers after every change
///
/// The invariant "current always references a stored session" is restored
/// by a single correction step that runs after every structural change,
/// instead of being special-cased inside individual operations.
pub struct SessionStore {
    /// Sessions in creation order
    sessions: Vec<ChatSession>,
    /// Id of the current session
    current_id: String,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: SubscriptionId,
}

impl SessionStore {
    /// Creates a store holding one empty session, which is current.
    pub fn new() -> Self {
        let mut store = Self {
            sessions: Vec::new(),
            current_id: String::new(),
            listeners: Vec::new(),
            next_subscription: 0,
        };
        store.commit(Vec::new());
        store
    }

    // ============================================================================
    // Accessors
    // ============================================================================

    /// All sessions in creation order.
    pub fn sessions(&self) -> &[ChatSession] {
        &self.sessions
    }

    /// Sessions newest first, the order a session list displays them in.
    pub fn recent(&self) -> impl Iterator<Item = &ChatSession> {
        self.sessions.iter().rev()
    }

    pub fn session(&self, id: &str) -> Option<&ChatSession> {
        self.sessions.iter().find(|s| s.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.session(id).is_some()
    }

    pub fn current_id(&self) -> &str {
        &self.current_id
    }

    pub fn current(&self) -> &ChatSession {
        // The invariant guarantees the current id is stored.
        self.session(&self.current_id)
            .unwrap_or_else(|| unreachable!("current session {} is not stored", self.current_id))
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    // ============================================================================
    // Mutations
    // ============================================================================

    /// Inserts a new empty session, makes it current and returns its id.
    pub fn create_session(&mut self) -> String {
        let session = ChatSession::new();
        let id = session.id.clone();
        debug!(session_id = %id, "creating session");

        self.sessions.push(session);
        self.current_id = id.clone();
        self.commit(vec![
            StoreEvent::SessionCreated {
                session_id: id.clone(),
            },
            StoreEvent::CurrentChanged {
                session_id: id.clone(),
            },
        ]);
        id
    }

    /// Makes `id` the current session.
    ///
    /// Unknown ids are ignored. Returns whether `id` is now current.
    pub fn select_session(&mut self, id: &str) -> bool {
        if !self.contains(id) {
            debug!(session_id = %id, "ignoring selection of unknown session");
            return false;
        }
        if self.current_id != id {
            self.current_id = id.to_string();
            self.commit(vec![StoreEvent::CurrentChanged {
                session_id: id.to_string(),
            }]);
        }
        true
    }

    /// Replaces the message sequence of `session_id`.
    ///
    /// The supplied sequence is expected to be the previous one plus new
    /// entries. The session title is derived from the first message if the
    /// session was still untitled.
    pub fn append_messages(&mut self, session_id: &str, messages: Vec<Message>) -> Result<()> {
        let session = self
            .sessions
            .iter_mut()
            .find(|s| s.id == session_id)
            .ok_or_else(|| EchoryaError::not_found("session", session_id))?;

        let was_untitled = session.title.is_untitled();
        session.replace_messages(messages);

        let mut events = vec![StoreEvent::MessagesReplaced {
            session_id: session_id.to_string(),
            message_count: session.messages.len(),
        }];
        if was_untitled && !session.title.is_untitled() {
            debug!(session_id = %session_id, title = %session.title, "derived session title");
            events.push(StoreEvent::SessionRenamed {
                session_id: session_id.to_string(),
                title: session.title.to_string(),
            });
        }
        self.commit(events);
        Ok(())
    }

    /// Appends a single message by submitting the extended sequence through
    /// [`append_messages`](Self::append_messages).
    pub fn push_message(&mut self, session_id: &str, message: Message) -> Result<()> {
        let mut messages = self
            .session(session_id)
            .map(|s| s.messages.clone())
            .ok_or_else(|| EchoryaError::not_found("session", session_id))?;
        messages.push(message);
        self.append_messages(session_id, messages)
    }

    /// Overwrites the title of `id`. No validation is applied.
    pub fn rename_session(&mut self, id: &str, new_title: impl Into<String>) -> Result<()> {
        let session = self
            .sessions
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| EchoryaError::not_found("session", id))?;

        let title = new_title.into();
        session.title = SessionTitle::Titled(title.clone());
        self.commit(vec![StoreEvent::SessionRenamed {
            session_id: id.to_string(),
            title,
        }]);
        Ok(())
    }

    /// Removes the session `id`. Returns whether anything was removed.
    pub fn delete_session(&mut self, id: &str) -> bool {
        let before = self.sessions.len();
        self.sessions.retain(|s| s.id != id);
        if self.sessions.len() == before {
            return false;
        }

        debug!(session_id = %id, "deleted session");
        self.commit(vec![StoreEvent::SessionDeleted {
            session_id: id.to_string(),
        }]);
        true
    }

    /// Navigates "home" to an empty session.
    ///
    /// Prefers, in order: the current session if it is empty, the most
    /// recently created empty session, and finally a brand-new session.
    pub fn go_home(&mut self) -> HomeNavigation {
        if self.current().is_empty() {
            return HomeNavigation::StayedOnCurrent(self.current_id.clone());
        }

        let reusable = self
            .sessions
            .iter()
            .rev()
            .find(|s| s.is_empty())
            .map(|s| s.id.clone());

        match reusable {
            Some(id) => {
                self.select_session(&id);
                HomeNavigation::ReusedEmpty(id)
            }
            None => HomeNavigation::Created(self.create_session()),
        }
    }

    // ============================================================================
    // Subscriptions
    // ============================================================================

    /// Registers a callback invoked with every [`StoreEvent`].
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: Fn(&StoreEvent) + Send + Sync + 'static,
    {
        let id = self.next_subscription;
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Removes a callback. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    // ============================================================================
    // Invariant maintenance
    // ============================================================================

    /// Restores the current-session invariant, then publishes `events`
    /// followed by any events the correction produced.
    fn commit(&mut self, mut events: Vec<StoreEvent>) {
        events.extend(self.restore_current());
        for event in &events {
            for (_, listener) in &self.listeners {
                listener(event);
            }
        }
    }

    fn restore_current(&mut self) -> Vec<StoreEvent> {
        if self.sessions.is_empty() {
            let session = ChatSession::new();
            let id = session.id.clone();
            debug!(session_id = %id, "store is empty, creating replacement session");
            self.sessions.push(session);
            self.current_id = id.clone();
            return vec![
                StoreEvent::SessionCreated {
                    session_id: id.clone(),
                },
                StoreEvent::CurrentChanged { session_id: id },
            ];
        }

        if self.contains(&self.current_id) {
            return Vec::new();
        }

        // Sessions are kept in creation order, so the last one is the newest.
        let fallback = self.sessions[self.sessions.len() - 1].id.clone();
        debug!(session_id = %fallback, "current session vanished, reselecting");
        self.current_id = fallback.clone();
        vec![StoreEvent::CurrentChanged {
            session_id: fallback,
        }]
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("sessions", &self.sessions)
            .field("current_id", &self.current_id)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
