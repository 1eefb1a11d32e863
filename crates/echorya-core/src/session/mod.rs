//! Session domain module.
//!
//! This module contains the chat session model and the in-memory store
//! that owns all sessions of a running application.
//!
//! # Module Structure
//!
//! - `message`: Conversation message types (`MessageRole`, `Message`)
//! - `model`: Session model and its title state (`ChatSession`, `SessionTitle`)
//! - `event`: Change notifications (`StoreEvent`)
//! - `store`: Session lifecycle management (`SessionStore`)
//!
//! # Usage
//!
//! ```
//! use echorya_core::session::{Message, SessionStore};
//!
//! let mut store = SessionStore::new();
//! let id = store.current_id().to_string();
//! store.push_message(&id, Message::user("Split stems")).unwrap();
//! assert_eq!(store.current().title.as_str(), "Split stems");
//! ```

mod event;
mod message;
mod model;
mod store;


// Re-export public API
pub use event::StoreEvent;
pub use message::{Message, MessageRole};
pub use model::{ChatSession, DERIVED_TITLE_CHARS, SessionTitle, UNTITLED_SESSION_TITLE};
pub use store::{HomeNavigation, SessionStore, SubscriptionId};
