//! Durable application state.
//!
//! Only a handful of string values survive a restart; sessions and messages
//! never do.

mod repository;

pub use repository::{KeyValueStore, USER_EMAIL_KEY};
