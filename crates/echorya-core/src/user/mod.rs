//! User domain module.
//!
//! # Module Structure
//!
//! - `model`: Profile derived from the user's e-mail
//! - `service`: Simulated login backed by a key-value store
//!
//! # Usage
//!
//! ```ignore
//! use echorya_core::user::{StoredUserService, UserProfile, UserService};
//! ```

mod model;
mod service;

// Re-export public API
pub use model::{DEFAULT_USER_EMAIL, UserProfile};
pub use service::{StoredUserService, UserService};
