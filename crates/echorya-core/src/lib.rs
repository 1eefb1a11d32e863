//! Domain layer of Echorya: chat sessions, asset payload parsing and the
//! interfaces of the collaborators the application talks to.

pub mod asset;
pub mod config;
pub mod error;
pub mod generation;
pub mod secret;
pub mod session;
pub mod speech;
pub mod state;
pub mod user;

// Re-export common error type
pub use error::{EchoryaError, Result};
