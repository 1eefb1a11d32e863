//! Echorya Interaction Layer
//!
//! Connects the session store to a hosted language model.

pub mod chat_controller;
pub mod gemini_api_agent;

pub use chat_controller::{ChatController, TurnOutcome};
pub use gemini_api_agent::GeminiApiAgent;
