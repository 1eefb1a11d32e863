//! Plain-text rendering of transcripts, asset payloads and session lists.
//!
//! Functions here return uncolored lines; `main` applies colors.

use echorya_core::asset::{self, AssetPayload};
use echorya_core::session::{ChatSession, Message, MessageRole, SessionStore};

/// How a single message should be displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    User(Vec<String>),
    Model(Vec<String>),
    Asset(Vec<String>),
}

/// Renders a message, turning model replies that carry an asset payload
/// into a track list.
pub fn render_message(message: &Message) -> Rendered {
    match message.role {
        MessageRole::User => Rendered::User(prose(&message.text)),
        MessageRole::Model => match asset::parse(&message.text) {
            Some(payload) => Rendered::Asset(render_asset(&payload)),
            None => Rendered::Model(prose(&message.text)),
        },
    }
}

pub fn render_asset(payload: &AssetPayload) -> Vec<String> {
    let mut lines = vec![format!("♪ {}", payload.display_style())];
    lines.extend(
        payload
            .tracks()
            .enumerate()
            .map(|(i, track)| format!("  {}. {}  {}", i + 1, track.name, track.url)),
    );
    lines
}

/// One line per session, newest first, numbered for `/select`.
pub fn render_session_list(store: &SessionStore) -> Vec<String> {
    store
        .recent()
        .enumerate()
        .map(|(i, session)| {
            let marker = if session.id == store.current_id() { '*' } else { ' ' };
            format!(
                "{marker} {:>2}. {}  ({} messages)",
                i + 1,
                session.title,
                session.messages.len()
            )
        })
        .collect()
}

pub fn render_header(session: &ChatSession) -> String {
    let short_id: String = session.id.chars().take(8).collect();
    format!("=== {} [{}] ===", session.title, short_id)
}

fn prose(text: &str) -> Vec<String> {
    text.lines().map(str::to_string).collect()
}
