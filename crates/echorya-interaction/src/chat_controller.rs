//! Turn orchestration between the session store and a language model.

use echorya_core::config::DEFAULT_MIN_PROCESSING_MS;
use echorya_core::error::Result;
use echorya_core::generation::{GenerationError, HistoryTurn, LanguageModel, history_from};
use echorya_core::session::{Message, SessionStore};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, error, warn};

/// Result of a single [`ChatController::send`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The input was blank; nothing was recorded.
    Ignored,
    /// The reply was appended to the session the prompt was sent from.
    Replied { session_id: String, message: Message },
    /// The originating session was deleted before the reply arrived.
    Discarded { session_id: String },
    /// The model call failed. Only the user message was recorded.
    Failed(GenerationError),
}

/// Sends user input to the model and records both sides of the turn.
pub struct ChatController {
    store: Arc<RwLock<SessionStore>>,
    model: Option<Arc<dyn LanguageModel>>,
    min_processing: Duration,
    /// Number of turns currently waiting on the model
    in_flight: AtomicUsize,
}

impl ChatController {
    /// `model` is `None` when the client could not be initialized; every
    /// turn then fails with [`GenerationError::NotInitialized`].
    pub fn new(store: Arc<RwLock<SessionStore>>, model: Option<Arc<dyn LanguageModel>>) -> Self {
        Self {
            store,
            model,
            min_processing: Duration::from_millis(DEFAULT_MIN_PROCESSING_MS),
            in_flight: AtomicUsize::new(0),
        }
    }

    /// Sets the minimum time a turn takes, whatever the model latency.
    pub fn with_min_processing(mut self, min_processing: Duration) -> Self {
        self.min_processing = min_processing;
        self
    }

    pub fn store(&self) -> Arc<RwLock<SessionStore>> {
        Arc::clone(&self.store)
    }

    pub fn model_name(&self) -> Option<&str> {
        self.model.as_deref().map(|model| model.model_name())
    }

    /// True while at least one turn is waiting on the model.
    pub fn is_generating(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// Runs one chat turn for the current session.
    pub async fn send(&self, input: &str) -> Result<TurnOutcome> {
        if input.trim().is_empty() {
            return Ok(TurnOutcome::Ignored);
        }

        let (session_id, history) = {
            let mut store = self.store.write().await;
            let session_id = store.current_id().to_string();
            let history = history_from(&store.current().messages);
            store.push_message(&session_id, Message::user(input))?;
            (session_id, history)
        };

        let result = {
            let _in_flight = InFlight::enter(&self.in_flight);
            let (result, ()) = tokio::join!(
                self.generate(input, &history),
                tokio::time::sleep(self.min_processing)
            );
            result
        };

        let text = match result {
            Ok(text) => text,
            Err(err) => {
                error!(session_id = %session_id, error = %err, "generation failed");
                return Ok(TurnOutcome::Failed(err));
            }
        };

        let mut store = self.store.write().await;
        if !store.contains(&session_id) {
            warn!(session_id = %session_id, "session deleted before reply, discarding it");
            return Ok(TurnOutcome::Discarded { session_id });
        }

        let message = Message::model(text);
        store.push_message(&session_id, message.clone())?;
        debug!(session_id = %session_id, "reply appended");
        Ok(TurnOutcome::Replied {
            session_id,
            message,
        })
    }

    async fn generate(
        &self,
        prompt: &str,
        history: &[HistoryTurn],
    ) -> std::result::Result<String, GenerationError> {
        match &self.model {
            Some(model) => model.generate(prompt, history).await,
            None => Err(GenerationError::NotInitialized),
        }
    }
}

/// Counts a turn as in flight until dropped, including when the `send`
/// future is cancelled mid-turn.
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}
