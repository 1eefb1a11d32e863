//! Key-value store trait.

use async_trait::async_trait;

use crate::error::Result;

/// Key under which the logged-in user's e-mail is kept.
pub const USER_EMAIL_KEY: &str = "user_email";

/// Durable string key-value storage.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: String) -> Result<()>;

    /// Removes `key`. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;
}
