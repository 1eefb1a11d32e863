//! Secret management service trait.
//!
//! Defines the interface for loading API keys.

use crate::config::SecretConfig;
use crate::error::Result;

/// Service for loading secret configuration.
///
/// Implementations must never log key material or include it in errors.
#[async_trait::async_trait]
pub trait SecretService: Send + Sync {
    /// Loads the secret configuration. A missing secret file yields
    /// `SecretConfig::default()`.
    async fn load_secrets(&self) -> Result<SecretConfig>;

    /// Checks if the secret file exists.
    async fn secret_file_exists(&self) -> bool;
}
