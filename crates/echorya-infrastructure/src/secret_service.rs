//! Secret service implementation.
//!
//! Reads API keys from `secret.json`. A key found in the environment takes
//! precedence over the file.

use crate::paths::EchoryaPaths;
use echorya_core::config::{GeminiSecret, SecretConfig};
use echorya_core::error::Result;
use echorya_core::secret::SecretService;
use std::path::PathBuf;
use tracing::debug;

/// Environment variables checked for a Gemini key, in priority order.
pub const API_KEY_ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

/// File-backed [`SecretService`] with an environment override.
#[derive(Debug, Clone)]
pub struct SecretServiceImpl {
    secret_path: PathBuf,
    env_api_key: Option<String>,
}

impl SecretServiceImpl {
    /// Creates a service for the secret file under `paths`, capturing the
    /// environment override at construction time.
    pub fn new(paths: &EchoryaPaths) -> Self {
        let env_api_key = API_KEY_ENV_VARS
            .iter()
            .filter_map(|name| std::env::var(name).ok())
            .find(|value| !value.trim().is_empty());
        Self {
            secret_path: paths.secret_file(),
            env_api_key,
        }
    }

    /// Replaces the captured environment override.
    pub fn with_env_api_key(mut self, api_key: Option<String>) -> Self {
        self.env_api_key = api_key;
        self
    }
}

#[async_trait::async_trait]
impl SecretService for SecretServiceImpl {
    async fn load_secrets(&self) -> Result<SecretConfig> {
        let mut config = if self.secret_file_exists().await {
            let content = tokio::fs::read_to_string(&self.secret_path).await?;
            if content.trim().is_empty() {
                SecretConfig::default()
            } else {
                serde_json::from_str(&content)?
            }
        } else {
            SecretConfig::default()
        };

        if let Some(api_key) = &self.env_api_key {
            debug!("using Gemini API key from environment");
            config.gemini = Some(GeminiSecret {
                api_key: api_key.clone(),
            });
        }

        Ok(config)
    }

    async fn secret_file_exists(&self) -> bool {
        tokio::fs::try_exists(&self.secret_path)
            .await
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn service_in(temp_dir: &TempDir) -> (SecretServiceImpl, EchoryaPaths) {
        let paths = EchoryaPaths::with_base(temp_dir.path());
        let service = SecretServiceImpl::new(&paths).with_env_api_key(None);
        (service, paths)
    }

    #[tokio::test]
    async fn test_missing_file_yields_default() {
        let temp_dir = TempDir::new().unwrap();
        let (service, _) = service_in(&temp_dir);
        assert!(!service.secret_file_exists().await);
        assert_eq!(
            service.load_secrets().await.unwrap(),
            SecretConfig::default()
        );
    }

    #[tokio::test]
    async fn test_reads_key_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let (service, paths) = service_in(&temp_dir);
        std::fs::write(
            paths.secret_file(),
            r#"{"gemini": {"api_key": "from-file"}}"#,
        )
        .unwrap();

        let secrets = service.load_secrets().await.unwrap();
        assert_eq!(secrets.gemini_api_key(), Some("from-file"));
    }

    #[tokio::test]
    async fn test_environment_overrides_file() {
        let temp_dir = TempDir::new().unwrap();
        let (service, paths) = service_in(&temp_dir);
        std::fs::write(
            paths.secret_file(),
            r#"{"gemini": {"api_key": "from-file"}}"#,
        )
        .unwrap();

        let service = service.with_env_api_key(Some("from-env".to_string()));
        let secrets = service.load_secrets().await.unwrap();
        assert_eq!(secrets.gemini_api_key(), Some("from-env"));
    }

    #[tokio::test]
    async fn test_malformed_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let (service, paths) = service_in(&temp_dir);
        std::fs::write(paths.secret_file(), "{ not json").unwrap();

        let err = service.load_secrets().await.unwrap_err();
        assert!(err.is_serialization());
    }
}
