//! Unified path management for Echorya configuration files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/echorya/           # Config directory (dirs::config_dir)
//! ├── config.toml              # Application configuration
//! ├── secret.json              # API keys
//! └── state.toml               # Durable key-value state (user e-mail)
//! ```

use echorya_core::config::{GeminiSecret, SecretConfig};
use std::path::{Path, PathBuf};
use thiserror::Error;

const APP_DIR_NAME: &str = "echorya";

/// Errors that can occur during path resolution.
#[derive(Debug, Error)]
pub enum PathError {
    /// The platform config directory could not be determined.
    #[error("Cannot find config directory")]
    ConfigDirNotFound,
}

/// Resolves every file Echorya reads or writes under one base directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EchoryaPaths {
    config_dir: PathBuf,
}

impl EchoryaPaths {
    /// Uses the platform config directory, e.g. `~/.config/echorya/`.
    pub fn from_system() -> Result<Self, PathError> {
        dirs::config_dir()
            .map(|dir| Self::with_base(dir.join(APP_DIR_NAME)))
            .ok_or(PathError::ConfigDirNotFound)
    }

    /// Uses `config_dir` as-is. Intended for tests and overrides.
    pub fn with_base(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    /// Path to `secret.json`.
    ///
    /// # Security Note
    ///
    /// Ensure this file has appropriate permissions (e.g., 600).
    pub fn secret_file(&self) -> PathBuf {
        self.config_dir.join("secret.json")
    }

    pub fn state_file(&self) -> PathBuf {
        self.config_dir.join("state.toml")
    }

    /// Ensures the secret file exists, creating a template with an empty
    /// Gemini key if it doesn't.
    ///
    /// Sets permissions to 600 on Unix systems.
    pub fn ensure_secret_file(&self) -> Result<PathBuf, std::io::Error> {
        let secret_path = self.secret_file();
        if secret_path.exists() {
            return Ok(secret_path);
        }

        std::fs::create_dir_all(&self.config_dir)?;

        let template = SecretConfig {
            gemini: Some(GeminiSecret {
                api_key: String::new(),
            }),
        };
        let template_json = serde_json::to_string_pretty(&template)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        std::fs::write(&secret_path, template_json)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&secret_path, permissions)?;
        }

        Ok(secret_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_files_live_under_base() {
        let paths = EchoryaPaths::with_base("/tmp/echorya-test");
        assert!(paths.config_file().ends_with("config.toml"));
        assert!(paths.secret_file().ends_with("secret.json"));
        assert!(paths.state_file().ends_with("state.toml"));
        assert!(paths.state_file().starts_with(paths.config_dir()));
    }

    #[test]
    fn test_ensure_secret_file_writes_template_once() {
        let temp_dir = TempDir::new().unwrap();
        let paths = EchoryaPaths::with_base(temp_dir.path().join("echorya"));

        let path = paths.ensure_secret_file().unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let parsed: SecretConfig = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed.gemini_api_key(), None);

        std::fs::write(&path, r#"{"gemini": {"api_key": "kept"}}"#).unwrap();
        paths.ensure_secret_file().unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("kept"));
    }

    #[cfg(unix)]
    #[test]
    fn test_secret_file_permissions() {
        use std::os::unix::fs::PermissionsExt;
        let temp_dir = TempDir::new().unwrap();
        let paths = EchoryaPaths::with_base(temp_dir.path());
        let path = paths.ensure_secret_file().unwrap();
        let mode = std::fs::metadata(path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
