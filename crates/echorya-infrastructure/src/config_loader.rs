//! Loads [`AppConfig`] from `config.toml`.

use crate::storage::AtomicTomlFile;
use echorya_core::config::AppConfig;
use echorya_core::error::Result;
use std::path::Path;
use tracing::debug;

/// Reads the configuration at `path`.
///
/// A missing or empty file yields `AppConfig::default()`. Fields absent from
/// the file keep their defaults.
pub fn load_config(path: &Path) -> Result<AppConfig> {
    match AtomicTomlFile::<AppConfig>::new(path.to_path_buf()).load()? {
        Some(config) => Ok(config),
        None => {
            debug!(path = %path.display(), "no config file, using defaults");
            Ok(AppConfig::default())
        }
    }
}

/// Writes `config` to `path`, creating parent directories as needed.
pub fn save_config(path: &Path, config: &AppConfig) -> Result<()> {
    AtomicTomlFile::<AppConfig>::new(path.to_path_buf())
        .save(config)
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = load_config(&temp_dir.path().join("config.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_partial_file_overrides_fields() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(
            &path,
            "model = \"gemini-2.5-pro\"\nmin_processing_ms = 500\n",
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.model, "gemini-2.5-pro");
        assert_eq!(config.min_processing_ms, 500);
        assert_eq!(
            config.system_instruction,
            AppConfig::default().system_instruction
        );
    }

    #[test]
    fn test_save_then_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");
        let config = AppConfig {
            min_processing_ms: 0,
            ..AppConfig::default()
        };
        save_config(&path, &config).unwrap();
        assert_eq!(load_config(&path).unwrap(), config);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "min_processing_ms = \"soon\"").unwrap();
        assert!(load_config(&path).unwrap_err().is_serialization());
    }
}
