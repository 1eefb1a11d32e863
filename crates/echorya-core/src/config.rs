use serde::{Deserialize, Serialize};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_SYSTEM_INSTRUCTION: &str = "You are Echo, a highly advanced music production assistant and audio engineer. You are helpful, concise, and expert in music theory, production software (DAWs), and audio processing.";
pub const DEFAULT_MIN_PROCESSING_MS: u64 = 3000;
pub const DEFAULT_LOG_FILTER: &str = "warn,echorya=info";

/// Application settings read from `config.toml`.
///
/// Every field has a default, so a missing or partial file is valid.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    /// Gemini model name
    pub model: String,
    /// System instruction sent with every request
    pub system_instruction: String,
    /// Minimum visible duration of a chat turn, in milliseconds
    pub min_processing_ms: u64,
    /// `tracing` filter used when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            system_instruction: DEFAULT_SYSTEM_INSTRUCTION.to_string(),
            min_processing_ms: DEFAULT_MIN_PROCESSING_MS,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

/// API credentials read from `secret.json`.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct SecretConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gemini: Option<GeminiSecret>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct GeminiSecret {
    pub api_key: String,
}

impl SecretConfig {
    /// The Gemini key, if one is configured and non-blank.
    pub fn gemini_api_key(&self) -> Option<&str> {
        self.gemini
            .as_ref()
            .map(|g| g.api_key.trim())
            .filter(|key| !key.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: AppConfig = toml::from_str("min_processing_ms = 0").unwrap();
        assert_eq!(config.min_processing_ms, 0);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);
    }

    #[test]
    fn test_blank_api_key_is_ignored() {
        let secrets: SecretConfig =
            serde_json::from_str(r#"{"gemini": {"api_key": "  "}}"#).unwrap();
        assert_eq!(secrets.gemini_api_key(), None);

        let secrets: SecretConfig =
            serde_json::from_str(r#"{"gemini": {"api_key": "k"}}"#).unwrap();
        assert_eq!(secrets.gemini_api_key(), Some("k"));
        assert_eq!(SecretConfig::default().gemini_api_key(), None);
    }
}
