use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Result, SageError};

/// Environment variable consulted when no API key is present in the config.
pub const API_KEY_ENV: &str = "SAGE_API_KEY";

/// Top-level configuration for the Sage assistant.
///
/// Loaded from `~/.sage/config.toml` by default. Each section corresponds
/// to a subsystem or cross-cutting concern.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SageConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub voice: VoiceConfig,
}

impl SageConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: SageConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).map_err(|e| SageError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Data directory for the conversation snapshot.
    pub data_dir: String,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: "~/.sage/data".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Remote conversation backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// API key for the generative-language service. Falls back to the
    /// `SAGE_API_KEY` environment variable when absent.
    pub api_key: Option<String>,
    /// Model identifier.
    pub model: String,
    /// Base URL of the generative-language API.
    pub endpoint: String,
    /// Maximum output tokens per reply.
    pub max_output_tokens: u32,
    /// Sampling temperature.
    pub temperature: f64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-1.5-pro-latest".to_string(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            max_output_tokens: 2000,
            temperature: 0.7,
        }
    }
}

impl BackendConfig {
    /// Resolve the backend credential from config or the environment.
    ///
    /// Absence of the credential is a fatal configuration error for any
    /// remote call, surfaced at session-creation time.
    pub fn resolve_api_key(&self) -> Result<String> {
        if let Some(ref key) = self.api_key {
            if !key.trim().is_empty() {
                return Ok(key.clone());
            }
        }
        match std::env::var(API_KEY_ENV) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(SageError::Config(format!(
                "API key is not configured. Set backend.api_key or the {} environment variable.",
                API_KEY_ENV
            ))),
        }
    }
}

/// Chat widget settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Greeting seeded as the first bot message of a fresh conversation.
    pub greeting: String,
    /// Display character budget before a message is collapsed.
    pub truncate_chars: usize,
    /// Snapshot key for the persisted conversation.
    pub snapshot_key: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            greeting: "Hello! I'm your Sikkim travel assistant. How can I help you plan \
                       your adventure?"
                .to_string(),
            truncate_chars: 200,
            snapshot_key: "conversation".to_string(),
        }
    }
}

/// Voice input settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    /// Whether the microphone affordance is shown at all.
    pub enabled: bool,
    /// Recognition locale, fixed to a single default.
    pub language: String,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            language: "en-IN".to_string(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SageConfig::default();
        assert_eq!(config.backend.model, "gemini-1.5-pro-latest");
        assert_eq!(config.backend.max_output_tokens, 2000);
        assert_eq!(config.chat.truncate_chars, 200);
        assert_eq!(config.chat.snapshot_key, "conversation");
        assert!(config.voice.enabled);
        assert_eq!(config.voice.language, "en-IN");
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = SageConfig::default();
        config.general.log_level = "debug".to_string();
        config.backend.api_key = Some("test-key".to_string());
        config.save(&path).unwrap();

        let loaded = SageConfig::load(&path).unwrap();
        assert_eq!(loaded.general.log_level, "debug");
        assert_eq!(loaded.backend.api_key.as_deref(), Some("test-key"));
        assert_eq!(loaded.backend.model, config.backend.model);
    }

    #[test]
    fn test_load_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.toml");
        assert!(SageConfig::load(&path).is_err());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.toml");
        let config = SageConfig::load_or_default(&path);
        assert_eq!(config.chat.truncate_chars, 200);
    }

    #[test]
    fn test_load_or_default_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "not valid toml [[[").unwrap();
        let config = SageConfig::load_or_default(&path);
        assert_eq!(config.backend.model, "gemini-1.5-pro-latest");
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[general]\nlog_level = \"trace\"\n").unwrap();
        let config = SageConfig::load(&path).unwrap();
        assert_eq!(config.general.log_level, "trace");
        // Unspecified sections fall back to defaults.
        assert_eq!(config.backend.max_output_tokens, 2000);
        assert!(config.voice.enabled);
    }

    #[test]
    fn test_resolve_api_key_from_config() {
        let backend = BackendConfig {
            api_key: Some("abc123".to_string()),
            ..BackendConfig::default()
        };
        assert_eq!(backend.resolve_api_key().unwrap(), "abc123");
    }

    #[test]
    fn test_resolve_api_key_blank_config_value_rejected() {
        let backend = BackendConfig {
            api_key: Some("   ".to_string()),
            ..BackendConfig::default()
        };
        // Blank config value falls through to the environment; with the
        // variable unset this is a configuration error.
        if std::env::var(API_KEY_ENV).is_err() {
            let err = backend.resolve_api_key().unwrap_err();
            assert!(matches!(err, SageError::Config(_)));
            assert!(err.to_string().contains(API_KEY_ENV));
        }
    }

    #[test]
    fn test_greeting_default_text() {
        let config = ChatConfig::default();
        assert!(config.greeting.contains("Sikkim travel assistant"));
    }
}
