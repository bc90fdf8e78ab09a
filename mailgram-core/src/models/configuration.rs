//! Configuration data structures

use crate::config::validation::{validate_bot_token, validate_chat_id};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default Telegram Bot API endpoint
pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Logging level configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum LogLevel {
    #[serde(rename = "error")]
    Error,
    #[serde(rename = "warn")]
    Warn,
    #[serde(rename = "info")]
    #[default]
    Info,
    #[serde(rename = "debug")]
    Debug,
    #[serde(rename = "trace")]
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Credentials and options for one dispatch. Passed by reference into each
/// dispatch call and never mutated by it.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TelegramConfig {
    /// Bot token, `digits:token-chars`
    #[serde(default)]
    pub bot_token: String,
    /// Numeric chat id or `@handle`
    #[serde(default)]
    pub chat_id: String,
    /// Upload attachments after the text has been delivered
    #[serde(default)]
    pub send_attachments: bool,
    /// Bot API base URL
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            chat_id: String::new(),
            send_attachments: false,
            api_base: default_api_base(),
        }
    }
}

impl TelegramConfig {
    pub fn new(bot_token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
            ..Self::default()
        }
    }

    pub fn with_attachments(mut self, send_attachments: bool) -> Self {
        self.send_attachments = send_attachments;
        self
    }

    /// Check that the token and chat id can be used for a dispatch
    pub fn ensure_usable(&self) -> Result<(), String> {
        if self.bot_token.trim().is_empty() || self.chat_id.trim().is_empty() {
            return Err("bot token or chat id is not set".to_string());
        }
        validate_bot_token(&self.bot_token).map_err(|e| e.to_string())?;
        validate_chat_id(&self.chat_id).map_err(|e| e.to_string())?;
        Ok(())
    }
}

// Hand-written so the token never reaches logs through `{:?}`
impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field(
                "bot_token",
                &if self.bot_token.is_empty() { "" } else { "<redacted>" },
            )
            .field("chat_id", &self.chat_id)
            .field("send_attachments", &self.send_attachments)
            .field("api_base", &self.api_base)
            .finish()
    }
}

/// Backoff settings for rate-limited sendMessage calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrySettings {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// First backoff delay in milliseconds; doubled after every retry
    pub initial_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 1000,
        }
    }
}

impl RetrySettings {
    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Configuration {
    /// Logging verbosity level
    #[serde(default)]
    pub log_level: LogLevel,
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub retry: RetrySettings,
}

impl Configuration {
    /// Load configuration from file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            toml::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })
        } else {
            // Return default configuration if file doesn't exist
            Ok(Configuration::default())
        }
    }

    /// Save configuration to file
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |message: String| ConfigError::Write {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| write_err(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| write_err(e.to_string()))?;
        }
        std::fs::write(path, content).map_err(|e| write_err(e.to_string()))?;
        Ok(())
    }

    /// Get the XDG config directory path
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("mailgram").join("config.toml"))
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if let Err(e) = validate_bot_token(&self.telegram.bot_token) {
            errors.push(format!("telegram.bot_token: {}", e));
        }

        if let Err(e) = validate_chat_id(&self.telegram.chat_id) {
            errors.push(format!("telegram.chat_id: {}", e));
        }

        if !self.telegram.api_base.starts_with("http://")
            && !self.telegram.api_base.starts_with("https://")
        {
            errors.push("telegram.api_base must be an http(s) URL".to_string());
        }

        if self.retry.max_retries > 10 {
            errors.push("retry.max_retries cannot exceed 10".to_string());
        }

        if self.retry.initial_delay_ms > 60_000 {
            errors.push("retry.initial_delay_ms cannot exceed 60000 (1 minute)".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_configuration() {
        let config = Configuration::default();
        assert_eq!(config.log_level, LogLevel::Info);
        assert!(config.telegram.bot_token.is_empty());
        assert!(!config.telegram.send_attachments);
        assert_eq!(config.telegram.api_base, DEFAULT_API_BASE);
        assert_eq!(config.retry.max_retries, 3);
        assert_eq!(config.retry.initial_delay(), Duration::from_secs(1));
    }

    #[test]
    fn test_configuration_validation() {
        let config = Configuration {
            telegram: TelegramConfig {
                bot_token: "not a token".to_string(),
                chat_id: "chat with spaces".to_string(),
                api_base: "ftp://example.org".to_string(),
                send_attachments: false,
            },
            retry: RetrySettings {
                max_retries: 50,
                initial_delay_ms: 120_000,
            },
            ..Configuration::default()
        };

        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 5);
        assert!(errors.iter().any(|e| e.contains("bot_token")));
        assert!(errors.iter().any(|e| e.contains("chat_id")));
        assert!(errors.iter().any(|e| e.contains("api_base")));
        assert!(errors.iter().any(|e| e.contains("max_retries")));
        assert!(errors.iter().any(|e| e.contains("initial_delay_ms")));
    }

    #[test]
    fn test_valid_configuration() {
        let config = Configuration {
            telegram: TelegramConfig::new("123456:ABC-def_1", "-100123456"),
            ..Configuration::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_ensure_usable() {
        assert!(TelegramConfig::default().ensure_usable().is_err());
        assert!(TelegramConfig::new("123:abc", "").ensure_usable().is_err());
        assert!(TelegramConfig::new("nodigits", "@chan").ensure_usable().is_err());
        assert!(TelegramConfig::new("123:abc", "@chan").ensure_usable().is_ok());
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = TelegramConfig::new("123456:SECRET", "@chan");
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("SECRET"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_config_file_operations() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.toml");

        let config = Configuration {
            log_level: LogLevel::Debug,
            telegram: TelegramConfig::new("42:token", "@alerts").with_attachments(true),
            ..Configuration::default()
        };

        config.save_to_file(&config_path).unwrap();
        assert!(config_path.exists());

        let loaded = Configuration::load_from_file(&config_path).unwrap();
        assert_eq!(loaded.log_level, LogLevel::Debug);
        assert_eq!(loaded.telegram, config.telegram);
        assert_eq!(loaded.retry, RetrySettings::default());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(&config_path, "[telegram]\nchat_id = \"@alerts\"\n").unwrap();

        let loaded = Configuration::load_from_file(&config_path).unwrap();
        assert_eq!(loaded.telegram.chat_id, "@alerts");
        assert_eq!(loaded.telegram.api_base, DEFAULT_API_BASE);
        assert_eq!(loaded.retry.max_retries, 3);
    }

    #[test]
    fn test_missing_file_returns_default() {
        let temp_dir = tempdir().unwrap();
        let loaded = Configuration::load_from_file(&temp_dir.path().join("absent.toml")).unwrap();
        assert!(loaded.telegram.chat_id.is_empty());
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(&config_path, "log_level = [").unwrap();
        assert!(matches!(
            Configuration::load_from_file(&config_path),
            Err(ConfigError::Parse { .. })
        ));
    }
}
