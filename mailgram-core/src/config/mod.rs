//! Configuration providers
//!
//! The dispatcher never reads settings storage itself; it receives a
//! [`TelegramConfig`] per call. A [`ConfigProvider`] is the narrow capability
//! that produces one.

pub mod validation;

use crate::error::ConfigError;
use crate::models::{Configuration, TelegramConfig};
use std::path::{Path, PathBuf};

/// Environment variable overriding `telegram.bot_token`
pub const ENV_BOT_TOKEN: &str = "MAILGRAM_TELEGRAM_BOT_TOKEN";
/// Environment variable overriding `telegram.chat_id`
pub const ENV_CHAT_ID: &str = "MAILGRAM_TELEGRAM_CHAT_ID";

/// Source of dispatch credentials and options
pub trait ConfigProvider: Send + Sync {
    fn load(&self) -> Result<TelegramConfig, ConfigError>;
}

/// Fixed configuration, for embedding hosts that already hold validated settings
#[derive(Debug, Clone)]
pub struct StaticConfigProvider {
    config: TelegramConfig,
}

impl StaticConfigProvider {
    pub fn new(config: TelegramConfig) -> Self {
        Self { config }
    }
}

impl ConfigProvider for StaticConfigProvider {
    fn load(&self) -> Result<TelegramConfig, ConfigError> {
        Ok(self.config.clone())
    }
}

/// TOML file provider with environment overrides for the credentials
#[derive(Debug, Clone)]
pub struct FileConfigProvider {
    path: PathBuf,
    use_env: bool,
}

impl FileConfigProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            use_env: true,
        }
    }

    /// Ignore `MAILGRAM_TELEGRAM_*` environment variables
    pub fn without_env(mut self) -> Self {
        self.use_env = false;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Full configuration with env overrides applied; not validated
    pub fn load_configuration(&self) -> Result<Configuration, ConfigError> {
        let mut config = Configuration::load_from_file(&self.path)?;
        if self.use_env {
            apply_env_overrides(&mut config, |key| std::env::var(key).ok());
        }
        Ok(config)
    }
}

impl ConfigProvider for FileConfigProvider {
    fn load(&self) -> Result<TelegramConfig, ConfigError> {
        let config = self.load_configuration()?;
        config.validate().map_err(ConfigError::Invalid)?;
        Ok(config.telegram)
    }
}

fn apply_env_overrides(config: &mut Configuration, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(token) = lookup(ENV_BOT_TOKEN).filter(|v| !v.trim().is_empty()) {
        config.telegram.bot_token = token.trim().to_string();
    }
    if let Some(chat_id) = lookup(ENV_CHAT_ID).filter(|v| !v.trim().is_empty()) {
        config.telegram.chat_id = chat_id.trim().to_string();
    }
}

/// Credential status for display, without revealing secrets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderStatus {
    Configured,
    MissingToken,
    MissingChatId,
    Invalid,
}

impl ProviderStatus {
    pub fn of(config: &TelegramConfig) -> Self {
        if config.bot_token.trim().is_empty() {
            ProviderStatus::MissingToken
        } else if config.chat_id.trim().is_empty() {
            ProviderStatus::MissingChatId
        } else if config.ensure_usable().is_err() {
            ProviderStatus::Invalid
        } else {
            ProviderStatus::Configured
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderStatus::Configured => "configured",
            ProviderStatus::MissingToken => "missing_token",
            ProviderStatus::MissingChatId => "missing_chat_id",
            ProviderStatus::Invalid => "invalid",
        }
    }
}
