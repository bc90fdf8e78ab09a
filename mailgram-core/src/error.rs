//! Error taxonomy for dispatch and configuration

use std::path::PathBuf;
use thiserror::Error;

/// Failure to get a request to the Telegram API and a response back.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("cannot read attachment {path}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        // reqwest embeds the full URL (and so the bot token) in its Display output
        let err = err.without_url();
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_connect() {
            TransportError::Connect(err.to_string())
        } else {
            TransportError::Request(err.to_string())
        }
    }
}

/// Errors produced while dispatching a notification.
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Telegram API rate limit exceeded after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("Telegram API error{}: {description}", .code.map(|c| format!(" {}", c)).unwrap_or_default())]
    Api {
        code: Option<i64>,
        description: String,
    },

    #[error("dispatch cancelled")]
    Cancelled,
}

impl DispatchError {
    /// Category used for diagnostics
    pub fn kind(&self) -> FailureKind {
        match self {
            DispatchError::Configuration(_) => FailureKind::Configuration,
            DispatchError::Transport(_) => FailureKind::Transport,
            DispatchError::RateLimited { .. } => FailureKind::RateLimit,
            DispatchError::Api { .. } => FailureKind::Api,
            DispatchError::Cancelled => FailureKind::Cancelled,
        }
    }
}

/// Failure category surfaced to notice sinks
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum FailureKind {
    #[serde(rename = "configuration")]
    Configuration,
    #[serde(rename = "transport")]
    Transport,
    #[serde(rename = "rate_limit")]
    RateLimit,
    #[serde(rename = "api")]
    Api,
    #[serde(rename = "cancelled")]
    Cancelled,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Configuration => "configuration",
            FailureKind::Transport => "transport",
            FailureKind::RateLimit => "rate_limit",
            FailureKind::Api => "api",
            FailureKind::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors loading or validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("cannot write config file {path}: {message}")]
    Write { path: PathBuf, message: String },

    #[error("could not determine config directory")]
    NoConfigDir,

    #[error("invalid configuration: {}", .0.join("; "))]
    Invalid(Vec<String>),
}
