//! # Mailgram Core Library
//!
//! Relays intercepted outbound notifications to a Telegram chat: formats the
//! notification, splits it to the Bot API message limit, sends each part with
//! rate-limit backoff and uploads attachments.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod models;
pub mod providers;
pub mod services;

pub use dispatch::Dispatcher;
pub use error::{ConfigError, DispatchError, FailureKind, TransportError};
pub use models::{DispatchOutcome, NotificationRequest, TelegramConfig};
