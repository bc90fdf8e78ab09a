//! Data models for mailgram

pub mod configuration;
pub mod message;
pub mod notification;
pub mod outcome;

pub use configuration::*;
pub use message::*;
pub use notification::*;
pub use outcome::*;
