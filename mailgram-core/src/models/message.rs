//! Message chunk data structures

use serde::{Deserialize, Serialize};

/// Telegram's sendMessage text limit, in characters
pub const TELEGRAM_MESSAGE_LIMIT: usize = 4096;

/// One transport-sized segment of a formatted message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageChunk {
    /// 0-based position in the sequence
    pub index: usize,
    pub text: String,
}

impl MessageChunk {
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
        }
    }

    /// Length in characters, as Telegram counts it against the limit
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}
