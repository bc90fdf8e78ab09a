//! Bot token and chat id validation
//!
//! Token: `^\d+:[\w-]+$`. Chat id: `^@[\w_]+$` or `^-?\d+$`.
//! `\w` here is ASCII letters, digits and underscore.

use thiserror::Error;

/// Errors that can occur during credential validation
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CredentialError {
    #[error("bot token is empty")]
    EmptyToken,

    #[error("bot token must look like <digits>:<token characters>")]
    MalformedToken,

    #[error("chat id is empty")]
    EmptyChatId,

    #[error("chat id must be a numeric id or an @username")]
    MalformedChatId,
}

fn is_word_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

/// Validate a bot token
pub fn validate_bot_token(token: &str) -> Result<(), CredentialError> {
    if token.is_empty() {
        return Err(CredentialError::EmptyToken);
    }

    let (bot_id, secret) = token
        .split_once(':')
        .ok_or(CredentialError::MalformedToken)?;

    if !is_digits(bot_id) {
        return Err(CredentialError::MalformedToken);
    }

    if secret.is_empty() || !secret.chars().all(|c| is_word_char(c) || c == '-') {
        return Err(CredentialError::MalformedToken);
    }

    Ok(())
}

/// Validate a chat id
pub fn validate_chat_id(chat_id: &str) -> Result<(), CredentialError> {
    if chat_id.is_empty() {
        return Err(CredentialError::EmptyChatId);
    }

    let valid = if let Some(handle) = chat_id.strip_prefix('@') {
        !handle.is_empty() && handle.chars().all(is_word_char)
    } else {
        is_digits(chat_id.strip_prefix('-').unwrap_or(chat_id))
    };

    if valid {
        Ok(())
    } else {
        Err(CredentialError::MalformedChatId)
    }
}

/// Check if a bot token is valid (convenience function)
pub fn is_valid_bot_token(token: &str) -> bool {
    validate_bot_token(token).is_ok()
}

/// Check if a chat id is valid (convenience function)
pub fn is_valid_chat_id(chat_id: &str) -> bool {
    validate_chat_id(chat_id).is_ok()
}
