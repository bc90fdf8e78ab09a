//! Communication providers: the Telegram Bot API client and notice sinks

mod sink;
mod telegram;

pub use sink::{NoticeSink, TracingNoticeSink};
pub use telegram::{
    mime_type_for, ApiResponse, HttpTelegramClient, RawResponse, TelegramApi, PARSE_MODE,
    REQUEST_TIMEOUT_SECS,
};
