//! Test doubles shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use mailgram_core::dispatch::{RetryPolicy, Sleeper};
use mailgram_core::models::Notice;
use mailgram_core::providers::{NoticeSink, RawResponse, TelegramApi};
use mailgram_core::TransportError;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const TOKEN: &str = "123456:TEST-token";
pub const CHAT_ID: &str = "@alerts";

/// One remote call seen by [`ScriptedTelegram`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Text { chat_id: String, text: String },
    Document { chat_id: String, path: PathBuf },
}

pub type Reply = Result<RawResponse, TransportError>;

/// In-process Bot API that answers from per-method scripts and records calls.
/// When a script runs out it answers `{"ok":true}`.
#[derive(Default)]
pub struct ScriptedTelegram {
    text_replies: Mutex<VecDeque<Reply>>,
    document_replies: Mutex<VecDeque<Reply>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedTelegram {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_text_replies(replies: Vec<Reply>) -> Arc<Self> {
        let api = Self::default();
        *api.text_replies.lock().unwrap() = replies.into();
        Arc::new(api)
    }

    pub fn push_document_reply(&self, reply: Reply) {
        self.document_replies.lock().unwrap().push_back(reply);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn text_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Text { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn document_calls(&self) -> Vec<PathBuf> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Document { path, .. } => Some(path),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl TelegramApi for ScriptedTelegram {
    async fn send_text(&self, _token: &str, chat_id: &str, text: &str) -> Reply {
        self.calls.lock().unwrap().push(Call::Text {
            chat_id: chat_id.to_string(),
            text: text.to_string(),
        });
        self.text_replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(ok()))
    }

    async fn send_document(&self, _token: &str, chat_id: &str, path: &Path) -> Reply {
        self.calls.lock().unwrap().push(Call::Document {
            chat_id: chat_id.to_string(),
            path: path.to_path_buf(),
        });
        self.document_replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(ok()))
    }
}

pub fn ok() -> RawResponse {
    RawResponse::new(200, r#"{"ok":true,"result":{"message_id":1}}"#)
}

pub fn rate_limited() -> RawResponse {
    RawResponse::new(
        429,
        r#"{"ok":false,"error_code":429,"description":"Too Many Requests: retry after 1"}"#,
    )
}

pub fn api_error(code: i64, description: &str) -> RawResponse {
    RawResponse::new(
        400,
        format!(r#"{{"ok":false,"error_code":{code},"description":"{description}"}}"#),
    )
}

/// Clock double: records requested delays and returns immediately
#[derive(Default)]
pub struct RecordingSleeper {
    delays: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn delays(&self) -> Vec<Duration> {
        self.delays.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.delays.lock().unwrap().push(duration);
    }
}

pub fn recorded_retry_policy() -> (RetryPolicy, Arc<RecordingSleeper>) {
    let sleeper = Arc::new(RecordingSleeper::default());
    let policy = RetryPolicy::new(3, Duration::from_secs(1)).with_sleeper(sleeper.clone());
    (policy, sleeper)
}

/// Notice sink that keeps everything it is given
#[derive(Default)]
pub struct RecordingNoticeSink {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNoticeSink {
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }
}

impl NoticeSink for RecordingNoticeSink {
    fn name(&self) -> &str {
        "recording"
    }

    fn report(&self, notice: &Notice) {
        self.notices.lock().unwrap().push(notice.clone());
    }
}
