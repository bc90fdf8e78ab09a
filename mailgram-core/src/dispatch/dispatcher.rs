//! Dispatcher: format, split, send chunks in order, then upload attachments.
//!
//! A dispatch moves through `Formatting → Splitting → SendingChunks →
//! SendingAttachments → Done` once. Individual failures are recorded and the
//! loop moves on; only an unusable configuration aborts the call, before any
//! request is made.

use crate::config::ConfigProvider;
use crate::error::DispatchError;
use crate::models::{
    DeliveryFailure, DeliveryStep, DispatchOutcome, MessageChunk, Notice, NotificationRequest,
    TelegramConfig, TELEGRAM_MESSAGE_LIMIT,
};
use crate::providers::{NoticeSink, RawResponse, TelegramApi};
use crate::services::logging::log_delivery_failure;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

use super::formatter::MessageFormatter;
use super::retry::RetryPolicy;
use super::splitter::split_message;

/// Transforms the formatted text before it is split. Receives the original
/// request for inspection.
pub type MessageFilter = Arc<dyn Fn(String, &NotificationRequest) -> String + Send + Sync>;

/// Delivers notifications to one Telegram API endpoint. Holds no per-dispatch
/// state, so one instance can serve concurrent dispatches.
#[derive(Clone)]
pub struct Dispatcher {
    client: Arc<dyn TelegramApi>,
    formatter: MessageFormatter,
    retry: RetryPolicy,
    filter: Option<MessageFilter>,
    notices: Option<Arc<dyn NoticeSink>>,
    chunk_limit: usize,
}

impl Dispatcher {
    pub fn new(client: Arc<dyn TelegramApi>) -> Self {
        Self {
            client,
            formatter: MessageFormatter::default(),
            retry: RetryPolicy::default(),
            filter: None,
            notices: None,
            chunk_limit: TELEGRAM_MESSAGE_LIMIT,
        }
    }

    pub fn with_formatter(mut self, formatter: MessageFormatter) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(String, &NotificationRequest) -> String + Send + Sync + 'static,
    {
        self.filter = Some(Arc::new(filter));
        self
    }

    pub fn with_notice_sink(mut self, sink: Arc<dyn NoticeSink>) -> Self {
        self.notices = Some(sink);
        self
    }

    /// Override the chunk size (for self-hosted Bot API servers with other limits)
    pub fn with_chunk_limit(mut self, limit: usize) -> Self {
        self.chunk_limit = limit.max(1);
        self
    }

    /// Format, filter and split a request into the chunks that would be sent
    pub fn prepare(&self, request: &NotificationRequest) -> Vec<MessageChunk> {
        let mut text = self.formatter.format(request);
        if let Some(filter) = &self.filter {
            text = filter(text, request);
        }
        split_message(&text, self.chunk_limit)
    }

    /// Deliver `request` using `config`
    pub async fn dispatch(
        &self,
        request: &NotificationRequest,
        config: &TelegramConfig,
    ) -> Result<DispatchOutcome, DispatchError> {
        self.dispatch_with_cancel(request, config, &CancellationToken::new())
            .await
    }

    /// Load the configuration from `provider`, then deliver `request`
    pub async fn dispatch_from(
        &self,
        request: &NotificationRequest,
        provider: &dyn ConfigProvider,
    ) -> Result<DispatchOutcome, DispatchError> {
        let config = match provider.load() {
            Ok(config) => config,
            Err(e) => {
                let err = DispatchError::Configuration(e.to_string());
                self.report(&Notice::from_error(&err));
                return Err(err);
            }
        };
        self.dispatch(request, &config).await
    }

    /// Deliver `request`, stopping before the next remote call once `cancel`
    /// fires. A rate-limit backoff in progress ends early; calls already in
    /// flight complete.
    pub async fn dispatch_with_cancel(
        &self,
        request: &NotificationRequest,
        config: &TelegramConfig,
        cancel: &CancellationToken,
    ) -> Result<DispatchOutcome, DispatchError> {
        let span = tracing::info_span!(
            "dispatch",
            dispatch_id = %Uuid::new_v4(),
            chat_id = %config.chat_id,
        );
        self.run(request, config, cancel).instrument(span).await
    }

    async fn run(
        &self,
        request: &NotificationRequest,
        config: &TelegramConfig,
        cancel: &CancellationToken,
    ) -> Result<DispatchOutcome, DispatchError> {
        if let Err(reason) = config.ensure_usable() {
            let err = DispatchError::Configuration(reason);
            tracing::warn!("Dispatch aborted: {}", err);
            self.report(&Notice::from_error(&err));
            return Err(err);
        }

        let chunks = self.prepare(request);
        tracing::debug!(chunks = chunks.len(), "Message prepared");

        let mut outcome = DispatchOutcome::default();
        let chunks_ok = self.send_chunks(&chunks, config, cancel, &mut outcome).await;

        if chunks_ok && config.send_attachments && request.has_attachments() {
            self.send_attachments(&request.attachments, config, cancel, &mut outcome)
                .await;
        }

        outcome.success = outcome.failures.is_empty() && !outcome.cancelled;
        tracing::info!(
            success = outcome.success,
            chunks_sent = outcome.chunks_sent,
            attachments_sent = outcome.attachments_sent,
            failures = outcome.failures.len(),
            "Dispatch finished"
        );
        Ok(outcome)
    }

    /// Returns true if every chunk was delivered
    async fn send_chunks(
        &self,
        chunks: &[MessageChunk],
        config: &TelegramConfig,
        cancel: &CancellationToken,
        outcome: &mut DispatchOutcome,
    ) -> bool {
        let client = self.client.as_ref();
        let token = config.bot_token.as_str();
        let chat_id = config.chat_id.as_str();
        let mut all_sent = true;

        for chunk in chunks {
            if cancel.is_cancelled() {
                tracing::info!("Dispatch cancelled before part {}", chunk.index + 1);
                outcome.cancelled = true;
                return false;
            }

            tracing::debug!(
                index = chunk.index,
                chars = chunk.char_len(),
                "Sending message part"
            );
            let text = chunk.text.as_str();
            match self
                .retry
                .execute_with_cancel(move || client.send_text(token, chat_id, text), cancel)
                .await
            {
                Ok(_) => outcome.chunks_sent += 1,
                Err(DispatchError::Cancelled) => {
                    tracing::info!("Dispatch cancelled while sending part {}", chunk.index + 1);
                    outcome.cancelled = true;
                    return false;
                }
                Err(err) => {
                    all_sent = false;
                    self.record(outcome, DeliveryStep::Chunk { index: chunk.index }, err);
                }
            }
        }

        all_sent
    }

    async fn send_attachments(
        &self,
        attachments: &[std::path::PathBuf],
        config: &TelegramConfig,
        cancel: &CancellationToken,
        outcome: &mut DispatchOutcome,
    ) {
        for path in attachments {
            if cancel.is_cancelled() {
                tracing::info!("Dispatch cancelled before attachment upload");
                outcome.cancelled = true;
                return;
            }

            if is_missing(path).await {
                tracing::debug!(path = %path.display(), "Attachment not found, skipping");
                outcome.attachments_skipped += 1;
                continue;
            }

            tracing::debug!(path = %path.display(), "Uploading attachment");
            let result = self
                .client
                .send_document(&config.bot_token, &config.chat_id, path)
                .await
                .map_err(DispatchError::from)
                .and_then(document_result);

            match result {
                Ok(()) => outcome.attachments_sent += 1,
                Err(err) => self.record(
                    outcome,
                    DeliveryStep::Attachment {
                        path: path.to_path_buf(),
                    },
                    err,
                ),
            }
        }
    }

    fn record(&self, outcome: &mut DispatchOutcome, step: DeliveryStep, error: DispatchError) {
        let failure = DeliveryFailure::new(step, error);
        log_delivery_failure(&failure);
        self.report(&failure.to_notice());
        outcome.failures.push(failure);
    }

    fn report(&self, notice: &Notice) {
        if let Some(sink) = &self.notices {
            sink.report(notice);
        }
    }
}

/// sendDocument is not retried, so a 429 here is terminal
fn document_result(response: RawResponse) -> Result<(), DispatchError> {
    let api = response.api_result();
    if api.ok {
        Ok(())
    } else if response.is_rate_limited() {
        Err(DispatchError::RateLimited { retries: 0 })
    } else {
        Err(DispatchError::Api {
            code: api.error_code,
            description: api.description_or_default(),
        })
    }
}

/// Only a confirmed absence skips the upload; a stat error falls through so
/// the read failure is recorded
async fn is_missing(path: &Path) -> bool {
    matches!(tokio::fs::try_exists(path).await, Ok(false))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;

    #[test]
    fn test_document_result_mapping() {
        assert!(document_result(RawResponse::new(200, r#"{"ok":true}"#)).is_ok());

        let limited = document_result(RawResponse::new(
            429,
            r#"{"ok":false,"error_code":429,"description":"Too Many Requests"}"#,
        ))
        .unwrap_err();
        assert_eq!(limited.kind(), FailureKind::RateLimit);

        let api = document_result(RawResponse::new(
            400,
            r#"{"ok":false,"error_code":400,"description":"Bad Request: file is empty"}"#,
        ))
        .unwrap_err();
        assert_eq!(
            api.to_string(),
            "Telegram API error 400: Bad Request: file is empty"
        );
    }

    #[tokio::test]
    async fn test_is_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        assert!(is_missing(&path).await);
        std::fs::write(&path, "x").unwrap();
        assert!(!is_missing(&path).await);
    }

    #[tokio::test]
    async fn test_stat_error_is_not_missing() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("plain.txt");
        std::fs::write(&file, "x").unwrap();

        // A regular file used as a directory fails with ENOTDIR, not NotFound
        assert!(!is_missing(&file.join("child.pdf")).await);
    }
}
