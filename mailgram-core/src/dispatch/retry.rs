//! Rate-limit retry with exponential backoff for sendMessage

use crate::error::{DispatchError, TransportError};
use crate::models::RetrySettings;
use crate::providers::RawResponse;
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Source of backoff delays. Production code suspends the task on the tokio
/// timer; tests substitute a recorder.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer, leaving other tasks free to run
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Bounded retry for responses carrying `error_code = 429`.
///
/// Transport errors and other API errors are returned at once. The delay
/// starts at `initial_delay` and doubles after every retry, without jitter or
/// cap, so an always-limited remote is called `max_retries + 1` times.
#[derive(Clone)]
pub struct RetryPolicy {
    max_retries: u32,
    initial_delay: Duration,
    sleeper: Arc<dyn Sleeper>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_settings(&RetrySettings::default())
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, initial_delay: Duration) -> Self {
        Self {
            max_retries,
            initial_delay,
            sleeper: Arc::new(TokioSleeper),
        }
    }

    pub fn from_settings(settings: &RetrySettings) -> Self {
        Self::new(settings.max_retries, settings.initial_delay())
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn initial_delay(&self) -> Duration {
        self.initial_delay
    }

    /// Run `op` until it succeeds, fails for a reason other than rate
    /// limiting, or the retry budget is spent.
    pub async fn execute<F, Fut>(&self, op: F) -> Result<RawResponse, DispatchError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<RawResponse, TransportError>>,
    {
        self.execute_with_cancel(op, &CancellationToken::new()).await
    }

    /// Like [`execute`](Self::execute), but returns
    /// [`DispatchError::Cancelled`] instead of making another call once
    /// `cancel` fires. A pending backoff ends as soon as the token fires.
    pub async fn execute_with_cancel<F, Fut>(
        &self,
        mut op: F,
        cancel: &CancellationToken,
    ) -> Result<RawResponse, DispatchError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<RawResponse, TransportError>>,
    {
        let mut delay = self.initial_delay;
        let mut retries = 0;

        loop {
            if cancel.is_cancelled() {
                return Err(DispatchError::Cancelled);
            }

            let response = op().await?;
            let api = response.api_result();

            if api.ok {
                if retries > 0 {
                    tracing::debug!("Telegram call succeeded after {} retries", retries);
                }
                return Ok(response);
            }

            let rate_limited = response.status == 429 || api.error_code == Some(429);
            if !rate_limited {
                return Err(DispatchError::Api {
                    code: api.error_code,
                    description: api.description_or_default(),
                });
            }

            if retries >= self.max_retries {
                tracing::warn!(
                    "Telegram rate limit: max retries ({}) exceeded",
                    self.max_retries
                );
                return Err(DispatchError::RateLimited { retries });
            }

            retries += 1;
            tracing::info!(
                "Telegram rate limited (429), retrying after {:?} (retry {}/{})",
                delay,
                retries,
                self.max_retries
            );
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Backoff interrupted by cancellation");
                    return Err(DispatchError::Cancelled);
                }
                _ = self.sleeper.sleep(delay) => {}
            }
            delay = delay.saturating_mul(2);
        }
    }
}
