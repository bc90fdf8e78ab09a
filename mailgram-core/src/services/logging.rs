//! Logging service

use crate::models::{DeliveryFailure, LogLevel, Notice};
use tracing_subscriber::EnvFilter;

/// Filter directive for both the library and the `mailgram` binary
fn filter_for(level: LogLevel) -> String {
    let level = level.as_str();
    format!("mailgram_core={level},mailgram={level}")
}

/// Initialize logging with the specified level. `RUST_LOG` takes precedence
/// when set.
pub fn init_logging(level: LogLevel) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_for(level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
}

/// Log a failed chunk or attachment send
pub fn log_delivery_failure(failure: &DeliveryFailure) {
    tracing::warn!(
        kind = failure.kind().as_str(),
        step = %failure.step,
        error = %failure.error,
        "Delivery step failed"
    );
}

/// Log a notice handed to a sink
pub fn log_notice(notice: &Notice) {
    tracing::warn!(
        kind = notice.kind.as_str(),
        message = notice.message.as_str(),
        "Dispatch notice"
    );
}
