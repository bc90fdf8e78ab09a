//! Notice sink: outbound diagnostic surface for delivery failures

use crate::models::Notice;
use crate::services::logging::log_notice;

/// Receives one notice per recorded failure. Rendering (admin notices, CLI
/// output, alerts) is up to the implementation.
pub trait NoticeSink: Send + Sync {
    /// Sink name for logging (e.g. "tracing").
    fn name(&self) -> &str;

    /// Report a failure. Must not block the dispatch for long.
    fn report(&self, notice: &Notice);
}

/// Sink that emits each notice as a structured warn event
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNoticeSink;

impl NoticeSink for TracingNoticeSink {
    fn name(&self) -> &str {
        "tracing"
    }

    fn report(&self, notice: &Notice) {
        log_notice(notice);
    }
}
