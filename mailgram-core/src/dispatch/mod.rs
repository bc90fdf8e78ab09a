//! Notification dispatch pipeline: formatter, splitter, retry policy and
//! the dispatcher that drives them

mod dispatcher;
mod formatter;
mod retry;
mod splitter;

pub use dispatcher::{Dispatcher, MessageFilter};
pub use formatter::{escape_field, MessageFormatter, DEFAULT_TITLE};
pub use retry::{RetryPolicy, Sleeper, TokioSleeper};
pub use splitter::{split_for_telegram, split_message};
