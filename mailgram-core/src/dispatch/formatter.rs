//! Renders a notification into one Markdown text payload

use crate::models::{attachment_name, NotificationRequest};

/// Header line used when no title is configured
pub const DEFAULT_TITLE: &str = "📧 *New email notification*";

/// Escape a user-controlled field for Telegram's legacy Markdown renderer.
///
/// `&`, `<`, `>` and quotes are entity-encoded first, then the Markdown
/// control characters `_`, `*`, `` ` `` and `[` are backslash-escaped.
pub fn escape_field(text: &str) -> String {
    let html = html_escape::encode_quoted_attribute(text);
    let mut escaped = String::with_capacity(html.len());
    for ch in html.chars() {
        if matches!(ch, '_' | '*' | '`' | '[') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Turns a [`NotificationRequest`] into the text sent to Telegram, independent
/// of transport limits. Output depends only on the request and the title.
#[derive(Debug, Clone)]
pub struct MessageFormatter {
    title: String,
}

impl Default for MessageFormatter {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
        }
    }
}

impl MessageFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the header line. The title is trusted Markdown and not escaped.
    pub fn with_title(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }

    pub fn format(&self, request: &NotificationRequest) -> String {
        let recipients = request
            .recipients
            .iter()
            .map(|r| escape_field(r))
            .collect::<Vec<_>>()
            .join(", ");

        let mut text = format!(
            "{}\n\nTo: {}\nSubject: {}\nMessage:\n{}\n",
            self.title,
            recipients,
            escape_field(&request.subject),
            escape_field(&request.body),
        );

        if request.has_attachments() {
            text.push_str("\nAttachments:\n");
            for path in &request.attachments {
                text.push_str("- ");
                text.push_str(&escape_field(&attachment_name(path)));
                text.push('\n');
            }
        }

        text
    }
}
