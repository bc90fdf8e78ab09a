//! Inbound notification data

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// An intercepted outbound notification (originally an email) to relay.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRequest {
    /// Recipient addresses, in the order given by the host
    #[serde(default)]
    pub recipients: Vec<String>,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub body: String,
    /// Attachment file paths; may be empty
    #[serde(default)]
    pub attachments: Vec<PathBuf>,
}

impl NotificationRequest {
    pub fn new(
        recipients: Vec<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
        attachments: Vec<PathBuf>,
    ) -> Self {
        Self {
            recipients,
            subject: subject.into(),
            body: body.into(),
            attachments,
        }
    }

    pub fn has_attachments(&self) -> bool {
        !self.attachments.is_empty()
    }
}

/// Base filename of an attachment path, falling back to the full path text
pub fn attachment_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}
