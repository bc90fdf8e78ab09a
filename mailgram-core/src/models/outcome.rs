//! Dispatch outcome and failure records

use crate::error::{DispatchError, FailureKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use super::notification::attachment_name;

/// The remote call a failure belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryStep {
    /// sendMessage for the chunk at this index
    Chunk { index: usize },
    /// sendDocument for this attachment
    Attachment { path: PathBuf },
}

impl fmt::Display for DeliveryStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryStep::Chunk { index } => write!(f, "message part {}", index + 1),
            DeliveryStep::Attachment { path } => write!(f, "attachment {}", attachment_name(path)),
        }
    }
}

/// One failed remote call within a dispatch
#[derive(Debug)]
pub struct DeliveryFailure {
    pub step: DeliveryStep,
    pub error: DispatchError,
}

impl DeliveryFailure {
    pub fn new(step: DeliveryStep, error: DispatchError) -> Self {
        Self { step, error }
    }

    pub fn kind(&self) -> FailureKind {
        self.error.kind()
    }

    /// Human-readable description, suitable for an admin notice
    pub fn message(&self) -> String {
        format!("Failed to send {}: {}", self.step, self.error)
    }

    pub fn to_notice(&self) -> Notice {
        Notice {
            kind: self.kind(),
            message: self.message(),
        }
    }
}

/// Structured diagnostic record handed to a [`crate::providers::NoticeSink`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub kind: FailureKind,
    pub message: String,
}

impl Notice {
    pub fn from_error(error: &DispatchError) -> Self {
        Self {
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

/// Result of one dispatch call
#[derive(Debug, Default)]
pub struct DispatchOutcome {
    /// True iff every attempted send succeeded and the dispatch ran to completion
    pub success: bool,
    pub failures: Vec<DeliveryFailure>,
    pub chunks_sent: usize,
    pub attachments_sent: usize,
    /// Attachments not found on disk
    pub attachments_skipped: usize,
    pub cancelled: bool,
}

impl DispatchOutcome {
    pub fn notices(&self) -> Vec<Notice> {
        self.failures.iter().map(DeliveryFailure::to_notice).collect()
    }

    pub fn chunk_failures(&self) -> impl Iterator<Item = &DeliveryFailure> {
        self.failures
            .iter()
            .filter(|f| matches!(f.step, DeliveryStep::Chunk { .. }))
    }
}
