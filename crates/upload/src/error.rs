//! Upload pipeline error types.

use gallerydesk_transfer::FileId;

use crate::retry::RetryError;

/// Failure of a single request against the content backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// Network failure or timeout: no HTTP status was received.
    #[error("no response: {0}")]
    NoResponse(String),

    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("request cancelled")]
    Cancelled,
}

impl TransportError {
    /// No response at all, or a server-side (5xx) status.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::NoResponse(_) => true,
            Self::Status { status, .. } => *status >= 500,
            Self::Cancelled => false,
        }
    }
}

/// Pass-level failures. File-level failures are reported in the
/// [`PassSummary`](crate::PassSummary) instead.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("no target container selected")]
    NoContainer,

    #[error("container pre-check failed: {0}")]
    PreCheck(RetryError<TransportError>),

    #[error("an upload pass is already running")]
    Busy,

    #[error("upload cancelled")]
    Cancelled,
}

/// Invalid queue addressing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueueError {
    #[error("index {index} out of range (queue has {len} entries)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("no queued file with id {0}")]
    UnknownFile(FileId),
}
