//! Data types for the upload flow.

use gallerydesk_transfer::FileId;
use serde::Serialize;

/// Which files a pass targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PassMode {
    /// Every queued file.
    Full,
    /// Only the files in the failure set.
    RetryFailed,
}

/// Per-file state within a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileState {
    Queued,
    Splitting,
    Uploading,
    Succeeded,
    Failed,
}

impl FileState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

/// Event emitted while a pass runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum UploadEvent {
    PassStarted {
        mode: PassMode,
        files: usize,
        order_base: u64,
    },
    FileState {
        file_id: FileId,
        state: FileState,
    },
    FileProgress {
        file_id: FileId,
        percent: u8,
    },
    FileCompleted {
        file_id: FileId,
    },
    FileFailed {
        file_id: FileId,
        error: String,
    },
    PassFinished {
        succeeded: usize,
        failed: usize,
    },
    /// The pass ended before any chunk was sent, or was cancelled.
    PassAborted {
        error: String,
    },
}

/// Settled result of one file in a pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FileOutcome {
    Succeeded { file_id: FileId },
    Failed { file_id: FileId, error: String },
}

impl FileOutcome {
    pub fn file_id(&self) -> FileId {
        match self {
            Self::Succeeded { file_id } | Self::Failed { file_id, .. } => *file_id,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }
}

/// Result of a completed pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PassSummary {
    pub mode: PassMode,
    /// Order index of the first file; `None` when the pass had nothing to send.
    pub order_base: Option<u64>,
    /// One outcome per file, in pass order.
    pub outcomes: Vec<FileOutcome>,
}

impl PassSummary {
    pub(crate) fn empty(mode: PassMode) -> Self {
        Self {
            mode,
            order_base: None,
            outcomes: Vec::new(),
        }
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn failed_ids(&self) -> Vec<FileId> {
        self.outcomes
            .iter()
            .filter(|o| !o.is_success())
            .map(FileOutcome::file_id)
            .collect()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    /// User-facing alert text, e.g. `"2 files failed"`; `None` when nothing failed.
    pub fn failure_message(&self) -> Option<String> {
        match self.failed() {
            0 => None,
            n => Some(format!("{n} files failed")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_counts() {
        let (a, b, c) = (FileId::new(), FileId::new(), FileId::new());
        let summary = PassSummary {
            mode: PassMode::Full,
            order_base: Some(4),
            outcomes: vec![
                FileOutcome::Succeeded { file_id: a },
                FileOutcome::Failed {
                    file_id: b,
                    error: "x".into(),
                },
                FileOutcome::Failed {
                    file_id: c,
                    error: "y".into(),
                },
            ],
        };
        assert_eq!(summary.succeeded(), 1);
        assert_eq!(summary.failed(), 2);
        assert_eq!(summary.failed_ids(), vec![b, c]);
        assert_eq!(summary.failure_message().as_deref(), Some("2 files failed"));
        assert!(!summary.is_success());
    }

    #[test]
    fn empty_summary_has_no_message() {
        let summary = PassSummary::empty(PassMode::RetryFailed);
        assert!(summary.is_success());
        assert!(summary.failure_message().is_none());
    }

    #[test]
    fn event_serializes_tagged() {
        let json = serde_json::to_value(UploadEvent::PassFinished {
            succeeded: 3,
            failed: 1,
        })
        .unwrap();
        assert_eq!(json["event"], "pass_finished");
        assert_eq!(json["failed"], 1);
    }
}
