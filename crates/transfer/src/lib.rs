//! Upload data model for the gallery console.
//!
//! Queued files with stable identities, filename normalization, the chunk
//! splitter that turns one file into upload requests, and the process-wide
//! progress/failure tracker the UI reads from.

mod chunked;
mod naming;
mod progress;
mod types;

pub use chunked::{ChunkDescriptor, ChunkSplitter, next_attempt_stamp, total_chunks};
pub use naming::{file_identifier, is_preserved_name, normalize_display_name};
pub use progress::{FileProgress, ProgressCallback, ProgressSnapshot, ProgressTracker};
pub use types::{FileEntry, FileId, FileSource};

/// Fixed chunk size: 10 MiB.
pub const CHUNK_SIZE: usize = 10 * 1024 * 1024;

/// Errors produced by the transfer crate.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid file name: {0}")]
    InvalidName(String),
}
