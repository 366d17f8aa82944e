//! Chunked, resumable upload pipeline for gallery containers.
//!
//! This crate holds the **business logic** of the upload page. It has no
//! HTTP dependency: the console app provides a [`ContainerTransport`]
//! implementation on top of the API client.
//!
//! # Pipeline
//!
//! 1. **Queue**: files are added, renamed, reordered and removed
//! 2. **Pre-check**: the container's item count seeds the order indices
//! 3. **Split**: each file becomes 10 MiB chunk descriptors
//! 4. **Send**: bounded file and chunk concurrency, per-chunk retries
//! 5. **Settle**: failed files stay in the failure set for a retry-only pass

pub mod error;
pub mod manager;
pub mod pool;
pub mod queue;
pub mod retry;
pub mod scheduler;
pub mod transport;
pub mod types;

pub use error::{QueueError, TransportError, UploadError};
pub use manager::UploadManager;
pub use pool::{Pacing, TaskPool};
pub use queue::UploadQueue;
pub use retry::{Backoff, RetryError, RetryPolicy};
pub use scheduler::{CHUNK_BATCH_SIZE, MAX_PARALLEL_FILES, SchedulerConfig, UploadScheduler};
pub use transport::{ContainerTransport, TransportFuture};
pub use types::{FileOutcome, FileState, PassMode, PassSummary, UploadEvent};
