//! Transport scheduler: runs upload passes against one container.
//!
//! A pass checks the container once, then uploads files through two nested
//! [`TaskPool`]s: up to `max_parallel_files` files at a time and, within each
//! file, up to `chunk_batch_size` chunks at a time. Every chunk request goes
//! through the shared [`RetryPolicy`]. Files settle independently: one file
//! failing never cancels its siblings.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Mutex, PoisonError};

use gallerydesk_transfer::{CHUNK_SIZE, ChunkDescriptor, ChunkSplitter, FileEntry, FileId, ProgressTracker};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::error::{TransportError, UploadError};
use crate::pool::{Pacing, TaskPool};
use crate::retry::{RetryError, RetryPolicy};
use crate::transport::ContainerTransport;
use crate::types::{FileOutcome, FileState, PassMode, PassSummary, UploadEvent};

/// Files uploaded concurrently.
pub const MAX_PARALLEL_FILES: usize = 4;
/// Chunks of one file sent concurrently.
pub const CHUNK_BATCH_SIZE: usize = 5;

/// Scheduler tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchedulerConfig {
    pub max_parallel_files: usize,
    pub chunk_batch_size: usize,
    pub chunk_size: usize,
    pub retry: RetryPolicy,
    pub pacing: Pacing,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_parallel_files: MAX_PARALLEL_FILES,
            chunk_batch_size: CHUNK_BATCH_SIZE,
            chunk_size: CHUNK_SIZE,
            retry: RetryPolicy::default(),
            pacing: Pacing::Waves,
        }
    }
}

impl SchedulerConfig {
    /// Upper bound on chunk requests in flight at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_parallel_files.max(1) * self.chunk_batch_size.max(1)
    }
}

/// Runs upload passes and reports progress to a [`ProgressTracker`].
///
/// At most one pass runs at a time. Passes operate on the entries they are
/// given; later queue edits do not affect a running pass.
pub struct UploadScheduler {
    config: SchedulerConfig,
    splitter: ChunkSplitter,
    tracker: ProgressTracker,
    busy: AtomicBool,
    cancel: Mutex<CancellationToken>,
    events_tx: mpsc::UnboundedSender<UploadEvent>,
    events_rx: Option<mpsc::UnboundedReceiver<UploadEvent>>,
}

/// Clears the busy flag and replaces a used-up cancellation token.
struct PassGuard<'a> {
    scheduler: &'a UploadScheduler,
}

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        let mut token = self
            .scheduler
            .cancel
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if token.is_cancelled() {
            *token = CancellationToken::new();
        }
        self.scheduler.busy.store(false, Ordering::SeqCst);
    }
}

impl UploadScheduler {
    pub fn new(config: SchedulerConfig, tracker: ProgressTracker) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            splitter: ChunkSplitter::new(config.chunk_size),
            config,
            tracker,
            busy: AtomicBool::new(false),
            cancel: Mutex::new(CancellationToken::new()),
            events_tx,
            events_rx: Some(events_rx),
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn tracker(&self) -> &ProgressTracker {
        &self.tracker
    }

    /// Takes the event receiver. Can only be called once.
    pub fn take_events(&mut self) -> Option<mpsc::UnboundedReceiver<UploadEvent>> {
        self.events_rx.take()
    }

    /// Token of the running pass, or of the next one if none is running.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Cancels the running pass. Unfinished files end up in the failure set.
    ///
    /// Does nothing while no pass is running, so the next pass starts clean.
    pub fn cancel(&self) {
        if !self.is_busy() {
            debug!("cancel requested with no pass running");
            return;
        }
        self.cancel_token().cancel();
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Uploads every entry, resetting previous progress and failures.
    pub async fn upload(
        &self,
        conn: &dyn ContainerTransport,
        container_id: &str,
        entries: &[FileEntry],
    ) -> Result<PassSummary, UploadError> {
        let files: Vec<&FileEntry> = entries.iter().collect();
        self.run_pass(conn, container_id, files, PassMode::Full).await
    }

    /// Re-uploads only the entries currently in the failure set.
    ///
    /// Succeeded files are never re-sent. With an empty failure set this
    /// returns an empty summary without issuing any request.
    pub async fn retry_failed(
        &self,
        conn: &dyn ContainerTransport,
        container_id: &str,
        entries: &[FileEntry],
    ) -> Result<PassSummary, UploadError> {
        let failed = self.tracker.failed_ids();
        let files: Vec<&FileEntry> = entries
            .iter()
            .filter(|e| failed.contains(&e.id()))
            .collect();
        self.run_pass(conn, container_id, files, PassMode::RetryFailed)
            .await
    }

    async fn run_pass(
        &self,
        conn: &dyn ContainerTransport,
        container_id: &str,
        files: Vec<&FileEntry>,
        mode: PassMode,
    ) -> Result<PassSummary, UploadError> {
        let container_id = container_id.trim();
        if container_id.is_empty() {
            warn!("upload requested without a target container");
            return Err(UploadError::NoContainer);
        }
        if files.is_empty() {
            debug!(?mode, "nothing to upload");
            return Ok(PassSummary::empty(mode));
        }

        let _guard = self.acquire()?;
        let cancel = self.cancel_token();

        if mode == PassMode::Full {
            self.tracker.reset();
        }
        for entry in &files {
            self.emit_state(entry.id(), FileState::Queued);
        }

        // Pre-check: one item count per pass seeds every order index.
        let precheck = self
            .config
            .retry
            .run(&cancel, TransportError::is_retryable, |attempt, token| {
                debug!(container = %container_id, attempt, "fetching container item count");
                conn.item_count(container_id, token)
            })
            .await;
        let item_count = match precheck {
            Ok(n) => n,
            Err(RetryError::Cancelled) => {
                self.emit(UploadEvent::PassAborted {
                    error: UploadError::Cancelled.to_string(),
                });
                return Err(UploadError::Cancelled);
            }
            Err(e) => {
                error!(container = %container_id, error = %e, "container pre-check failed");
                let err = UploadError::PreCheck(e);
                self.emit(UploadEvent::PassAborted {
                    error: err.to_string(),
                });
                return Err(err);
            }
        };

        let order_base = item_count + 1;
        info!(
            ?mode,
            container = %container_id,
            files = files.len(),
            order_base,
            "upload pass started"
        );
        self.emit(UploadEvent::PassStarted {
            mode,
            files: files.len(),
            order_base,
        });

        let pool = TaskPool::new(self.config.max_parallel_files, self.config.pacing);
        let outcomes = pool
            .run_all(files.iter().enumerate().map(|(index, entry)| {
                self.upload_file(conn, entry, index, order_base, container_id, &cancel)
            }))
            .await;

        let summary = PassSummary {
            mode,
            order_base: Some(order_base),
            outcomes,
        };

        if cancel.is_cancelled() {
            warn!(
                succeeded = summary.succeeded(),
                failed = summary.failed(),
                "upload pass cancelled"
            );
            self.emit(UploadEvent::PassAborted {
                error: UploadError::Cancelled.to_string(),
            });
            return Err(UploadError::Cancelled);
        }

        info!(
            succeeded = summary.succeeded(),
            failed = summary.failed(),
            "upload pass finished"
        );
        self.emit(UploadEvent::PassFinished {
            succeeded: summary.succeeded(),
            failed: summary.failed(),
        });
        Ok(summary)
    }

    async fn upload_file(
        &self,
        conn: &dyn ContainerTransport,
        entry: &FileEntry,
        pass_index: usize,
        order_base: u64,
        container_id: &str,
        cancel: &CancellationToken,
    ) -> FileOutcome {
        let file_id = entry.id();
        if cancel.is_cancelled() {
            return self.fail_file(file_id, UploadError::Cancelled.to_string());
        }

        self.emit_state(file_id, FileState::Splitting);
        let chunks = self
            .splitter
            .split(entry, pass_index, order_base, container_id);
        let total = chunks.len() as u32;
        debug!(
            file = %entry.raw_name(),
            %file_id,
            chunks = total,
            order_index = order_base + pass_index as u64,
            "file split"
        );

        self.tracker.begin(file_id);
        self.emit_state(file_id, FileState::Uploading);
        self.emit(UploadEvent::FileProgress {
            file_id,
            percent: 0,
        });

        let acked = AtomicU32::new(0);
        let halted = AtomicBool::new(false);
        let pool = TaskPool::new(self.config.chunk_batch_size, self.config.pacing);
        let results = pool
            .run_all(
                chunks
                    .iter()
                    .map(|chunk| self.send_chunk(conn, chunk, total, &acked, &halted, cancel)),
            )
            .await;

        match results.into_iter().find_map(Result::err) {
            None => {
                self.tracker.complete(file_id);
                info!(file = %entry.raw_name(), %file_id, "file uploaded");
                self.emit(UploadEvent::FileCompleted { file_id });
                self.emit_state(file_id, FileState::Succeeded);
                FileOutcome::Succeeded { file_id }
            }
            Some(e) => self.fail_file(file_id, e.to_string()),
        }
    }

    /// Sends one chunk with retries. Once a sibling chunk has failed, chunks
    /// that have not started yet are skipped.
    async fn send_chunk(
        &self,
        conn: &dyn ContainerTransport,
        chunk: &ChunkDescriptor,
        total: u32,
        acked: &AtomicU32,
        halted: &AtomicBool,
        cancel: &CancellationToken,
    ) -> Result<(), RetryError<TransportError>> {
        if halted.load(Ordering::SeqCst) {
            return Ok(());
        }

        let result = self
            .config
            .retry
            .run(cancel, TransportError::is_retryable, |attempt, token| {
                if attempt > 1 {
                    debug!(
                        identifier = %chunk.file_identifier,
                        chunk = chunk.chunk_index,
                        attempt,
                        "resending chunk"
                    );
                }
                conn.send_chunk(chunk, token)
            })
            .await;

        match result {
            Ok(()) => {
                let done = acked.fetch_add(1, Ordering::SeqCst) + 1;
                let percent = self.tracker.record(chunk.file_id, done, total);
                self.emit(UploadEvent::FileProgress {
                    file_id: chunk.file_id,
                    percent,
                });
                Ok(())
            }
            Err(e) => {
                warn!(
                    identifier = %chunk.file_identifier,
                    chunk = chunk.chunk_index,
                    error = %e,
                    "chunk upload failed"
                );
                halted.store(true, Ordering::SeqCst);
                Err(e)
            }
        }
    }

    fn fail_file(&self, file_id: FileId, error: String) -> FileOutcome {
        self.tracker.mark_failed(file_id);
        warn!(%file_id, error = %error, "file upload failed");
        self.emit(UploadEvent::FileFailed {
            file_id,
            error: error.clone(),
        });
        self.emit_state(file_id, FileState::Failed);
        FileOutcome::Failed { file_id, error }
    }

    fn acquire(&self) -> Result<PassGuard<'_>, UploadError> {
        self.busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| UploadError::Busy)?;
        Ok(PassGuard { scheduler: self })
    }

    fn emit_state(&self, file_id: FileId, state: FileState) {
        self.emit(UploadEvent::FileState { file_id, state });
    }

    fn emit(&self, event: UploadEvent) {
        let _ = self.events_tx.send(event);
    }
}
