//! Upload manager: the queue, the tracker and the scheduler behind one handle.

use gallerydesk_transfer::{FileEntry, FileId, FileSource, ProgressSnapshot, ProgressTracker};
use tokio::sync::mpsc;
use tracing::info;

use crate::error::{QueueError, UploadError};
use crate::queue::UploadQueue;
use crate::scheduler::{SchedulerConfig, UploadScheduler};
use crate::transport::ContainerTransport;
use crate::types::{PassSummary, UploadEvent};

/// Client-facing operations of the upload page.
pub struct UploadManager {
    queue: UploadQueue,
    tracker: ProgressTracker,
    scheduler: UploadScheduler,
    container_id: Option<String>,
}

impl Default for UploadManager {
    fn default() -> Self {
        Self::new(SchedulerConfig::default())
    }
}

impl UploadManager {
    pub fn new(config: SchedulerConfig) -> Self {
        let tracker = ProgressTracker::new();
        Self {
            queue: UploadQueue::new(),
            scheduler: UploadScheduler::new(config, tracker.clone()),
            tracker,
            container_id: None,
        }
    }

    pub fn queue(&self) -> &UploadQueue {
        &self.queue
    }

    pub fn tracker(&self) -> &ProgressTracker {
        &self.tracker
    }

    pub fn scheduler(&self) -> &UploadScheduler {
        &self.scheduler
    }

    pub fn take_events(&mut self) -> Option<mpsc::UnboundedReceiver<UploadEvent>> {
        self.scheduler.take_events()
    }

    /// Selects the target container; blank ids clear the selection.
    pub fn select_container(&mut self, container_id: impl Into<String>) {
        let id = container_id.into();
        self.container_id = if id.trim().is_empty() { None } else { Some(id) };
    }

    pub fn container_id(&self) -> Option<&str> {
        self.container_id.as_deref()
    }

    pub fn add_files(&mut self, files: impl IntoIterator<Item = FileSource>) -> Vec<FileId> {
        self.queue.add(files)
    }

    pub fn rename(&mut self, index: usize, name: impl Into<String>) -> Result<(), QueueError> {
        self.queue.rename(index, name)
    }

    /// Removes a file from the queue and drops its progress state.
    pub fn remove(&mut self, index: usize) -> Result<FileEntry, QueueError> {
        let entry = self.queue.remove(index)?;
        self.tracker.forget(entry.id());
        Ok(entry)
    }

    pub fn reorder(&mut self, from: FileId, to: FileId) -> Result<(), QueueError> {
        self.queue.reorder(from, to)
    }

    /// Empties the queue and resets all progress and failure state.
    pub fn clear(&mut self) {
        self.queue.clear();
        self.tracker.reset();
    }

    pub fn progress(&self) -> ProgressSnapshot {
        self.tracker.snapshot()
    }

    /// Uploads the whole queue to the selected container.
    pub async fn start_upload(
        &self,
        conn: &dyn ContainerTransport,
    ) -> Result<PassSummary, UploadError> {
        let container = self.container_id.as_deref().ok_or(UploadError::NoContainer)?;
        let snapshot = self.queue.snapshot();
        info!(files = snapshot.len(), container = %container, "starting upload");
        self.scheduler.upload(conn, container, &snapshot).await
    }

    /// Re-uploads only the files that failed.
    pub async fn retry_failed(
        &self,
        conn: &dyn ContainerTransport,
    ) -> Result<PassSummary, UploadError> {
        let container = self.container_id.as_deref().ok_or(UploadError::NoContainer)?;
        let snapshot = self.queue.snapshot();
        self.scheduler
            .retry_failed(conn, container, &snapshot)
            .await
    }

    pub fn cancel(&self) {
        self.scheduler.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::transport::TransportFuture;
    use gallerydesk_transfer::ChunkDescriptor;
    use std::sync::Mutex;
    use tokio_util::sync::CancellationToken;

    /// Accepts everything except chunks of files named in `reject`.
    #[derive(Default)]
    struct Container {
        reject: Mutex<Vec<String>>,
        uploaded: Mutex<Vec<(String, String, u64)>>,
    }

    impl ContainerTransport for Container {
        fn item_count<'a>(&'a self, _: &'a str, _: CancellationToken) -> TransportFuture<'a, u64> {
            Box::pin(async move { Ok(self.uploaded.lock().unwrap().len() as u64) })
        }

        fn send_chunk<'a>(
            &'a self,
            chunk: &'a ChunkDescriptor,
            _: CancellationToken,
        ) -> TransportFuture<'a, ()> {
            Box::pin(async move {
                if self.reject.lock().unwrap().contains(&chunk.raw_name) {
                    return Err(TransportError::Status {
                        status: 422,
                        body: "rejected".into(),
                    });
                }
                if chunk.is_last_chunk {
                    self.uploaded.lock().unwrap().push((
                        chunk.raw_name.clone(),
                        chunk.upload_name.clone(),
                        chunk.order_index,
                    ));
                }
                Ok(())
            })
        }
    }

    fn sources(names: &[&str]) -> Vec<FileSource> {
        names
            .iter()
            .map(|n| FileSource::new(*n, vec![1u8; 16]))
            .collect()
    }

    #[tokio::test]
    async fn upload_without_container_is_refused() {
        let mut manager = UploadManager::default();
        manager.add_files(sources(&["a.jpg"]));
        manager.select_container("  ");

        let err = manager.start_upload(&Container::default()).await.unwrap_err();
        assert!(matches!(err, UploadError::NoContainer));
    }

    #[tokio::test(start_paused = true)]
    async fn upload_uses_queue_order_and_display_names() {
        let container = Container::default();
        let mut manager = UploadManager::default();
        manager.select_container("gallery-9");
        let ids = manager.add_files(sources(&["one (1).jpg", "two.png", "IMG_0003.jpg"]));
        manager.reorder(ids[2], ids[0]).unwrap();
        manager.rename(1, "First shot").unwrap();

        let summary = manager.start_upload(&container).await.unwrap();
        assert!(summary.is_success());

        let mut uploaded = container.uploaded.lock().unwrap().clone();
        uploaded.sort_by_key(|(_, _, order)| *order);
        assert_eq!(
            uploaded,
            vec![
                ("IMG_0003.jpg".to_string(), "IMG_0003.jpg".to_string(), 1),
                ("one (1).jpg".to_string(), "First shot".to_string(), 2),
                ("two.png".to_string(), "two".to_string(), 3),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn retry_after_fix_and_clear() {
        let container = Container::default();
        container.reject.lock().unwrap().push("b.jpg".into());
        let mut manager = UploadManager::default();
        manager.select_container("7");
        let ids = manager.add_files(sources(&["a.jpg", "b.jpg"]));

        let first = manager.start_upload(&container).await.unwrap();
        assert_eq!(first.failed_ids(), vec![ids[1]]);
        assert!(manager.progress().is_failed(ids[1]));

        container.reject.lock().unwrap().clear();
        let retry = manager.retry_failed(&container).await.unwrap();
        assert!(retry.is_success());
        assert_eq!(retry.order_base, Some(2));
        assert_eq!(manager.progress().percent_of(ids[1]), 100);

        manager.clear();
        assert!(manager.queue().is_empty());
        assert_eq!(manager.progress(), ProgressSnapshot::default());
    }

    #[tokio::test(start_paused = true)]
    async fn removing_a_file_forgets_its_failure() {
        let container = Container::default();
        container.reject.lock().unwrap().push("b.jpg".into());
        let mut manager = UploadManager::default();
        manager.select_container("7");
        let ids = manager.add_files(sources(&["a.jpg", "b.jpg"]));

        manager.start_upload(&container).await.unwrap();
        assert_eq!(manager.tracker().failed_ids(), vec![ids[1]]);

        let removed = manager.remove(1).unwrap();
        assert_eq!(removed.id(), ids[1]);
        assert_eq!(manager.tracker().failed_count(), 0);

        let retry = manager.retry_failed(&container).await.unwrap();
        assert!(retry.outcomes.is_empty());
    }
}
