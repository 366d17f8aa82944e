use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;

use crate::types::FileId;

/// Progress of one file, as delivered to callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FileProgress {
    pub file_id: FileId,
    pub percent: u8,
    pub failed: bool,
}

/// Callback invoked after every progress or failure change.
pub type ProgressCallback = Box<dyn Fn(FileProgress) + Send + Sync>;

/// Point-in-time copy of the tracker for rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProgressSnapshot {
    pub percent: HashMap<FileId, u8>,
    /// Failed files in the order they failed.
    pub failed: Vec<FileId>,
}

impl ProgressSnapshot {
    pub fn percent_of(&self, id: FileId) -> u8 {
        self.percent.get(&id).copied().unwrap_or(0)
    }

    pub fn is_failed(&self, id: FileId) -> bool {
        self.failed.contains(&id)
    }
}

/// Process-wide map from file identity to percent complete and failure state.
///
/// Written by the upload scheduler, read by whatever renders the queue.
/// Cloning yields another handle to the same state.
#[derive(Clone, Default)]
pub struct ProgressTracker {
    inner: Arc<RwLock<TrackerInner>>,
}

#[derive(Default)]
struct TrackerInner {
    callbacks: Vec<Arc<dyn Fn(FileProgress) + Send + Sync>>,
    percent: HashMap<FileId, u8>,
    failed: Vec<FileId>,
}

impl TrackerInner {
    fn state_of(&self, id: FileId) -> FileProgress {
        FileProgress {
            file_id: id,
            percent: self.percent.get(&id).copied().unwrap_or(0),
            failed: self.failed.contains(&id),
        }
    }
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a progress callback.
    pub fn on_progress(&self, callback: ProgressCallback) {
        self.write().callbacks.push(Arc::from(callback));
    }

    /// A file (re-)enters uploading: its percent restarts at 0.
    ///
    /// The failure flag stays until the new attempt settles.
    pub fn begin(&self, id: FileId) {
        self.update(id, |inner| {
            inner.percent.insert(id, 0);
        });
    }

    /// Records `completed` of `total` chunks acknowledged.
    ///
    /// The stored value never decreases and stays below 100 until every chunk
    /// is acknowledged. Returns the stored percent.
    pub fn record(&self, id: FileId, completed: u32, total: u32) -> u8 {
        let computed = percent_complete(completed, total);
        let mut stored = 0;
        self.update(id, |inner| {
            let entry = inner.percent.entry(id).or_insert(0);
            *entry = (*entry).max(computed);
            stored = *entry;
        });
        stored
    }

    /// Marks a file fully uploaded: exactly 100 and no longer failed.
    pub fn complete(&self, id: FileId) {
        self.update(id, |inner| {
            inner.percent.insert(id, 100);
            inner.failed.retain(|f| *f != id);
        });
    }

    /// Adds a file to the failure set. Its percent is left as is.
    pub fn mark_failed(&self, id: FileId) {
        self.update(id, |inner| {
            if !inner.failed.contains(&id) {
                inner.failed.push(id);
            }
        });
    }

    /// Drops all state of one file (it left the queue).
    pub fn forget(&self, id: FileId) {
        let mut inner = self.write();
        inner.percent.remove(&id);
        inner.failed.retain(|f| *f != id);
    }

    /// Clears every percent and the failure set.
    pub fn reset(&self) {
        let mut inner = self.write();
        inner.percent.clear();
        inner.failed.clear();
    }

    pub fn percent(&self, id: FileId) -> Option<u8> {
        self.read().percent.get(&id).copied()
    }

    pub fn is_failed(&self, id: FileId) -> bool {
        self.read().failed.contains(&id)
    }

    /// Failed files in the order they failed.
    pub fn failed_ids(&self) -> Vec<FileId> {
        self.read().failed.clone()
    }

    pub fn failed_count(&self) -> usize {
        self.read().failed.len()
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        let inner = self.read();
        ProgressSnapshot {
            percent: inner.percent.clone(),
            failed: inner.failed.clone(),
        }
    }

    /// Applies `f` under the write lock, then notifies callbacks outside it.
    fn update(&self, id: FileId, f: impl FnOnce(&mut TrackerInner)) {
        let (state, callbacks) = {
            let mut inner = self.write();
            f(&mut inner);
            (inner.state_of(id), inner.callbacks.clone())
        };
        for cb in &callbacks {
            cb(state);
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, TrackerInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, TrackerInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// `round(100 * completed / total)`, capped at 99 while chunks remain.
fn percent_complete(completed: u32, total: u32) -> u8 {
    if total == 0 || completed >= total {
        return 100;
    }
    let pct = (u64::from(completed) * 200 + u64::from(total)) / (u64::from(total) * 2);
    pct.min(99) as u8
}
