//! Ordered list of files awaiting upload.

use gallerydesk_transfer::{FileEntry, FileId, FileSource};
use tracing::debug;

use crate::error::QueueError;

/// The upload queue. Owns its entries; passes work on a [`snapshot`](Self::snapshot).
#[derive(Debug, Clone, Default)]
pub struct UploadQueue {
    entries: Vec<FileEntry>,
}

impl UploadQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends files in the given order and returns their new ids.
    ///
    /// Names are not de-duplicated.
    pub fn add(&mut self, files: impl IntoIterator<Item = FileSource>) -> Vec<FileId> {
        let start = self.entries.len();
        self.entries.extend(files.into_iter().map(FileEntry::new));
        let added: Vec<FileId> = self.entries[start..].iter().map(FileEntry::id).collect();
        debug!(added = added.len(), total = self.entries.len(), "files queued");
        added
    }

    /// Replaces the display name at `index`. Any string is accepted.
    pub fn rename(&mut self, index: usize, name: impl Into<String>) -> Result<(), QueueError> {
        let len = self.entries.len();
        let entry = self
            .entries
            .get_mut(index)
            .ok_or(QueueError::IndexOutOfRange { index, len })?;
        entry.set_display_name(name);
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Result<FileEntry, QueueError> {
        if index >= self.entries.len() {
            return Err(QueueError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            });
        }
        Ok(self.entries.remove(index))
    }

    pub fn remove_id(&mut self, id: FileId) -> Result<FileEntry, QueueError> {
        let index = self.position(id).ok_or(QueueError::UnknownFile(id))?;
        Ok(self.entries.remove(index))
    }

    /// Moves `from` to the position currently held by `to`.
    ///
    /// Moving down places it after `to`, moving up places it before.
    pub fn reorder(&mut self, from: FileId, to: FileId) -> Result<(), QueueError> {
        let old = self.position(from).ok_or(QueueError::UnknownFile(from))?;
        let new = self.position(to).ok_or(QueueError::UnknownFile(to))?;
        if old != new {
            let entry = self.entries.remove(old);
            self.entries.insert(new, entry);
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Copy of the current entries. Payloads are shared, not copied.
    pub fn snapshot(&self) -> Vec<FileEntry> {
        self.entries.clone()
    }

    pub fn get(&self, index: usize) -> Option<&FileEntry> {
        self.entries.get(index)
    }

    pub fn position(&self, id: FileId) -> Option<usize> {
        self.entries.iter().position(|e| e.id() == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FileEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
