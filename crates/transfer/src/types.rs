use std::fmt;
use std::path::Path;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::TransferError;
use crate::naming::normalize_display_name;

/// Stable identity of a queued file, assigned when the file is added.
///
/// Independent of the (editable, possibly duplicated) display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(Uuid);

impl FileId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for FileId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A file handed over by a selection source (picker, drop, "add more").
#[derive(Debug, Clone)]
pub struct FileSource {
    pub name: String,
    pub data: Bytes,
}

impl FileSource {
    pub fn new(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }

    /// Reads a file from disk; the source name is the file name component.
    pub async fn read(path: &Path) -> Result<Self, TransferError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .filter(|n| !n.is_empty())
            .ok_or_else(|| TransferError::InvalidName(path.display().to_string()))?;
        let data = tokio::fs::read(path).await?;
        Ok(Self::new(name, data))
    }
}

/// One user-selected file awaiting or undergoing upload.
#[derive(Debug, Clone)]
pub struct FileEntry {
    id: FileId,
    raw_name: String,
    size: u64,
    data: Bytes,
    display_name: String,
}

impl FileEntry {
    /// Creates an entry with a fresh identity and a normalized display name.
    pub fn new(source: FileSource) -> Self {
        let display_name = normalize_display_name(&source.name);
        Self {
            id: FileId::new(),
            size: source.data.len() as u64,
            raw_name: source.name,
            data: source.data,
            display_name,
        }
    }

    pub fn id(&self) -> FileId {
        self.id
    }

    /// Original filename from the selection source.
    pub fn raw_name(&self) -> &str {
        &self.raw_name
    }

    /// Byte length, fixed when the entry was created.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Underlying content. Cloning and slicing are zero-copy.
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// User-editable label, may be empty.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn set_display_name(&mut self, name: impl Into<String>) {
        self.display_name = name.into();
    }

    /// Logical filename sent to the backend.
    ///
    /// A blank display name falls back to the raw name.
    pub fn upload_name(&self) -> &str {
        if self.display_name.trim().is_empty() {
            &self.raw_name
        } else {
            &self.display_name
        }
    }
}
