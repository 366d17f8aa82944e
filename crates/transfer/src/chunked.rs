use std::sync::atomic::{AtomicI64, Ordering};

use bytes::Bytes;
use gallerydesk_protocol::RELATE_GALLERY_VERSION;
use gallerydesk_protocol::constants::fields;

use crate::CHUNK_SIZE;
use crate::naming::file_identifier;
use crate::types::{FileEntry, FileId};

// ---------------------------------------------------------------------------
// Attempt stamps
// ---------------------------------------------------------------------------

static LAST_STAMP: AtomicI64 = AtomicI64::new(0);

/// Returns a millisecond timestamp that is strictly greater than every stamp
/// handed out before in this process.
pub fn next_attempt_stamp() -> i64 {
    let now = chrono::Utc::now().timestamp_millis();
    let mut last = LAST_STAMP.load(Ordering::Relaxed);
    loop {
        let next = now.max(last + 1);
        match LAST_STAMP.compare_exchange_weak(last, next, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => return next,
            Err(current) => last = current,
        }
    }
}

/// Number of chunks needed for `size` bytes.
///
/// A zero-byte file still takes one (empty) chunk so the backend creates it.
pub fn total_chunks(size: u64, chunk_size: usize) -> u32 {
    let chunk_size = chunk_size.max(1) as u64;
    size.div_ceil(chunk_size).max(1) as u32
}

// ---------------------------------------------------------------------------
// ChunkDescriptor
// ---------------------------------------------------------------------------

/// One upload request unit: a byte range of a file plus sequencing metadata.
#[derive(Debug, Clone)]
pub struct ChunkDescriptor {
    /// Queue identity of the owning file.
    pub file_id: FileId,
    /// Correlates the chunks of one upload attempt on the backend.
    pub file_identifier: String,
    /// 1-based.
    pub chunk_index: u32,
    /// Nominal chunk size.
    pub chunk_size: u64,
    /// Length of `payload`; only the last chunk may be shorter than nominal.
    pub chunk_actual_size: u64,
    pub total_size: u64,
    pub total_chunks: u32,
    pub is_last_chunk: bool,
    /// Position of the file in its container.
    pub order_index: u64,
    pub target_container_id: String,
    pub raw_name: String,
    /// Logical filename (`customFilename`).
    pub upload_name: String,
    pub payload: Bytes,
}

impl ChunkDescriptor {
    /// Text fields of the multipart upload form, in wire order.
    ///
    /// The binary `file` part is added by the transport from `payload`.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut out = vec![
            (fields::CHUNK_NUMBER, self.chunk_index.to_string()),
            (fields::CHUNK_SIZE, self.chunk_size.to_string()),
            (fields::CURRENT_CHUNK_SIZE, self.chunk_actual_size.to_string()),
            (fields::TOTAL_SIZE, self.total_size.to_string()),
            (fields::IDENTIFIER, self.file_identifier.clone()),
            (fields::FILENAME, self.raw_name.clone()),
            (fields::RELATIVE_PATH, self.raw_name.clone()),
            (fields::TOTAL_CHUNKS, self.total_chunks.to_string()),
            (fields::RELATE, RELATE_GALLERY_VERSION.to_string()),
            (fields::CONTAINER_ID, self.target_container_id.clone()),
            (fields::ORDER_INDEX, self.order_index.to_string()),
            (fields::CUSTOM_FILENAME, self.upload_name.clone()),
        ];
        if self.is_last_chunk {
            out.push((fields::IS_LAST_CHUNK, "true".to_string()));
        }
        out
    }

    /// Byte range of `payload` within the file.
    pub fn byte_range(&self) -> std::ops::Range<u64> {
        let start = (self.chunk_index as u64 - 1) * self.chunk_size;
        start..start + self.chunk_actual_size
    }
}

// ---------------------------------------------------------------------------
// ChunkSplitter
// ---------------------------------------------------------------------------

/// Partitions a file into fixed-size chunks and builds one descriptor each.
#[derive(Debug, Clone, Copy)]
pub struct ChunkSplitter {
    chunk_size: usize,
}

impl Default for ChunkSplitter {
    fn default() -> Self {
        Self::new(CHUNK_SIZE)
    }
}

impl ChunkSplitter {
    /// If `chunk_size` is 0, [`CHUNK_SIZE`] (10 MiB) is used.
    pub fn new(chunk_size: usize) -> Self {
        let chunk_size = if chunk_size == 0 {
            CHUNK_SIZE
        } else {
            chunk_size
        };
        Self { chunk_size }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Splits `entry` for one upload attempt.
    ///
    /// `pass_index` is the file's position among the files of the pass and
    /// `order_base` the container position of the first of them, so files
    /// uploaded together get contiguous order indices.
    pub fn split(
        &self,
        entry: &FileEntry,
        pass_index: usize,
        order_base: u64,
        container_id: &str,
    ) -> Vec<ChunkDescriptor> {
        self.split_with_stamp(entry, pass_index, order_base, container_id, next_attempt_stamp())
    }

    pub fn split_with_stamp(
        &self,
        entry: &FileEntry,
        pass_index: usize,
        order_base: u64,
        container_id: &str,
        stamp: i64,
    ) -> Vec<ChunkDescriptor> {
        let size = entry.size();
        let total = total_chunks(size, self.chunk_size);
        let identifier = file_identifier(size, entry.raw_name(), stamp);
        let order_index = order_base + pass_index as u64;
        let chunk_size = self.chunk_size as u64;

        (0..total)
            .map(|i| {
                let start = (i as u64 * chunk_size).min(size);
                let end = ((i as u64 + 1) * chunk_size).min(size);
                ChunkDescriptor {
                    file_id: entry.id(),
                    file_identifier: identifier.clone(),
                    chunk_index: i + 1,
                    chunk_size,
                    chunk_actual_size: end - start,
                    total_size: size,
                    total_chunks: total,
                    is_last_chunk: i + 1 == total,
                    order_index,
                    target_container_id: container_id.to_string(),
                    raw_name: entry.raw_name().to_string(),
                    upload_name: entry.upload_name().to_string(),
                    payload: entry.data().slice(start as usize..end as usize),
                }
            })
            .collect()
    }
}
