//! Snapshot Store
//!
//! Named-resource channels the tree saves to and loads from. The tree only
//! needs an existence check, a full read, and a truncating write.

pub mod persistence;
pub mod snapshot;

pub use persistence::FileSnapshotStore;
pub use snapshot::Snapshot;

use crate::error::StorageError;
use parking_lot::{Mutex, MutexGuard};
use std::io::{self, Write};

/// Snapshot Store interface
pub trait SnapshotStore {
    /// Whether the resource exists; a missing resource loads as "nothing saved"
    fn exists(&self) -> bool;

    fn read_to_string(&self) -> Result<String, StorageError>;

    /// Open the resource for writing, creating it or truncating existing content
    fn create(&self) -> Result<Box<dyn Write + '_>, StorageError>;

    /// Human-readable location for log messages
    fn describe(&self) -> String;
}

/// In-memory store, mainly for tests and embedding
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    contents: Mutex<Option<Vec<u8>>>,
}

impl MemorySnapshotStore {
    /// An empty store: `exists()` is false until something is written
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(text: &str) -> Self {
        Self {
            contents: Mutex::new(Some(text.as_bytes().to_vec())),
        }
    }

    /// Current contents as text, if anything has been written
    pub fn contents(&self) -> Option<String> {
        self.contents
            .lock()
            .as_ref()
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    pub fn clear(&self) {
        *self.contents.lock() = None;
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn exists(&self) -> bool {
        self.contents.lock().is_some()
    }

    fn read_to_string(&self) -> Result<String, StorageError> {
        let guard = self.contents.lock();
        let bytes = guard.as_ref().ok_or_else(|| {
            StorageError::IoError(io::Error::new(
                io::ErrorKind::NotFound,
                "memory snapshot has no contents",
            ))
        })?;
        String::from_utf8(bytes.clone()).map_err(|e| {
            StorageError::IoError(io::Error::new(io::ErrorKind::InvalidData, e))
        })
    }

    fn create(&self) -> Result<Box<dyn Write + '_>, StorageError> {
        let mut guard = self.contents.lock();
        *guard = Some(Vec::new());
        Ok(Box::new(MemoryWriter { guard }))
    }

    fn describe(&self) -> String {
        "<memory>".to_string()
    }
}

/// Holds the store lock for the lifetime of the write
struct MemoryWriter<'a> {
    guard: MutexGuard<'a, Option<Vec<u8>>>,
}

impl Write for MemoryWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.guard.get_or_insert_with(Vec::new).extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
