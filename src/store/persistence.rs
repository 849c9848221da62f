//! File-backed snapshot store

use crate::error::StorageError;
use crate::store::SnapshotStore;
use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Snapshot store backed by a single file on disk
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn read_to_string(&self) -> Result<String, StorageError> {
        Ok(fs::read_to_string(&self.path)?)
    }

    fn create(&self) -> Result<Box<dyn Write + '_>, StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.path)?;
        Ok(Box::new(BufWriter::new(file)))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
