//! JSON-file remote store
//!
//! Keeps the remote tree in memory and rewrites the backing file atomically
//! after every write. Serves as the local stand-in for a hosted database.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde_json::Value;

use super::file_io::{read_json, write_json_atomic};
use super::memory::MemoryStore;
use super::{RemotePath, RemoteStore};
use crate::error::{LedgerError, LedgerResult};

/// A remote store persisted to a single JSON document on disk
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    tree: MemoryStore,
    /// Serializes mutate-then-persist so the file never goes backwards
    persist: Mutex<()>,
}

impl JsonFileStore {
    /// Open the store at `path`; a missing file is an empty store
    pub fn open(path: impl Into<PathBuf>) -> LedgerResult<Self> {
        let path = path.into();
        let tree: Value = read_json(&path)?;
        tracing::debug!(path = %path.display(), "opened remote store file");

        Ok(Self {
            path,
            tree: MemoryStore::with_tree(tree),
            persist: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, path: &RemotePath) -> Option<Value> {
        self.tree.get(path)
    }

    fn write_through(
        &self,
        apply: impl FnOnce(&MemoryStore) -> LedgerResult<()>,
    ) -> LedgerResult<()> {
        let _guard = self.persist.lock().map_err(LedgerError::poisoned)?;
        apply(&self.tree)?;
        write_json_atomic(&self.path, &self.tree.snapshot()?)
    }
}

impl RemoteStore for JsonFileStore {
    fn put(&self, path: &RemotePath, value: Value) -> LedgerResult<()> {
        self.write_through(|tree| tree.put(path, value))
    }

    fn delete(&self, path: &RemotePath) -> LedgerResult<()> {
        self.write_through(|tree| tree.delete(path))
    }

    fn read_all(&self, path: &RemotePath) -> LedgerResult<Vec<Value>> {
        self.tree.read_all(path)
    }
}
