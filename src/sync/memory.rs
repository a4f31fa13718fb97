//! In-memory remote store
//!
//! Holds the whole remote tree as one JSON document. Used directly in tests,
//! and as the working copy behind [`super::JsonFileStore`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use serde_json::{Map, Value};

use super::{RemotePath, RemoteStore};
use crate::error::{LedgerError, LedgerResult};

/// A JSON tree held in memory
#[derive(Debug)]
pub struct MemoryStore {
    tree: RwLock<Value>,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_tree(Value::Object(Map::new()))
    }

    /// Start from an existing document
    pub fn with_tree(tree: Value) -> Self {
        let tree = if tree.is_object() {
            tree
        } else {
            Value::Object(Map::new())
        };
        Self {
            tree: RwLock::new(tree),
            fail_writes: AtomicBool::new(false),
            fail_reads: AtomicBool::new(false),
        }
    }

    /// Make every subsequent write fail (fault injection)
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::Relaxed);
    }

    /// Make every subsequent read fail (fault injection)
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::Relaxed);
    }

    /// The value stored at `path`, if any
    pub fn get(&self, path: &RemotePath) -> Option<Value> {
        let tree = self.tree.read().ok()?;
        lookup(&tree, path.segments()).cloned()
    }

    /// A copy of the whole document
    pub fn snapshot(&self) -> LedgerResult<Value> {
        let tree = self.tree.read().map_err(LedgerError::poisoned)?;
        Ok(tree.clone())
    }

    fn check_writable(&self) -> LedgerResult<()> {
        if self.fail_writes.load(Ordering::Relaxed) {
            return Err(LedgerError::Io("remote store rejected write".into()));
        }
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RemoteStore for MemoryStore {
    fn put(&self, path: &RemotePath, value: Value) -> LedgerResult<()> {
        self.check_writable()?;
        let mut tree = self.tree.write().map_err(LedgerError::poisoned)?;
        put_in(&mut tree, path.segments(), value)
    }

    fn delete(&self, path: &RemotePath) -> LedgerResult<()> {
        self.check_writable()?;
        let mut tree = self.tree.write().map_err(LedgerError::poisoned)?;
        remove_in(&mut tree, path.segments());
        Ok(())
    }

    fn read_all(&self, path: &RemotePath) -> LedgerResult<Vec<Value>> {
        if self.fail_reads.load(Ordering::Relaxed) {
            return Err(LedgerError::RemoteSyncFailure(format!(
                "read of {} was cancelled",
                path
            )));
        }

        let tree = self.tree.read().map_err(LedgerError::poisoned)?;
        match lookup(&tree, path.segments()) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Object(children)) => Ok(children.values().cloned().collect()),
            Some(Value::Array(items)) => Ok(items.clone()),
            Some(_) => Err(LedgerError::RemoteSyncFailure(format!(
                "{} is not a collection",
                path
            ))),
        }
    }
}

pub(crate) fn lookup<'a>(root: &'a Value, segments: &[String]) -> Option<&'a Value> {
    segments
        .iter()
        .try_fold(root, |node, segment| node.as_object()?.get(segment))
}

pub(crate) fn put_in(root: &mut Value, segments: &[String], value: Value) -> LedgerResult<()> {
    let Some((last, parents)) = segments.split_last() else {
        return Err(LedgerError::Validation("cannot overwrite the store root".into()));
    };

    let mut node = root;
    for segment in parents {
        if !node.is_object() {
            *node = Value::Object(Map::new());
        }
        node = match node {
            Value::Object(map) => map
                .entry(segment.clone())
                .or_insert_with(|| Value::Object(Map::new())),
            _ => unreachable!("node was just made an object"),
        };
    }

    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    if let Value::Object(map) = node {
        map.insert(last.clone(), value);
    }
    Ok(())
}

pub(crate) fn remove_in(root: &mut Value, segments: &[String]) {
    let Some((last, parents)) = segments.split_last() else {
        return;
    };

    let mut node = root;
    for segment in parents {
        match node.as_object_mut().and_then(|map| map.get_mut(segment)) {
            Some(child) => node = child,
            None => return,
        }
    }
    if let Some(map) = node.as_object_mut() {
        map.remove(last);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path(s: &str) -> RemotePath {
        RemotePath::parse(s)
    }

    #[test]
    fn test_put_creates_intermediate_nodes() {
        let store = MemoryStore::new();
        store.put(&path("u/category/1"), json!({"name": "Food"})).unwrap();
        store.put(&path("u/category/1/name"), json!("Groceries")).unwrap();

        assert_eq!(store.get(&path("u/category/1/name")), Some(json!("Groceries")));
    }

    #[test]
    fn test_delete_missing_is_ok() {
        let store = MemoryStore::new();
        store.delete(&path("u/transaction/9")).unwrap();
        store.put(&path("u/transaction/9"), json!({"id": 9})).unwrap();
        store.delete(&path("u/transaction/9")).unwrap();
        assert_eq!(store.get(&path("u/transaction/9")), None);
    }

    #[test]
    fn test_read_all_children() {
        let store = MemoryStore::new();
        store.put(&path("u/budget/1"), json!({"id": 1})).unwrap();
        store.put(&path("u/budget/2"), json!({"id": 2})).unwrap();

        let values = store.read_all(&path("u/budget")).unwrap();
        assert_eq!(values, vec![json!({"id": 1}), json!({"id": 2})]);
        assert!(store.read_all(&path("u/category")).unwrap().is_empty());
    }

    #[test]
    fn test_read_all_on_leaf_fails() {
        let store = MemoryStore::new();
        store.put(&path("u/flag"), json!(true)).unwrap();
        assert!(matches!(
            store.read_all(&path("u/flag")),
            Err(LedgerError::RemoteSyncFailure(_))
        ));
    }

    #[test]
    fn test_fault_injection() {
        let store = MemoryStore::new();
        store.set_fail_writes(true);
        assert!(store.put(&path("u/x"), json!(1)).is_err());
        store.set_fail_reads(true);
        assert!(store.read_all(&path("u")).is_err());
    }

    #[test]
    fn test_root_cannot_be_overwritten() {
        let store = MemoryStore::new();
        assert!(store.put(&RemotePath::parse(""), json!(1)).is_err());
    }
}
