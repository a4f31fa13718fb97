//! Gateway that applies writes on the caller's thread

use std::sync::Arc;

use serde_json::Value;

use super::{ReadFuture, RemotePath, RemoteStore, SyncCounters, SyncGateway, SyncStats};

/// Applies each write immediately; failures are logged and counted only
pub struct InlineGateway<S> {
    store: Arc<S>,
    counters: SyncCounters,
}

impl<S: RemoteStore> InlineGateway<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            counters: SyncCounters::default(),
        }
    }

    /// The backend behind this gateway
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }
}

impl<S: RemoteStore> SyncGateway for InlineGateway<S> {
    fn put(&self, path: &RemotePath, value: Value) {
        self.counters.record("put", path, self.store.put(path, value));
    }

    fn delete(&self, path: &RemotePath) {
        self.counters.record("delete", path, self.store.delete(path));
    }

    fn read_all(&self, path: &RemotePath) -> ReadFuture {
        Box::pin(std::future::ready(self.store.read_all(path)))
    }

    fn stats(&self) -> SyncStats {
        self.counters.snapshot()
    }
}
