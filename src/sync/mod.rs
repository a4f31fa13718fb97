//! Remote synchronization
//!
//! Every local mutation is mirrored to a remote store through a
//! [`SyncGateway`]. Writes are fire-and-forget: the caller never waits for
//! them and never sees their failures, which are logged and counted in
//! [`SyncStats`] instead. Bulk reads are one-shot and asynchronous.
//!
//! # Layout
//!
//! All data lives under a user root:
//!
//! ```text
//! {user}/transaction/{id}   id, amount, categoryId, year, month, day, memo
//! {user}/category/{id}      id, name, currentAmount, transactionIds, budgetId
//! {user}/budget/{id}        id, name, categoryIds, total
//! ```
//!
//! # Pieces
//!
//! - [`RemoteStore`]: a concrete, fallible backend ([`MemoryStore`],
//!   [`JsonFileStore`]).
//! - [`InlineGateway`]: applies writes on the calling thread.
//! - [`QueuedGateway`]: hands writes to a background worker over a tokio
//!   channel, applying them in submission order.

pub mod file;
pub mod file_io;
pub mod inline;
pub mod memory;
pub mod mirror;
pub mod queue;

pub use file::JsonFileStore;
pub use inline::InlineGateway;
pub use memory::MemoryStore;
pub use mirror::Mirror;
pub use queue::QueuedGateway;

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::Value;

use crate::error::LedgerResult;

pub const TRANSACTION_COLLECTION: &str = "transaction";
pub const CATEGORY_COLLECTION: &str = "category";
pub const BUDGET_COLLECTION: &str = "budget";

/// A slash-separated location in the remote store
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RemotePath {
    segments: Vec<String>,
}

impl RemotePath {
    /// The root of a user's namespace
    pub fn root(user_id: &str) -> Self {
        Self::parse(user_id)
    }

    /// Split a `a/b/c` string into a path, ignoring empty segments
    pub fn parse(path: &str) -> Self {
        Self {
            segments: path
                .split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    /// Extend the path by one segment
    pub fn child(&self, segment: impl ToString) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.to_string());
        Self { segments }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl fmt::Display for RemotePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

/// A concrete remote backend
///
/// Unlike [`SyncGateway`], every call reports its outcome.
pub trait RemoteStore: Send + Sync + 'static {
    /// Set the value at `path`, creating intermediate nodes
    fn put(&self, path: &RemotePath, value: Value) -> LedgerResult<()>;

    /// Remove whatever is stored at `path`; removing nothing is not an error
    fn delete(&self, path: &RemotePath) -> LedgerResult<()>;

    /// All children of the node at `path`; an absent node has none
    fn read_all(&self, path: &RemotePath) -> LedgerResult<Vec<Value>>;
}

/// Future returned by [`SyncGateway::read_all`]
pub type ReadFuture = Pin<Box<dyn Future<Output = LedgerResult<Vec<Value>>> + Send + 'static>>;

/// The asynchronous persistence boundary used by the ledger core
pub trait SyncGateway: Send + Sync {
    /// Mirror a value to `path` without waiting for the outcome
    fn put(&self, path: &RemotePath, value: Value);

    /// Remove `path` remotely without waiting for the outcome
    fn delete(&self, path: &RemotePath);

    /// Fetch every child of `path`
    fn read_all(&self, path: &RemotePath) -> ReadFuture;

    /// Outcome counters for writes issued so far
    fn stats(&self) -> SyncStats;
}

/// Snapshot of write outcomes
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SyncStats {
    pub writes_applied: u64,
    pub writes_failed: u64,
}

#[derive(Debug, Default)]
pub(crate) struct SyncCounters {
    applied: AtomicU64,
    failed: AtomicU64,
}

impl SyncCounters {
    /// Record the outcome of one write, logging failures
    pub(crate) fn record(&self, op: &str, path: &RemotePath, result: LedgerResult<()>) {
        match result {
            Ok(()) => {
                self.applied.fetch_add(1, Ordering::Relaxed);
                tracing::trace!(%path, op, "remote write applied");
            }
            Err(err) => {
                self.failed.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(%path, op, error = %err, "remote write failed");
            }
        }
    }

    pub(crate) fn snapshot(&self) -> SyncStats {
        SyncStats {
            writes_applied: self.applied.load(Ordering::Relaxed),
            writes_failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_building() {
        let path = RemotePath::root("alice").child(CATEGORY_COLLECTION).child(42).child("name");
        assert_eq!(path.to_string(), "alice/category/42/name");
        assert_eq!(path.segments().len(), 4);
    }

    #[test]
    fn test_parse_ignores_empty_segments() {
        assert_eq!(RemotePath::parse("/alice//budget/"), RemotePath::root("alice").child("budget"));
    }

    #[test]
    fn test_counters() {
        let counters = SyncCounters::default();
        let path = RemotePath::parse("a/b");
        counters.record("put", &path, Ok(()));
        counters.record("put", &path, Err(crate::LedgerError::Io("disk full".into())));
        assert_eq!(
            counters.snapshot(),
            SyncStats {
                writes_applied: 1,
                writes_failed: 1
            }
        );
    }
}
