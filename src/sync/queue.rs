//! Gateway backed by a background worker
//!
//! Callers push operations onto an unbounded tokio channel and return
//! immediately. A single worker drains the channel on the blocking thread
//! pool and applies each operation to the [`RemoteStore`] in submission
//! order, so a read always observes every write queued before it.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use super::{ReadFuture, RemotePath, RemoteStore, SyncCounters, SyncGateway, SyncStats};
use crate::error::{LedgerError, LedgerResult};

enum SyncOp {
    Put {
        path: RemotePath,
        value: Value,
    },
    Delete {
        path: RemotePath,
    },
    ReadAll {
        path: RemotePath,
        reply: oneshot::Sender<LedgerResult<Vec<Value>>>,
    },
    Flush {
        reply: oneshot::Sender<()>,
    },
}

/// Fire-and-forget gateway with ordered, asynchronous delivery
pub struct QueuedGateway {
    tx: mpsc::UnboundedSender<SyncOp>,
    counters: Arc<SyncCounters>,
}

impl QueuedGateway {
    /// Start the worker for `store`
    ///
    /// Must be called from within a tokio runtime. The worker stops once the
    /// gateway is dropped and the queue is drained; the returned handle
    /// resolves then.
    pub fn spawn<S: RemoteStore>(store: Arc<S>) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let counters = Arc::new(SyncCounters::default());

        let worker_counters = Arc::clone(&counters);
        let handle = tokio::task::spawn_blocking(move || run_worker(store, rx, worker_counters));

        (Self { tx, counters }, handle)
    }

    /// Wait until every operation queued so far has been applied
    pub async fn flush(&self) {
        let (reply, done) = oneshot::channel();
        if self.tx.send(SyncOp::Flush { reply }).is_err() {
            return;
        }
        let _ = done.await;
    }

    fn enqueue(&self, op: SyncOp, path: &RemotePath, name: &str) {
        if self.tx.send(op).is_err() {
            self.counters.record(
                name,
                path,
                Err(LedgerError::RemoteSyncFailure("sync worker has stopped".into())),
            );
        }
    }
}

impl SyncGateway for QueuedGateway {
    fn put(&self, path: &RemotePath, value: Value) {
        let op = SyncOp::Put {
            path: path.clone(),
            value,
        };
        self.enqueue(op, path, "put");
    }

    fn delete(&self, path: &RemotePath) {
        self.enqueue(SyncOp::Delete { path: path.clone() }, path, "delete");
    }

    fn read_all(&self, path: &RemotePath) -> ReadFuture {
        let (reply, result) = oneshot::channel();
        let op = SyncOp::ReadAll {
            path: path.clone(),
            reply,
        };
        if self.tx.send(op).is_err() {
            return Box::pin(std::future::ready(Err(LedgerError::RemoteSyncFailure(
                "sync worker has stopped".into(),
            ))));
        }

        Box::pin(async move {
            match result.await {
                Ok(outcome) => outcome,
                Err(_) => Err(LedgerError::RemoteSyncFailure(
                    "sync worker dropped the read".into(),
                )),
            }
        })
    }

    fn stats(&self) -> SyncStats {
        self.counters.snapshot()
    }
}

fn run_worker<S: RemoteStore>(
    store: Arc<S>,
    mut rx: mpsc::UnboundedReceiver<SyncOp>,
    counters: Arc<SyncCounters>,
) {
    tracing::debug!("sync worker started");
    while let Some(op) = rx.blocking_recv() {
        match op {
            SyncOp::Put { path, value } => {
                let result = store.put(&path, value);
                counters.record("put", &path, result);
            }
            SyncOp::Delete { path } => {
                let result = store.delete(&path);
                counters.record("delete", &path, result);
            }
            SyncOp::ReadAll { path, reply } => {
                let _ = reply.send(store.read_all(&path));
            }
            SyncOp::Flush { reply } => {
                let _ = reply.send(());
            }
        }
    }
    tracing::debug!("sync worker stopped");
}
