//! Audit trail
//!
//! Every create, update and delete of a transaction, category or budget can
//! be appended to a line-delimited JSON log with before/after snapshots.
//! Writing the audit log is best effort: a failed append is logged and never
//! fails the operation that produced it.

mod entry;
mod logger;

pub use entry::{AuditEntry, EntityType, Operation};
pub use logger::AuditLogger;
