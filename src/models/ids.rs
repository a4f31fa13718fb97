//! Integer identifiers for every entity type, and the allocator that mints them
//!
//! Identifiers are derived from the wall clock (milliseconds since the Unix
//! epoch) so they sort by creation time. The allocator never hands out the
//! same value twice: when the clock stalls or steps backwards it continues
//! from the last issued value.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicI64, Ordering};

/// Macro to generate ID newtype wrappers
macro_rules! define_id {
    ($name:ident, $display_prefix:literal) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wrap a raw identifier
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// The raw integer value, as used in remote paths
            pub const fn value(&self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                let s = s.strip_prefix($display_prefix).unwrap_or(s);
                Ok(Self(s.parse()?))
            }
        }
    };
}

define_id!(TransactionId, "txn-");
define_id!(CategoryId, "cat-");
define_id!(BudgetId, "bud-");

/// Source of wall-clock time for identifier allocation
pub trait Clock: Send + Sync {
    /// Milliseconds since the Unix epoch
    fn now_millis(&self) -> i64;
}

/// The real wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Hands out strictly increasing, time-derived identifiers
pub struct IdAllocator {
    clock: Box<dyn Clock>,
    last: AtomicI64,
}

impl IdAllocator {
    /// Create an allocator reading the given clock
    pub fn new(clock: impl Clock + 'static) -> Self {
        Self {
            clock: Box::new(clock),
            last: AtomicI64::new(0),
        }
    }

    /// Allocate the next raw identifier
    pub fn next_raw(&self) -> i64 {
        let now = self.clock.now_millis();
        let mut last = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(last + 1);
            match self.last.compare_exchange_weak(
                last,
                candidate,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return candidate,
                Err(current) => last = current,
            }
        }
    }

    pub fn next_transaction_id(&self) -> TransactionId {
        TransactionId::new(self.next_raw())
    }

    pub fn next_category_id(&self) -> CategoryId {
        CategoryId::new(self.next_raw())
    }

    pub fn next_budget_id(&self) -> BudgetId {
        BudgetId::new(self.next_raw())
    }

    /// Make sure future identifiers are greater than `raw`
    ///
    /// Called for every entity loaded from the remote store.
    pub fn observe(&self, raw: i64) {
        self.last.fetch_max(raw, Ordering::AcqRel);
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new(SystemClock)
    }
}

impl fmt::Debug for IdAllocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdAllocator")
            .field("last", &self.last.load(Ordering::Relaxed))
            .finish()
    }
}
