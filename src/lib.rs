//! Sanity - the consistency core of a personal finance tracker
//!
//! Keeps three related collections (transactions, categories and budgets)
//! mutually consistent as transactions come and go, and mirrors every change
//! to a remote store.
//!
//! # Architecture
//!
//! - `models`: transactions, categories, budgets and the value types they use
//! - `storage`: the entity registry, one locked collection per entity type
//! - `services`: the transaction ledger and the category and budget
//!   aggregate managers, which run every cascade
//! - `sync`: the asynchronous gateway to the remote store
//! - `tracker`: the application state tying the above together
//! - `audit`: optional append-only change log
//! - `config`, `cli`, `display`: the command-line front end
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use sanity::models::{LedgerDate, Money, Transaction};
//! use sanity::sync::{InlineGateway, MemoryStore};
//! use sanity::tracker::Tracker;
//!
//! let store = Arc::new(MemoryStore::new());
//! let tracker = Tracker::new(Arc::new(InlineGateway::new(store)), "alice");
//!
//! let food = tracker.categories().create("Food", None)?;
//! let ledger = tracker.transactions();
//! let lunch = Transaction::new(
//!     ledger.next_id(),
//!     food.id,
//!     LedgerDate::today(),
//!     Money::from_cents(2000),
//! );
//! ledger.add(lunch)?;
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;
pub mod sync;
pub mod tracker;

pub use error::{LedgerError, LedgerResult};
pub use tracker::{Inconsistency, LoadListener, LoadSummary, RepairSummary, Tracker};
