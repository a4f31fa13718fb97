//! Application state
//!
//! A [`Tracker`] owns one [`Storage`] registry and hands out the services
//! that operate on it. It is built once at start-up and shared by reference;
//! wrap it in an `Arc` to use it from several threads.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::audit::AuditLogger;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{
    Budget, BudgetId, Category, CategoryId, Clock, Money, Transaction, TransactionId,
};
use crate::services::{BudgetService, CategoryService, TransactionService};
use crate::storage::Storage;
use crate::sync::mirror::FIELD_BUDGET_ID;
use crate::sync::{
    SyncGateway, SyncStats, BUDGET_COLLECTION, CATEGORY_COLLECTION, TRANSACTION_COLLECTION,
};

/// Counts of records merged in by [`Tracker::load`]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadSummary {
    pub transactions: usize,
    pub categories: usize,
    pub budgets: usize,
    /// Remote records that could not be decoded
    pub skipped: usize,
}

/// Observer for the start-up load
pub trait LoadListener: Send {
    fn on_start(&mut self) {}
    fn on_success(&mut self, summary: &LoadSummary);
    fn on_failed(&mut self, error: &LedgerError);
}

/// A broken aggregate invariant found by [`Tracker::verify`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inconsistency {
    /// A category's amount differs from the sum of its members
    CategoryAmount {
        category: CategoryId,
        recorded: Money,
        expected: Money,
    },
    /// A category lists a transaction the ledger does not hold
    MissingMember {
        category: CategoryId,
        transaction: TransactionId,
    },
    /// A budget's total differs from the sum of its categories
    BudgetTotal {
        budget: BudgetId,
        recorded: Money,
        expected: Money,
    },
    /// A budget lists a category that is not tracked
    MissingCategory { budget: BudgetId, category: CategoryId },
    /// A budget lists a category that rolls up into a different budget
    ForeignCategory { budget: BudgetId, category: CategoryId },
    /// A category names a budget that does not list it
    UnlistedCategory { category: CategoryId, budget: BudgetId },
    /// A category names a budget that is not tracked
    MissingBudget { category: CategoryId, budget: BudgetId },
    /// More than one category carries the same name
    DuplicateName { name: String },
}

impl fmt::Display for Inconsistency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CategoryAmount {
                category,
                recorded,
                expected,
            } => write!(
                f,
                "category {} records {} but its transactions sum to {}",
                category, recorded, expected
            ),
            Self::MissingMember {
                category,
                transaction,
            } => write!(
                f,
                "category {} lists missing transaction {}",
                category, transaction
            ),
            Self::BudgetTotal {
                budget,
                recorded,
                expected,
            } => write!(
                f,
                "budget {} records {} but its categories sum to {}",
                budget, recorded, expected
            ),
            Self::MissingCategory { budget, category } => {
                write!(f, "budget {} lists missing category {}", budget, category)
            }
            Self::ForeignCategory { budget, category } => write!(
                f,
                "budget {} lists category {} which belongs to another budget",
                budget, category
            ),
            Self::UnlistedCategory { category, budget } => write!(
                f,
                "category {} names budget {} which does not list it",
                category, budget
            ),
            Self::MissingBudget { category, budget } => {
                write!(f, "category {} names missing budget {}", category, budget)
            }
            Self::DuplicateName { name } => write!(f, "category name '{}' is used twice", name),
        }
    }
}

/// What [`Tracker::recompute_all`] changed
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RepairSummary {
    pub categories_fixed: usize,
    pub budgets_fixed: usize,
    /// Dangling or foreign member ids dropped from categories and budgets
    pub members_dropped: usize,
    /// Categories added to the budget they name
    pub members_added: usize,
}

impl RepairSummary {
    pub fn is_clean(&self) -> bool {
        *self == Self::default()
    }
}

/// The finance tracker's application state
#[derive(Debug)]
pub struct Tracker {
    storage: Storage,
}

impl Tracker {
    /// An empty tracker mirroring into `user_id`'s remote namespace
    pub fn new(gateway: Arc<dyn SyncGateway>, user_id: &str) -> Self {
        Self::from_storage(Storage::new(gateway, user_id))
    }

    /// An empty tracker whose ids come from `clock`
    pub fn with_clock(
        gateway: Arc<dyn SyncGateway>,
        user_id: &str,
        clock: impl Clock + 'static,
    ) -> Self {
        Self::from_storage(Storage::with_clock(gateway, user_id, clock))
    }

    pub fn from_storage(storage: Storage) -> Self {
        Self { storage }
    }

    /// Record every change in an audit log
    pub fn with_audit(self, logger: AuditLogger) -> Self {
        Self::from_storage(self.storage.with_audit(logger))
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn transactions(&self) -> TransactionService<'_> {
        TransactionService::new(&self.storage)
    }

    pub fn categories(&self) -> CategoryService<'_> {
        CategoryService::new(&self.storage)
    }

    pub fn budgets(&self) -> BudgetService<'_> {
        BudgetService::new(&self.storage)
    }

    /// Outcome counters for remote writes issued so far
    pub fn sync_stats(&self) -> SyncStats {
        self.storage.mirror().gateway().stats()
    }

    /// Populate the registry from the remote store
    ///
    /// All three collections are read before anything is merged, so a failed
    /// read leaves local state exactly as it was. Remote records replace local
    /// ones with the same id; records that cannot be decoded are skipped.
    pub async fn load(&self) -> LedgerResult<LoadSummary> {
        let mirror = self.storage.mirror();
        let gateway = mirror.gateway();

        let raw_transactions = gateway
            .read_all(&mirror.collection(TRANSACTION_COLLECTION))
            .await?;
        let raw_categories = gateway
            .read_all(&mirror.collection(CATEGORY_COLLECTION))
            .await?;
        let raw_budgets = gateway.read_all(&mirror.collection(BUDGET_COLLECTION)).await?;

        let mut skipped = 0;
        let transactions: Vec<Transaction> =
            decode_all(raw_transactions, TRANSACTION_COLLECTION, &mut skipped);
        let categories: Vec<Category> =
            decode_all(raw_categories, CATEGORY_COLLECTION, &mut skipped);
        let budgets: Vec<Budget> = decode_all(raw_budgets, BUDGET_COLLECTION, &mut skipped);

        let summary = LoadSummary {
            transactions: transactions.len(),
            categories: categories.len(),
            budgets: budgets.len(),
            skipped,
        };

        let ids = self.storage.ids();
        transactions.iter().for_each(|t| ids.observe(t.id.value()));
        categories.iter().for_each(|c| ids.observe(c.id.value()));
        budgets.iter().for_each(|b| ids.observe(b.id.value()));

        let _cascade = self.storage.lock_cascade()?;
        self.storage.budgets.merge(budgets)?;
        self.storage.categories.merge(categories)?;
        self.storage.transactions.merge(transactions)?;

        tracing::info!(
            transactions = summary.transactions,
            categories = summary.categories,
            budgets = summary.budgets,
            skipped = summary.skipped,
            "loaded remote snapshot"
        );
        Ok(summary)
    }

    /// [`load`](Self::load), reporting progress to a listener
    pub async fn load_with_listener(&self, listener: &mut dyn LoadListener) {
        listener.on_start();
        match self.load().await {
            Ok(summary) => listener.on_success(&summary),
            Err(err) => {
                tracing::warn!(error = %err, "remote load failed");
                listener.on_failed(&err);
            }
        }
    }

    /// Check every aggregate invariant without changing anything
    pub fn verify(&self) -> LedgerResult<Vec<Inconsistency>> {
        let ledger: HashMap<TransactionId, Money> = self
            .storage
            .transactions
            .get_all()?
            .into_iter()
            .map(|t| (t.id, t.amount))
            .collect();
        let categories = self.storage.categories.get_all()?;
        let by_id: HashMap<CategoryId, &Category> = categories.iter().map(|c| (c.id, c)).collect();
        let budgets = self.storage.budgets.get_all()?;
        let listed: HashSet<(BudgetId, CategoryId)> = budgets
            .iter()
            .flat_map(|b| b.category_ids.iter().map(move |c| (b.id, *c)))
            .collect();
        let budget_ids: HashSet<BudgetId> = budgets.iter().map(|b| b.id).collect();

        let mut problems = Vec::new();
        let mut names = HashSet::new();

        for category in &categories {
            if !names.insert(category.name.as_str()) {
                problems.push(Inconsistency::DuplicateName {
                    name: category.name.clone(),
                });
            }

            let mut expected = Money::zero();
            for transaction in &category.transaction_ids {
                match ledger.get(transaction) {
                    Some(amount) => {
                        expected = expected.checked_add(*amount).ok_or_else(|| {
                            LedgerError::amount_out_of_range(format!("category {}", category.id))
                        })?;
                    }
                    None => problems.push(Inconsistency::MissingMember {
                        category: category.id,
                        transaction: *transaction,
                    }),
                }
            }
            if expected != category.current_amount {
                problems.push(Inconsistency::CategoryAmount {
                    category: category.id,
                    recorded: category.current_amount,
                    expected,
                });
            }

            if let Some(budget) = category.budget_id {
                if !budget_ids.contains(&budget) {
                    problems.push(Inconsistency::MissingBudget {
                        category: category.id,
                        budget,
                    });
                } else if !listed.contains(&(budget, category.id)) {
                    problems.push(Inconsistency::UnlistedCategory {
                        category: category.id,
                        budget,
                    });
                }
            }
        }

        for budget in &budgets {
            let mut expected = Money::zero();
            for category_id in &budget.category_ids {
                let Some(category) = by_id.get(category_id) else {
                    problems.push(Inconsistency::MissingCategory {
                        budget: budget.id,
                        category: *category_id,
                    });
                    continue;
                };
                if category.budget_id != Some(budget.id) {
                    problems.push(Inconsistency::ForeignCategory {
                        budget: budget.id,
                        category: *category_id,
                    });
                }
                expected = expected.checked_add(category.current_amount).ok_or_else(|| {
                    LedgerError::amount_out_of_range(format!("budget {}", budget.id))
                })?;
            }
            if expected != budget.total {
                problems.push(Inconsistency::BudgetTotal {
                    budget: budget.id,
                    recorded: budget.total,
                    expected,
                });
            }
        }

        Ok(problems)
    }

    /// Rebuild every aggregate from the membership relation
    ///
    /// Category amounts are recomputed from their member transactions.
    /// Budget membership is then rebuilt from each category's `budget_id`,
    /// and budget totals from the resulting members. Members that no longer
    /// exist are dropped, as are budget links to budgets that are gone. Only
    /// records that actually change are written remotely.
    pub fn recompute_all(&self) -> LedgerResult<RepairSummary> {
        let _cascade = self.storage.lock_cascade()?;
        let mirror = self.storage.mirror();
        let mut summary = RepairSummary::default();

        let ledger: HashMap<TransactionId, Money> = self
            .storage
            .transactions
            .get_all()?
            .into_iter()
            .map(|t| (t.id, t.amount))
            .collect();
        let budget_ids: HashSet<BudgetId> = self
            .storage
            .budgets
            .get_all()?
            .into_iter()
            .map(|b| b.id)
            .collect();

        for category in self.storage.categories.get_all()? {
            self.storage.categories.update(category.id, |category| {
                let kept: Vec<TransactionId> = category
                    .transaction_ids
                    .iter()
                    .copied()
                    .filter(|id| ledger.contains_key(id))
                    .collect();
                let amounts = kept.iter().filter_map(|id| ledger.get(id).copied());
                let expected = Money::checked_sum(amounts).ok_or_else(|| {
                    LedgerError::amount_out_of_range(format!("category '{}'", category.name))
                })?;
                let dropped = category.transaction_ids.len() - kept.len();
                let orphaned = category
                    .budget_id
                    .is_some_and(|id| !budget_ids.contains(&id));

                if orphaned {
                    category.budget_id = None;
                    mirror.put_category_field(category.id, FIELD_BUDGET_ID, None::<BudgetId>);
                }
                if dropped > 0 || expected != category.current_amount {
                    category.transaction_ids = kept;
                    category.current_amount = expected;
                    mirror.put_category_totals(category);
                } else if !orphaned {
                    return Ok(());
                }
                summary.categories_fixed += 1;
                summary.members_dropped += dropped;
                Ok(())
            })?;
        }

        let categories = self.storage.categories.get_all()?;

        for budget in self.storage.budgets.get_all()? {
            let owned: Vec<CategoryId> = categories
                .iter()
                .filter(|c| c.budget_id == Some(budget.id))
                .map(|c| c.id)
                .collect();

            self.storage.budgets.update(budget.id, |budget| {
                let mut seen = HashSet::new();
                let mut members: Vec<CategoryId> = budget
                    .category_ids
                    .iter()
                    .copied()
                    .filter(|id| owned.contains(id) && seen.insert(*id))
                    .collect();
                let dropped = budget.category_ids.len() - members.len();
                let added: Vec<CategoryId> = owned
                    .iter()
                    .copied()
                    .filter(|id| !members.contains(id))
                    .collect();
                members.extend(&added);
                let (expected, _) = self.storage.categories.sum_amounts(&members)?;

                if members != budget.category_ids || expected != budget.total {
                    budget.category_ids = members;
                    budget.total = expected;
                    mirror.put_budget(budget);
                    summary.budgets_fixed += 1;
                    summary.members_dropped += dropped;
                    summary.members_added += added.len();
                }
                Ok(())
            })?;
        }

        if !summary.is_clean() {
            tracing::info!(
                categories = summary.categories_fixed,
                budgets = summary.budgets_fixed,
                dropped = summary.members_dropped,
                added = summary.members_added,
                "aggregates rebuilt"
            );
        }
        Ok(summary)
    }
}

fn decode_all<T: DeserializeOwned>(
    values: Vec<Value>,
    collection: &str,
    skipped: &mut usize,
) -> Vec<T> {
    values
        .into_iter()
        .filter_map(|value| match serde_json::from_value(value) {
            Ok(record) => Some(record),
            Err(err) => {
                tracing::warn!(collection, error = %err, "skipping malformed remote record");
                *skipped += 1;
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LedgerDate;
    use crate::sync::{InlineGateway, MemoryStore, QueuedGateway, RemotePath};
    use serde_json::json;

    fn tracker() -> (Tracker, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let gateway = Arc::new(InlineGateway::new(Arc::clone(&store)));
        (Tracker::new(gateway, "alice"), store)
    }

    fn txn(id: i64, category: CategoryId, cents: i64) -> Transaction {
        Transaction::new(
            TransactionId::new(id),
            category,
            LedgerDate::new(2023, 5, 2),
            Money::from_cents(cents),
        )
    }

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl LoadListener for Recorder {
        fn on_start(&mut self) {
            self.events.push("start".into());
        }

        fn on_success(&mut self, summary: &LoadSummary) {
            self.events.push(format!("success:{}", summary.categories));
        }

        fn on_failed(&mut self, _error: &LedgerError) {
            self.events.push("failed".into());
        }
    }

    #[tokio::test]
    async fn test_load_restores_state_written_by_another_tracker() {
        let (first, store) = tracker();
        let budget = first.budgets().create("Monthly").unwrap();
        let food = first.categories().create("Food", Some(budget.id)).unwrap();
        first.transactions().add(txn(1, food.id, 2000)).unwrap();
        first.transactions().add(txn(2, food.id, -500)).unwrap();

        let gateway = Arc::new(InlineGateway::new(Arc::clone(&store)));
        let second = Tracker::new(gateway, "alice");
        let summary = second.load().await.unwrap();

        assert_eq!(
            summary,
            LoadSummary {
                transactions: 2,
                categories: 1,
                budgets: 1,
                skipped: 0
            }
        );
        let loaded = second.categories().lookup(food.id).unwrap();
        assert_eq!(loaded, first.categories().lookup(food.id).unwrap());
        assert_eq!(second.budgets().lookup(budget.id).unwrap().total, Money::from_cents(1500));
        assert!(second.verify().unwrap().is_empty());

        // The name index is rebuilt, and new ids continue past loaded ones
        assert!(second.categories().create("Food", None).unwrap_err().is_duplicate_name());
        assert!(second.categories().create("Rent", None).unwrap().id > food.id);
    }

    #[tokio::test]
    async fn test_failed_load_leaves_state_untouched() {
        let (tracker, store) = tracker();
        tracker.categories().create("Food", None).unwrap();
        store.set_fail_reads(true);

        let err = tracker.load().await.unwrap_err();
        assert!(matches!(err, LedgerError::RemoteSyncFailure(_)));
        assert_eq!(tracker.categories().count().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_listener_phases() {
        let (tracker, store) = tracker();
        tracker.categories().create("Food", None).unwrap();

        let mut recorder = Recorder::default();
        tracker.load_with_listener(&mut recorder).await;
        assert_eq!(recorder.events, vec!["start", "success:1"]);

        store.set_fail_reads(true);
        let mut recorder = Recorder::default();
        tracker.load_with_listener(&mut recorder).await;
        assert_eq!(recorder.events, vec!["start", "failed"]);
    }

    #[tokio::test]
    async fn test_malformed_records_are_skipped() {
        let store = Arc::new(MemoryStore::with_tree(json!({
            "alice": {
                "category": {
                    "1": {"id": 1, "name": "Food", "currentAmount": 0, "transactionIds": []},
                    "2": {"name": 17}
                }
            }
        })));
        let tracker = Tracker::new(Arc::new(InlineGateway::new(store)), "alice");

        let summary = tracker.load().await.unwrap();
        assert_eq!(summary.categories, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(tracker.categories().lookup(CategoryId::new(1)).unwrap().budget_id, None);
    }

    #[tokio::test]
    async fn test_queued_gateway_round_trip() {
        let store = Arc::new(MemoryStore::new());
        let (gateway, _worker) = QueuedGateway::spawn(Arc::clone(&store));
        let gateway = Arc::new(gateway);
        let tracker = Tracker::new(gateway.clone(), "alice");

        let food = tracker.categories().create("Food", None).unwrap();
        tracker.transactions().add(txn(1, food.id, 1234)).unwrap();
        gateway.flush().await;

        let path = RemotePath::parse(&format!("alice/category/{}/currentAmount", food.id));
        assert_eq!(store.get(&path), Some(json!(1234)));
        assert_eq!(tracker.sync_stats().writes_failed, 0);
    }

    #[test]
    fn test_write_failures_do_not_fail_operations() {
        let (tracker, store) = tracker();
        store.set_fail_writes(true);

        let food = tracker.categories().create("Food", None).unwrap();
        tracker.transactions().add(txn(1, food.id, 100)).unwrap();

        assert_eq!(
            tracker.categories().lookup(food.id).unwrap().current_amount,
            Money::from_cents(100)
        );
        assert!(tracker.sync_stats().writes_failed > 0);
        assert_eq!(tracker.sync_stats().writes_applied, 0);
    }

    #[test]
    fn test_verify_and_repair() {
        let (tracker, _store) = tracker();
        let budget = tracker.budgets().create("Monthly").unwrap();
        let food = tracker.categories().create("Food", Some(budget.id)).unwrap();
        tracker.transactions().add(txn(1, food.id, 2000)).unwrap();
        assert!(tracker.verify().unwrap().is_empty());

        // Drift the category: a member that vanished and a wrong amount
        tracker
            .storage()
            .categories
            .update(food.id, |c| {
                c.transaction_ids.push(TransactionId::new(99));
                c.current_amount = Money::from_cents(5);
                Ok(())
            })
            .unwrap();

        let problems = tracker.verify().unwrap();
        assert!(problems.contains(&Inconsistency::MissingMember {
            category: food.id,
            transaction: TransactionId::new(99)
        }));
        assert!(problems.contains(&Inconsistency::CategoryAmount {
            category: food.id,
            recorded: Money::from_cents(5),
            expected: Money::from_cents(2000)
        }));
        assert!(problems.contains(&Inconsistency::BudgetTotal {
            budget: budget.id,
            recorded: Money::from_cents(2000),
            expected: Money::from_cents(5)
        }));

        let summary = tracker.recompute_all().unwrap();
        assert_eq!(
            summary,
            RepairSummary {
                categories_fixed: 1,
                budgets_fixed: 0,
                members_dropped: 1,
                members_added: 0,
            }
        );
        assert!(tracker.verify().unwrap().is_empty());
        assert!(tracker.recompute_all().unwrap().is_clean());
    }

    #[test]
    fn test_verify_reports_membership_mismatch() {
        let (tracker, _store) = tracker();
        let home = tracker.budgets().create("Home").unwrap();
        let travel = tracker.budgets().create("Travel").unwrap();
        let food = tracker.categories().create("Food", Some(home.id)).unwrap();

        tracker
            .storage()
            .budgets
            .update(travel.id, |b| {
                b.attach(food.id);
                Ok(())
            })
            .unwrap();
        tracker
            .storage()
            .budgets
            .update(home.id, |b| {
                b.detach(food.id);
                Ok(())
            })
            .unwrap();

        let problems = tracker.verify().unwrap();
        assert!(problems.contains(&Inconsistency::ForeignCategory {
            budget: travel.id,
            category: food.id
        }));
        assert!(problems.contains(&Inconsistency::UnlistedCategory {
            category: food.id,
            budget: home.id
        }));

        let summary = tracker.recompute_all().unwrap();
        assert_eq!(summary.members_dropped, 1);
        assert_eq!(summary.members_added, 1);
        assert!(tracker.verify().unwrap().is_empty());
        assert_eq!(tracker.budgets().lookup(home.id).unwrap().category_ids, vec![food.id]);
        assert!(tracker.budgets().lookup(travel.id).unwrap().category_ids.is_empty());
    }

    #[tokio::test]
    async fn test_repair_lists_category_in_the_budget_it_names() {
        let store = Arc::new(MemoryStore::with_tree(json!({
            "alice": {
                "transaction": {
                    "10": {"id": 10, "amount": 2000, "categoryId": 1,
                           "year": 2023, "month": 1, "day": 15}
                },
                "category": {
                    "1": {"id": 1, "name": "Food", "currentAmount": 2000,
                          "transactionIds": [10], "budgetId": 5},
                    "2": {"id": 2, "name": "Rent", "currentAmount": 0,
                          "transactionIds": [], "budgetId": 6}
                },
                "budget": {
                    "5": {"id": 5, "name": "Monthly", "categoryIds": [], "total": 0}
                }
            }
        })));
        let tracker = Tracker::new(Arc::new(InlineGateway::new(Arc::clone(&store))), "alice");
        tracker.load().await.unwrap();

        let problems = tracker.verify().unwrap();
        assert!(problems.contains(&Inconsistency::UnlistedCategory {
            category: CategoryId::new(1),
            budget: BudgetId::new(5)
        }));
        assert!(problems.contains(&Inconsistency::MissingBudget {
            category: CategoryId::new(2),
            budget: BudgetId::new(6)
        }));

        let summary = tracker.recompute_all().unwrap();
        assert_eq!(
            summary,
            RepairSummary {
                categories_fixed: 1,
                budgets_fixed: 1,
                members_dropped: 0,
                members_added: 1,
            }
        );
        assert!(tracker.verify().unwrap().is_empty());

        let monthly = tracker.budgets().lookup(BudgetId::new(5)).unwrap();
        assert_eq!(monthly.category_ids, vec![CategoryId::new(1)]);
        assert_eq!(monthly.total, Money::from_cents(2000));
        assert_eq!(store.get(&RemotePath::parse("alice/budget/5/total")), Some(json!(2000)));
        assert_eq!(tracker.categories().lookup(CategoryId::new(2)).unwrap().budget_id, None);
    }

    #[test]
    fn test_concurrent_adds_keep_invariants() {
        let (tracker, _store) = tracker();
        let tracker = Arc::new(tracker);
        let budget = tracker.budgets().create("Monthly").unwrap();
        let food = tracker.categories().create("Food", Some(budget.id)).unwrap();
        let rent = tracker.categories().create("Rent", Some(budget.id)).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let tracker = Arc::clone(&tracker);
                let category = if worker % 2 == 0 { food.id } else { rent.id };
                std::thread::spawn(move || {
                    for i in 0..25 {
                        let id = worker * 1000 + i + 1;
                        tracker
                            .transactions()
                            .add(txn(id, category, i - 10))
                            .unwrap();
                        if i % 5 == 0 {
                            tracker.transactions().delete(TransactionId::new(id), true).unwrap();
                        }
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert!(tracker.verify().unwrap().is_empty());
        assert_eq!(tracker.transactions().count().unwrap(), 8 * 20);
    }
}
