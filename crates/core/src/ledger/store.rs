//! Storage contract required from the persistence collaborator.
//!
//! The ledger never talks to a database directly. Anything that implements
//! [`ExpenseStore`] can sit behind it: the bundled in-memory store, a SQL
//! table pair, or a backend-as-a-service record store.

use chrono::{DateTime, Utc};
use thiserror::Error;
use tripsplit_shared::types::{ExpenseId, MemberId, TripId};

use super::types::{Expense, ExpenseRecord, TripMember};

/// Errors raised by an [`ExpenseStore`] implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Expense does not exist.
    #[error("expense not found: {0}")]
    ExpenseNotFound(ExpenseId),

    /// Member has no split on the expense.
    #[error("no split for member {member_id} on expense {expense_id}")]
    SplitNotFound {
        /// The expense searched.
        expense_id: ExpenseId,
        /// The member without a split.
        member_id: MemberId,
    },

    /// Member ID already registered.
    #[error("member already exists: {0}")]
    DuplicateMember(MemberId),

    /// An adjustment for this expense already exists.
    #[error("expense already reversed: {0}")]
    AlreadyReversed(ExpenseId),

    /// The expense is superseded by an adjustment and takes no payments.
    #[error("expense reversed: {0}")]
    ExpenseReversed(ExpenseId),

    /// Backend unreachable or failed.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Key-indexed record store backing a trip ledger.
///
/// Implementations must be safe to share across threads. All writes are
/// atomic per record. The conditional writes
/// ([`ExpenseStore::insert_adjustment`],
/// [`ExpenseStore::compare_and_set_split_paid`] and
/// [`ExpenseStore::mark_expense_settled`]) must check and write under one
/// per-trip critical section.
pub trait ExpenseStore: Send + Sync {
    /// Registers a member on a trip.
    fn insert_member(&self, member: TripMember) -> Result<(), StoreError>;

    /// Lists members of a trip in join order.
    fn list_members(&self, trip_id: TripId) -> Result<Vec<TripMember>, StoreError>;

    /// Appends an expense, atomically assigning a unique ID.
    fn insert_expense(&self, record: ExpenseRecord) -> Result<ExpenseId, StoreError>;

    /// Appends an adjustment unless one already supersedes the same expense.
    ///
    /// Returns `AlreadyReversed` if another adjustment got there first. A
    /// record that is not an adjustment is appended unconditionally.
    fn insert_adjustment(&self, record: ExpenseRecord) -> Result<ExpenseId, StoreError>;

    /// Consistent snapshot of a trip's expenses in insertion order.
    fn fetch_expenses(&self, trip_id: TripId) -> Result<Vec<Expense>, StoreError>;

    /// Fetches one expense.
    fn fetch_expense(&self, expense_id: ExpenseId) -> Result<Option<Expense>, StoreError>;

    /// Atomically flips a split's paid flag from `expected` to `new`.
    ///
    /// Returns `Ok(false)` if the current flag did not equal `expected`,
    /// i.e. the change was already applied by someone else. `paid_at` is
    /// stored when `new` is true and cleared otherwise. Setting a split paid
    /// on an expense superseded by an adjustment fails with `ExpenseReversed`.
    fn compare_and_set_split_paid(
        &self,
        expense_id: ExpenseId,
        member_id: MemberId,
        expected: bool,
        new: bool,
        paid_at: DateTime<Utc>,
    ) -> Result<bool, StoreError>;

    /// Sets `is_settled` once every split of the expense is paid.
    ///
    /// Idempotent. Returns true only for the call that made the transition,
    /// so concurrent payers see exactly one settlement.
    fn mark_expense_settled(&self, expense_id: ExpenseId) -> Result<bool, StoreError>;

    /// Monotonic counter bumped on every member or expense insert and every
    /// successful CAS for a trip.
    fn trip_version(&self, trip_id: TripId) -> Result<u64, StoreError>;
}
