//! Trip ledger facade.
//!
//! Wires the expense ledger, balance calculator, planner and recorder over a
//! single store. This is the surface the application layer talks to.

use std::sync::Arc;

use tracing::debug;
use tripsplit_shared::LedgerConfig;
use tripsplit_shared::types::{Currency, ExpenseId, MemberId, TripId};

use crate::balance::{Balance, BalanceCache, BalanceCalculator};
use crate::currency::{FxRateProvider, UnifiedBalance, unify_balances};
use crate::ledger::{
    Amendment, Expense, ExpenseLedger, ExpenseStore, LedgerError, NewExpense, SplitStrategy,
    SplitValidator, TripMember,
};
use crate::settlement::{
    NoopReminderHook, PaymentOutcome, ReminderHook, SettlementPlanner, SettlementRecorder,
    SettlementTransaction, TransactionReceipt,
};

/// Shared ledger for every trip held by one store.
pub struct TripLedger<S> {
    store: Arc<S>,
    ledger: ExpenseLedger<S>,
    recorder: SettlementRecorder<S>,
    cache: BalanceCache,
    base_currency: Currency,
}

impl<S: ExpenseStore> TripLedger<S> {
    /// Creates a ledger with reminders disabled.
    #[must_use]
    pub fn new(store: Arc<S>, config: &LedgerConfig) -> Self {
        Self::with_reminder_hook(store, config, Arc::new(NoopReminderHook))
    }

    /// Creates a ledger that reports partially settled expenses to `hook`.
    #[must_use]
    pub fn with_reminder_hook(
        store: Arc<S>,
        config: &LedgerConfig,
        hook: Arc<dyn ReminderHook>,
    ) -> Self {
        let validator = SplitValidator::new(i64::from(config.split_tolerance_minor_units));
        Self {
            ledger: ExpenseLedger::new(Arc::clone(&store), validator),
            recorder: SettlementRecorder::new(Arc::clone(&store), hook),
            cache: BalanceCache::with_config(
                config.balance_cache_capacity,
                config.balance_cache_ttl_secs,
            ),
            base_currency: config.base_currency,
            store,
        }
    }

    /// Currency of zero balances for a trip without expenses.
    #[must_use]
    pub const fn base_currency(&self) -> Currency {
        self.base_currency
    }

    // ========== Members ==========

    /// Adds a member to a trip.
    ///
    /// # Errors
    ///
    /// Returns `EmptyDisplayName` or a storage error.
    pub fn add_member(&self, trip_id: TripId, display_name: &str) -> Result<TripMember, LedgerError> {
        self.ledger.add_member(trip_id, display_name)
    }

    /// Members of a trip in join order.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    pub fn members(&self, trip_id: TripId) -> Result<Vec<TripMember>, LedgerError> {
        self.ledger.members(trip_id)
    }

    // ========== Expenses ==========

    /// Records an expense with caller-supplied splits.
    ///
    /// # Errors
    ///
    /// See [`ExpenseLedger::record`].
    pub fn record_expense(&self, input: NewExpense) -> Result<ExpenseId, LedgerError> {
        self.ledger.record(input)
    }

    /// Records an expense whose splits are derived from `strategy`.
    ///
    /// Any splits already on `draft` are replaced.
    ///
    /// # Errors
    ///
    /// Returns strategy errors (bad percentages, no members) or any error of
    /// [`ExpenseLedger::record`].
    pub fn record_split_expense(
        &self,
        mut draft: NewExpense,
        strategy: SplitStrategy,
    ) -> Result<ExpenseId, LedgerError> {
        draft.splits = strategy.into_splits(draft.total_amount)?;
        self.ledger.record(draft)
    }

    /// Expenses of a trip in insertion order.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    pub fn expenses(&self, trip_id: TripId) -> Result<Vec<Expense>, LedgerError> {
        self.ledger.list(trip_id)
    }

    /// One expense.
    ///
    /// # Errors
    ///
    /// Returns `ExpenseNotFound` if it does not exist.
    pub fn expense(&self, expense_id: ExpenseId) -> Result<Expense, LedgerError> {
        self.ledger.get(expense_id)
    }

    /// Cancels an expense with an adjustment.
    ///
    /// # Errors
    ///
    /// See [`ExpenseLedger::reverse`].
    pub fn reverse_expense(&self, expense_id: ExpenseId, reason: &str) -> Result<ExpenseId, LedgerError> {
        self.ledger.reverse(expense_id, reason)
    }

    /// Replaces an expense with a corrected one.
    ///
    /// # Errors
    ///
    /// See [`ExpenseLedger::amend`].
    pub fn amend_expense(
        &self,
        expense_id: ExpenseId,
        reason: &str,
        replacement: NewExpense,
    ) -> Result<Amendment, LedgerError> {
        self.ledger.amend(expense_id, reason, replacement)
    }

    // ========== Balances ==========

    /// Per-member, per-currency balances, memoized by ledger version.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    pub fn get_balances(&self, trip_id: TripId) -> Result<Vec<Balance>, LedgerError> {
        // Version first: a concurrent write can only make the cached snapshot
        // newer than its key, never older.
        let version = self.store.trip_version(trip_id)?;
        let balances = self.cache.get_or_try_compute(trip_id, version, || {
            debug!(trip_id = %trip_id, version, "Computing balances");
            let members = self.store.list_members(trip_id)?;
            let expenses = self.store.fetch_expenses(trip_id)?;
            BalanceCalculator::compute(&members, &expenses, self.base_currency)
        })?;
        Ok(balances.as_ref().clone())
    }

    /// Balances converted into `target` and summed per member.
    ///
    /// # Errors
    ///
    /// Returns `NoExchangeRate` if `fx` lacks a needed rate, or a storage error.
    pub fn get_unified_balances(
        &self,
        trip_id: TripId,
        target: Currency,
        fx: &dyn FxRateProvider,
    ) -> Result<Vec<UnifiedBalance>, LedgerError> {
        let balances = self.get_balances(trip_id)?;
        unify_balances(&balances, target, fx)
    }

    // ========== Settlement ==========

    /// Suggested payments that zero out the trip.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    pub fn get_settlement_plan(&self, trip_id: TripId) -> Result<Vec<SettlementTransaction>, LedgerError> {
        let balances = self.get_balances(trip_id)?;
        Ok(SettlementPlanner::plan(&balances))
    }

    /// Marks one split paid. Idempotent.
    ///
    /// # Errors
    ///
    /// See [`SettlementRecorder::apply_payment`].
    pub fn mark_paid(&self, expense_id: ExpenseId, member_id: MemberId) -> Result<PaymentOutcome, LedgerError> {
        self.recorder.apply_payment(expense_id, member_id)
    }

    /// Applies a planned payment to the debtor's open splits.
    ///
    /// # Errors
    ///
    /// See [`SettlementRecorder::apply_transaction`].
    pub fn settle_transaction(
        &self,
        trip_id: TripId,
        tx: &SettlementTransaction,
    ) -> Result<TransactionReceipt, LedgerError> {
        self.recorder.apply_transaction(trip_id, tx)
    }
}
