//! Idempotent payment recording.
//!
//! The only mutation after an expense is recorded is flipping a split's
//! `is_paid` flag, done through the store's compare-and-set so that racing
//! callers see exactly one `Applied`.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use tripsplit_shared::types::{ExpenseId, MemberId, MinorUnits, TripId};

use super::notify::{ReminderEvent, ReminderHook};
use super::planner::SettlementTransaction;
use crate::ledger::error::LedgerError;
use crate::ledger::store::ExpenseStore;

/// Result of marking one split paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PaymentOutcome {
    /// This call flipped the flag.
    Applied {
        /// True if the payment closed the last open split.
        expense_settled: bool,
    },
    /// The split was already paid; nothing was written.
    AlreadyPaid,
}

/// Result of applying a planned transaction to concrete splits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
    /// Expenses whose split for the debtor was marked paid, in ledger order.
    pub applied: Vec<ExpenseId>,
    /// Sum of the splits marked paid.
    pub covered: MinorUnits,
    /// Part of the transaction with no direct split behind it.
    pub uncovered: MinorUnits,
}

/// Applies payments to splits.
pub struct SettlementRecorder<S> {
    store: Arc<S>,
    hook: Arc<dyn ReminderHook>,
}

impl<S: ExpenseStore> SettlementRecorder<S> {
    /// Creates a recorder that reports open expenses to `hook`.
    #[must_use]
    pub fn new(store: Arc<S>, hook: Arc<dyn ReminderHook>) -> Self {
        Self { store, hook }
    }

    /// Marks `member_id`'s split on `expense_id` as paid.
    ///
    /// Idempotent: repeated or racing calls return `AlreadyPaid` and leave
    /// state unchanged.
    ///
    /// # Errors
    ///
    /// Returns `ExpenseNotFound` or `SplitNotFound` for unknown targets,
    /// `ExpenseReversed` if an adjustment cancels the expense, or a storage
    /// error.
    pub fn apply_payment(
        &self,
        expense_id: ExpenseId,
        member_id: MemberId,
    ) -> Result<PaymentOutcome, LedgerError> {
        let expense = self
            .store
            .fetch_expense(expense_id)?
            .ok_or(LedgerError::ExpenseNotFound(expense_id))?;
        let split = expense
            .split_for(member_id)
            .ok_or(LedgerError::SplitNotFound {
                expense_id,
                member_id,
            })?;

        if split.is_paid {
            debug!(expense_id = %expense_id, member_id = %member_id, "Split already paid");
            return Ok(PaymentOutcome::AlreadyPaid);
        }

        let won = self
            .store
            .compare_and_set_split_paid(expense_id, member_id, false, true, Utc::now())?;
        if !won {
            debug!(expense_id = %expense_id, member_id = %member_id, "Lost payment race");
            return Ok(PaymentOutcome::AlreadyPaid);
        }

        // The store decides which payer closed the expense.
        let expense_settled = self.store.mark_expense_settled(expense_id)?;
        if !expense_settled {
            let expense = self
                .store
                .fetch_expense(expense_id)?
                .ok_or(LedgerError::ExpenseNotFound(expense_id))?;
            if !expense.all_splits_paid() {
                self.hook.remind(&ReminderEvent::for_expense(&expense));
            }
        }

        info!(
            expense_id = %expense_id,
            member_id = %member_id,
            expense_settled,
            "Split marked paid"
        );
        Ok(PaymentOutcome::Applied { expense_settled })
    }

    /// Applies a planned transaction to the debtor's open splits.
    ///
    /// Walks unpaid splits owed by `tx.from_member_id` on regular expenses
    /// paid by `tx.to_member_id` in `tx.currency` that no adjustment cancels,
    /// in ledger order, and marks
    /// each paid while the running total stays within `tx.amount`. Whatever
    /// cannot be matched to a direct split is reported as `uncovered`.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a non-positive amount or a self-payment,
    /// a reference error if either party is not on the trip, or a storage
    /// error.
    pub fn apply_transaction(
        &self,
        trip_id: TripId,
        tx: &SettlementTransaction,
    ) -> Result<TransactionReceipt, LedgerError> {
        if tx.amount <= 0 {
            return Err(LedgerError::NonPositiveTotal(tx.amount));
        }
        if tx.from_member_id == tx.to_member_id {
            return Err(LedgerError::SelfPayment(tx.from_member_id));
        }

        let members: HashSet<MemberId> = self
            .store
            .list_members(trip_id)?
            .into_iter()
            .map(|m| m.id)
            .collect();
        for member_id in [tx.from_member_id, tx.to_member_id] {
            if !members.contains(&member_id) {
                return Err(LedgerError::MemberNotInTrip { member_id, trip_id });
            }
        }

        let mut applied = Vec::new();
        let mut covered: MinorUnits = 0;
        let expenses = self.store.fetch_expenses(trip_id)?;
        let reversed: HashSet<ExpenseId> =
            expenses.iter().filter_map(|e| e.kind.supersedes()).collect();
        let candidates = expenses.into_iter().filter(|e| {
            e.kind.is_expense()
                && !reversed.contains(&e.id)
                && e.payer_id == tx.to_member_id
                && e.currency == tx.currency
        });

        for expense in candidates {
            let Some(split) = expense.split_for(tx.from_member_id) else {
                continue;
            };
            if split.is_paid || split.owed_amount > tx.amount - covered {
                continue;
            }

            match self.apply_payment(expense.id, tx.from_member_id) {
                Ok(PaymentOutcome::Applied { .. }) => {
                    covered += split.owed_amount;
                    applied.push(expense.id);
                }
                // Reversed after the snapshot was taken.
                Ok(PaymentOutcome::AlreadyPaid) | Err(LedgerError::ExpenseReversed(_)) => {}
                Err(e) => return Err(e),
            }
        }

        let receipt = TransactionReceipt {
            applied,
            covered,
            uncovered: tx.amount - covered,
        };
        info!(
            trip_id = %trip_id,
            from = %tx.from_member_id,
            to = %tx.to_member_id,
            amount = tx.amount,
            covered = receipt.covered,
            splits = receipt.applied.len(),
            "Settlement transaction applied"
        );
        Ok(receipt)
    }
}
