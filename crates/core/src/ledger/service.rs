//! Expense ledger service.
//!
//! Validates new expenses against trip membership and appends them to the
//! store. Records are never edited; corrections are appended as adjustments.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};
use tripsplit_shared::types::{ExpenseId, MemberId, TripId};

use super::error::LedgerError;
use super::store::ExpenseStore;
use super::types::{Expense, ExpenseKind, ExpenseRecord, NewExpense, Split, SplitInput, TripMember};
use super::validation::SplitValidator;

/// Result of amending an expense.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Amendment {
    /// The adjustment cancelling the original.
    pub adjustment_id: ExpenseId,
    /// The corrected expense.
    pub replacement_id: ExpenseId,
}

/// Append-only expense ledger keyed by trip.
pub struct ExpenseLedger<S> {
    store: Arc<S>,
    validator: SplitValidator,
}

impl<S: ExpenseStore> ExpenseLedger<S> {
    /// Creates a ledger over `store`.
    #[must_use]
    pub const fn new(store: Arc<S>, validator: SplitValidator) -> Self {
        Self { store, validator }
    }

    /// The backing store.
    #[must_use]
    pub const fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Registers a new member on a trip.
    ///
    /// # Errors
    ///
    /// Returns `EmptyDisplayName` for a blank name, or a storage error.
    pub fn add_member(&self, trip_id: TripId, display_name: &str) -> Result<TripMember, LedgerError> {
        let display_name = display_name.trim();
        if display_name.is_empty() {
            return Err(LedgerError::EmptyDisplayName);
        }

        let member = TripMember::new(trip_id, display_name);
        self.store.insert_member(member.clone())?;
        info!(trip_id = %trip_id, member_id = %member.id, "Member joined trip");
        Ok(member)
    }

    /// Members of a trip in join order.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the store fails.
    pub fn members(&self, trip_id: TripId) -> Result<Vec<TripMember>, LedgerError> {
        Ok(self.store.list_members(trip_id)?)
    }

    /// Validates and appends a new expense.
    ///
    /// The payer's own split is stored as already paid. A residue accepted
    /// within tolerance is absorbed into the payer's split so the stored sum
    /// is exact.
    ///
    /// # Errors
    ///
    /// Returns a validation error for bad input, a reference error if a
    /// split member or the payer is not part of the trip, or a storage error.
    pub fn record(&self, input: NewExpense) -> Result<ExpenseId, LedgerError> {
        let record = self.prepare(input, Utc::now())?;
        let (trip_id, total, currency) = (record.trip_id, record.total_amount, record.currency);

        let id = self.store.insert_expense(record)?;
        info!(
            expense_id = %id,
            trip_id = %trip_id,
            total_amount = total,
            currency = %currency,
            "Expense recorded"
        );
        Ok(id)
    }

    /// Expenses of a trip in insertion order.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the store fails.
    pub fn list(&self, trip_id: TripId) -> Result<Vec<Expense>, LedgerError> {
        Ok(self.store.fetch_expenses(trip_id)?)
    }

    /// Fetches one expense.
    ///
    /// # Errors
    ///
    /// Returns `ExpenseNotFound` if no such expense exists.
    pub fn get(&self, expense_id: ExpenseId) -> Result<Expense, LedgerError> {
        self.store
            .fetch_expense(expense_id)?
            .ok_or(LedgerError::ExpenseNotFound(expense_id))
    }

    /// Appends an adjustment that cancels `expense_id`.
    ///
    /// The adjustment carries the negated total and negated splits, all
    /// marked paid, so it is settled on creation.
    ///
    /// # Errors
    ///
    /// Returns `EmptyReason`, `ExpenseNotFound`, `CannotReverseAdjustment`
    /// or `AlreadyReversed`.
    pub fn reverse(&self, expense_id: ExpenseId, reason: &str) -> Result<ExpenseId, LedgerError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(LedgerError::EmptyReason);
        }

        let original = self.reversible(expense_id)?;
        let adjustment = Self::mirror(&original, reason, Utc::now());

        let id = self.store.insert_adjustment(adjustment)?;
        info!(
            adjustment_id = %id,
            expense_id = %expense_id,
            trip_id = %original.trip_id,
            reason,
            "Expense reversed"
        );
        Ok(id)
    }

    /// Replaces an expense: reverses the original, then records `replacement`.
    ///
    /// The replacement is validated before anything is written, so a bad
    /// replacement leaves the original untouched. It is always recorded on the
    /// original's trip.
    ///
    /// # Errors
    ///
    /// Returns any error of [`ExpenseLedger::reverse`] or [`ExpenseLedger::record`].
    pub fn amend(
        &self,
        expense_id: ExpenseId,
        reason: &str,
        mut replacement: NewExpense,
    ) -> Result<Amendment, LedgerError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(LedgerError::EmptyReason);
        }

        let original = self.reversible(expense_id)?;
        replacement.trip_id = original.trip_id;
        let now = Utc::now();
        let record = self.prepare(replacement, now)?;

        let adjustment_id = self
            .store
            .insert_adjustment(Self::mirror(&original, reason, now))?;
        let replacement_id = self.store.insert_expense(record)?;

        info!(
            expense_id = %expense_id,
            adjustment_id = %adjustment_id,
            replacement_id = %replacement_id,
            "Expense amended"
        );
        Ok(Amendment {
            adjustment_id,
            replacement_id,
        })
    }

    /// Validates a draft and builds the record to insert.
    fn prepare(&self, input: NewExpense, recorded_at: DateTime<Utc>) -> Result<ExpenseRecord, LedgerError> {
        let title = input.title.trim();
        if title.is_empty() {
            return Err(LedgerError::EmptyTitle);
        }

        let members: HashSet<MemberId> = self
            .store
            .list_members(input.trip_id)?
            .into_iter()
            .map(|m| m.id)
            .collect();

        self.validator.validate(
            input.trip_id,
            input.total_amount,
            &input.splits,
            |member_id| members.contains(&member_id),
        )?;
        if !members.contains(&input.payer_id) {
            return Err(LedgerError::PayerNotInTrip {
                payer_id: input.payer_id,
                trip_id: input.trip_id,
            });
        }

        let splits = SplitValidator::reconcile(input.total_amount, input.payer_id, input.splits);
        if self.validator.tolerance() > 0 {
            debug!(trip_id = %input.trip_id, "Split residue reconciled");
        }

        let splits: Vec<Split> = splits
            .into_iter()
            .map(|SplitInput { member_id, owed_amount }| {
                // The payer's share and zero shares have nothing to repay.
                let is_paid = member_id == input.payer_id || owed_amount == 0;
                Split {
                    member_id,
                    owed_amount,
                    is_paid,
                    paid_at: is_paid.then_some(recorded_at),
                }
            })
            .collect();
        let is_settled = splits.iter().all(|s| s.is_paid);

        Ok(ExpenseRecord {
            trip_id: input.trip_id,
            title: title.to_string(),
            total_amount: input.total_amount,
            currency: input.currency,
            payer_id: input.payer_id,
            occurred_at: input.occurred_at.unwrap_or(recorded_at),
            category: input.category,
            splits,
            is_settled,
            kind: ExpenseKind::Expense,
            recorded_at,
        })
    }

    /// Loads an expense and checks it can still be reversed.
    fn reversible(&self, expense_id: ExpenseId) -> Result<Expense, LedgerError> {
        let original = self.get(expense_id)?;
        if !original.kind.is_expense() {
            return Err(LedgerError::CannotReverseAdjustment(expense_id));
        }

        let already_reversed = self
            .store
            .fetch_expenses(original.trip_id)?
            .iter()
            .any(|e| e.kind.supersedes() == Some(expense_id));
        if already_reversed {
            return Err(LedgerError::AlreadyReversed(expense_id));
        }

        Ok(original)
    }

    /// Builds the negated, settled copy of `original`.
    fn mirror(original: &Expense, reason: &str, recorded_at: DateTime<Utc>) -> ExpenseRecord {
        let splits = original
            .splits
            .iter()
            .map(|s| Split {
                member_id: s.member_id,
                owed_amount: -s.owed_amount,
                is_paid: true,
                paid_at: Some(recorded_at),
            })
            .collect();

        ExpenseRecord {
            trip_id: original.trip_id,
            title: format!("Reversal of {}: {reason}", original.title),
            total_amount: -original.total_amount,
            currency: original.currency,
            payer_id: original.payer_id,
            occurred_at: recorded_at,
            category: original.category,
            splits,
            is_settled: true,
            kind: ExpenseKind::Adjustment {
                supersedes: original.id,
            },
            recorded_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::memory::InMemoryExpenseStore;
    use crate::ledger::types::{ExpenseCategory, ExpenseStatus};
    use tripsplit_shared::types::Currency;

    struct Fixture {
        ledger: ExpenseLedger<InMemoryExpenseStore>,
        trip_id: TripId,
        a: MemberId,
        b: MemberId,
        c: MemberId,
    }

    fn setup(tolerance: i64) -> Fixture {
        let store = Arc::new(InMemoryExpenseStore::new());
        let ledger = ExpenseLedger::new(store, SplitValidator::new(tolerance));
        let trip_id = TripId::new();
        let a = ledger.add_member(trip_id, "Asha").unwrap().id;
        let b = ledger.add_member(trip_id, "Bilal").unwrap().id;
        let c = ledger.add_member(trip_id, "Chen").unwrap().id;
        Fixture {
            ledger,
            trip_id,
            a,
            b,
            c,
        }
    }

    fn dinner(f: &Fixture, splits: Vec<SplitInput>) -> NewExpense {
        NewExpense {
            trip_id: f.trip_id,
            title: "Dinner".to_string(),
            total_amount: 30_000,
            currency: Currency::Inr,
            payer_id: f.a,
            occurred_at: None,
            category: ExpenseCategory::Food,
            splits,
        }
    }

    fn equal_thirds(f: &Fixture) -> Vec<SplitInput> {
        vec![
            SplitInput::new(f.a, 10_000),
            SplitInput::new(f.b, 10_000),
            SplitInput::new(f.c, 10_000),
        ]
    }

    #[test]
    fn test_record_marks_payer_split_paid() {
        let f = setup(0);
        let id = f.ledger.record(dinner(&f, equal_thirds(&f))).unwrap();

        let expense = f.ledger.get(id).unwrap();
        assert!(expense.split_for(f.a).unwrap().is_paid);
        assert_eq!(expense.split_for(f.a).unwrap().paid_at, Some(expense.recorded_at));
        assert!(!expense.split_for(f.b).unwrap().is_paid);
        assert!(!expense.is_settled);
        assert_eq!(expense.status(), ExpenseStatus::Recorded);
        assert_eq!(expense.occurred_at, expense.recorded_at);
    }

    #[test]
    fn test_record_payer_only_expense_is_settled() {
        let f = setup(0);
        let id = f
            .ledger
            .record(dinner(&f, vec![SplitInput::new(f.a, 30_000)]))
            .unwrap();
        assert!(f.ledger.get(id).unwrap().is_settled);
    }

    #[test]
    fn test_record_rejects_blank_title() {
        let f = setup(0);
        let mut input = dinner(&f, equal_thirds(&f));
        input.title = "   ".to_string();
        assert!(matches!(f.ledger.record(input), Err(LedgerError::EmptyTitle)));
    }

    #[test]
    fn test_record_rejects_sum_mismatch() {
        let f = setup(0);
        let result = f.ledger.record(dinner(
            &f,
            vec![SplitInput::new(f.a, 10_000), SplitInput::new(f.b, 9_900)],
        ));
        assert!(matches!(
            result,
            Err(LedgerError::SplitSumMismatch {
                total: 30_000,
                allocated: 19_900
            })
        ));
        assert!(f.ledger.list(f.trip_id).unwrap().is_empty());
    }

    #[test]
    fn test_record_rejects_outsider_split() {
        let f = setup(0);
        let outsider = MemberId::new();
        let result = f.ledger.record(dinner(
            &f,
            vec![SplitInput::new(f.a, 20_000), SplitInput::new(outsider, 10_000)],
        ));
        assert!(matches!(
            result,
            Err(LedgerError::MemberNotInTrip { member_id, .. }) if member_id == outsider
        ));
    }

    #[test]
    fn test_record_rejects_member_of_other_trip() {
        let f = setup(0);
        let elsewhere = f.ledger.add_member(TripId::new(), "Dana").unwrap().id;
        let result = f.ledger.record(dinner(
            &f,
            vec![SplitInput::new(f.a, 20_000), SplitInput::new(elsewhere, 10_000)],
        ));
        assert!(matches!(result, Err(LedgerError::MemberNotInTrip { .. })));
    }

    #[test]
    fn test_record_rejects_outsider_payer() {
        let f = setup(0);
        let mut input = dinner(&f, vec![SplitInput::new(f.b, 30_000)]);
        input.payer_id = MemberId::new();
        assert!(matches!(
            f.ledger.record(input),
            Err(LedgerError::PayerNotInTrip { .. })
        ));
    }

    #[test]
    fn test_record_absorbs_residue_within_tolerance() {
        let f = setup(2);
        let id = f
            .ledger
            .record(dinner(
                &f,
                vec![
                    SplitInput::new(f.b, 10_000),
                    SplitInput::new(f.c, 10_000),
                    SplitInput::new(f.a, 9_999),
                ],
            ))
            .unwrap();

        let expense = f.ledger.get(id).unwrap();
        assert_eq!(expense.split_for(f.a).unwrap().owed_amount, 10_000);
        assert_eq!(expense.splits.iter().map(|s| s.owed_amount).sum::<i64>(), 30_000);
    }

    #[test]
    fn test_list_in_insertion_order() {
        let f = setup(0);
        let first = f.ledger.record(dinner(&f, equal_thirds(&f))).unwrap();
        let second = f.ledger.record(dinner(&f, equal_thirds(&f))).unwrap();
        let ids: Vec<_> = f.ledger.list(f.trip_id).unwrap().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![first, second]);
    }

    #[test]
    fn test_get_unknown_expense() {
        let f = setup(0);
        let id = ExpenseId::new();
        assert!(matches!(f.ledger.get(id), Err(LedgerError::ExpenseNotFound(e)) if e == id));
    }

    #[test]
    fn test_add_member_rejects_blank_name() {
        let f = setup(0);
        assert!(matches!(
            f.ledger.add_member(f.trip_id, " "),
            Err(LedgerError::EmptyDisplayName)
        ));
        assert_eq!(f.ledger.members(f.trip_id).unwrap().len(), 3);
    }

    #[test]
    fn test_reverse_appends_negated_adjustment() {
        let f = setup(0);
        let id = f.ledger.record(dinner(&f, equal_thirds(&f))).unwrap();

        let adjustment_id = f.ledger.reverse(id, "entered twice").unwrap();
        let adjustment = f.ledger.get(adjustment_id).unwrap();

        assert_eq!(adjustment.kind, ExpenseKind::Adjustment { supersedes: id });
        assert_eq!(adjustment.total_amount, -30_000);
        assert!(adjustment.is_settled);
        assert!(adjustment.splits.iter().all(|s| s.is_paid && s.owed_amount == -10_000));
        assert_eq!(adjustment.title, "Reversal of Dinner: entered twice");
        assert_eq!(f.ledger.list(f.trip_id).unwrap().len(), 2);
    }

    #[test]
    fn test_reverse_rules() {
        let f = setup(0);
        let id = f.ledger.record(dinner(&f, equal_thirds(&f))).unwrap();

        assert!(matches!(f.ledger.reverse(id, ""), Err(LedgerError::EmptyReason)));

        let adjustment_id = f.ledger.reverse(id, "typo").unwrap();
        assert!(matches!(
            f.ledger.reverse(id, "again"),
            Err(LedgerError::AlreadyReversed(_))
        ));
        assert!(matches!(
            f.ledger.reverse(adjustment_id, "undo"),
            Err(LedgerError::CannotReverseAdjustment(_))
        ));
        assert!(matches!(
            f.ledger.reverse(ExpenseId::new(), "missing"),
            Err(LedgerError::ExpenseNotFound(_))
        ));
    }

    #[test]
    fn test_amend_reverses_and_records_replacement() {
        let f = setup(0);
        let id = f.ledger.record(dinner(&f, equal_thirds(&f))).unwrap();

        let mut replacement = dinner(&f, vec![SplitInput::new(f.a, 15_000), SplitInput::new(f.b, 15_000)]);
        replacement.trip_id = TripId::new();
        let amendment = f.ledger.amend(id, "Chen skipped dinner", replacement).unwrap();

        let expenses = f.ledger.list(f.trip_id).unwrap();
        assert_eq!(expenses.len(), 3);
        assert_eq!(expenses[1].id, amendment.adjustment_id);
        assert_eq!(expenses[2].id, amendment.replacement_id);
        assert_eq!(expenses[2].trip_id, f.trip_id);
    }

    #[test]
    fn test_amend_with_invalid_replacement_writes_nothing() {
        let f = setup(0);
        let id = f.ledger.record(dinner(&f, equal_thirds(&f))).unwrap();

        let replacement = dinner(&f, vec![SplitInput::new(f.a, 1)]);
        assert!(matches!(
            f.ledger.amend(id, "fix", replacement),
            Err(LedgerError::SplitSumMismatch { .. })
        ));
        assert_eq!(f.ledger.list(f.trip_id).unwrap().len(), 1);
        assert!(f.ledger.reverse(id, "still reversible").is_ok());
    }
}
