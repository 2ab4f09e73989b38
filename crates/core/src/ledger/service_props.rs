//! Property-based tests for the expense ledger service.
//!
//! - Stored splits always sum exactly to the stored total
//! - The payer's own split is never an open obligation
//! - A reversal mirrors the original exactly

use std::sync::Arc;

use proptest::prelude::*;
use tripsplit_shared::types::{Currency, MinorUnits, TripId};

use super::allocation::SplitStrategy;
use super::memory::InMemoryExpenseStore;
use super::service::ExpenseLedger;
use super::types::{ExpenseCategory, ExpenseKind, NewExpense};
use super::validation::SplitValidator;

/// Strategy to generate a positive total (0.01 to 100,000.00).
fn positive_total() -> impl Strategy<Value = MinorUnits> {
    1i64..10_000_000i64
}

/// Strategy to generate a currency.
fn currency() -> impl Strategy<Value = Currency> {
    prop_oneof![
        Just(Currency::Inr),
        Just(Currency::Usd),
        Just(Currency::Eur),
        Just(Currency::Jpy),
    ]
}

fn ledger_with_members(count: usize) -> (ExpenseLedger<InMemoryExpenseStore>, TripId, Vec<super::types::TripMember>) {
    let ledger = ExpenseLedger::new(Arc::new(InMemoryExpenseStore::new()), SplitValidator::exact());
    let trip_id = TripId::new();
    let members = (0..count)
        .map(|i| ledger.add_member(trip_id, &format!("Traveler {i}")).unwrap())
        .collect();
    (ledger, trip_id, members)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Recorded expenses sum exactly and leave only non-payer shares open.
    #[test]
    fn prop_recorded_expense_is_exact(
        total in positive_total(),
        currency in currency(),
        member_count in 1usize..8,
        payer_index in 0usize..8,
    ) {
        let (ledger, trip_id, members) = ledger_with_members(member_count);
        let payer = &members[payer_index % member_count];
        let splits = SplitStrategy::Equal {
            members: members.iter().map(|m| m.id).collect(),
        }
        .into_splits(total)
        .unwrap();

        let id = ledger
            .record(NewExpense {
                trip_id,
                title: "Groceries".to_string(),
                total_amount: total,
                currency,
                payer_id: payer.id,
                occurred_at: None,
                category: ExpenseCategory::Food,
                splits,
            })
            .unwrap();
        let expense = ledger.get(id).unwrap();

        prop_assert_eq!(expense.splits.iter().map(|s| s.owed_amount).sum::<i64>(), total);
        prop_assert!(expense.split_for(payer.id).unwrap().is_paid);
        for split in expense.obligations() {
            prop_assert_eq!(split.is_paid, split.owed_amount == 0);
        }
    }

    /// A reversal negates the total and every split of the original.
    #[test]
    fn prop_reversal_mirrors_original(
        total in positive_total(),
        member_count in 1usize..6,
    ) {
        let (ledger, trip_id, members) = ledger_with_members(member_count);
        let splits = SplitStrategy::Equal {
            members: members.iter().map(|m| m.id).collect(),
        }
        .into_splits(total)
        .unwrap();
        let id = ledger
            .record(NewExpense {
                trip_id,
                title: "Ferry".to_string(),
                total_amount: total,
                currency: Currency::Usd,
                payer_id: members[0].id,
                occurred_at: None,
                category: ExpenseCategory::Transport,
                splits,
            })
            .unwrap();

        let adjustment = ledger.get(ledger.reverse(id, "duplicate").unwrap()).unwrap();
        let original = ledger.get(id).unwrap();

        prop_assert_eq!(adjustment.kind, ExpenseKind::Adjustment { supersedes: id });
        prop_assert_eq!(adjustment.total_amount, -original.total_amount);
        for (mirrored, split) in adjustment.splits.iter().zip(&original.splits) {
            prop_assert_eq!(mirrored.member_id, split.member_id);
            prop_assert_eq!(mirrored.owed_amount, -split.owed_amount);
        }
    }
}
