//! Property-based tests for balance calculation.
//!
//! - Zero-sum: per currency, nets always sum to zero
//! - Paying every split leaves every member at zero
//! - Net is always `total_paid - total_owed`

use chrono::Utc;
use proptest::prelude::*;
use tripsplit_shared::types::{Currency, ExpenseId, TripId};

use super::calculator::BalanceCalculator;
use crate::ledger::allocation::AllocationUtil;
use crate::ledger::types::{Expense, ExpenseCategory, ExpenseKind, ExpenseRecord, Split, TripMember};

/// Raw material for one expense: total, payer index, participant mask, paid mask, currency.
type ExpenseSeed = (i64, usize, u8, u8, Currency);

fn currency() -> impl Strategy<Value = Currency> {
    prop_oneof![Just(Currency::Inr), Just(Currency::Usd), Just(Currency::Jpy)]
}

fn seeds() -> impl Strategy<Value = Vec<ExpenseSeed>> {
    prop::collection::vec(
        (1i64..1_000_000i64, 0usize..6, 1u8..=u8::MAX, any::<u8>(), currency()),
        0..20,
    )
}

/// Builds expenses over `members` from seeds; `pay_all` marks every split paid.
fn build(members: &[TripMember], seeds: &[ExpenseSeed], pay_all: bool) -> Vec<Expense> {
    let now = Utc::now();
    seeds
        .iter()
        .map(|(total, payer, participants, paid, currency)| {
            let payer_id = members[payer % members.len()].id;
            let mut sharing: Vec<_> = members
                .iter()
                .enumerate()
                .filter(|(i, _)| participants & (1 << i) != 0)
                .map(|(_, m)| m.id)
                .collect();
            if sharing.is_empty() {
                sharing.push(payer_id);
            }
            let amounts = AllocationUtil::allocate_equal(*total, sharing.len());
            let splits = sharing
                .iter()
                .zip(amounts)
                .enumerate()
                .map(|(i, (member_id, owed_amount))| Split {
                    member_id: *member_id,
                    owed_amount,
                    is_paid: pay_all || *member_id == payer_id || paid & (1 << i) != 0,
                    paid_at: None,
                })
                .collect();

            ExpenseRecord {
                trip_id: members[0].trip_id,
                title: "Seeded".to_string(),
                total_amount: *total,
                currency: *currency,
                payer_id,
                occurred_at: now,
                category: ExpenseCategory::Other,
                splits,
                is_settled: false,
                kind: ExpenseKind::Expense,
                recorded_at: now,
            }
            .into_expense(ExpenseId::new())
        })
        .collect()
}

fn members(count: usize) -> Vec<TripMember> {
    let trip_id = TripId::new();
    (0..count).map(|i| TripMember::new(trip_id, format!("T{i}"))).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Nets sum to zero per currency, whatever the paid flags are.
    #[test]
    fn prop_balances_are_zero_sum(count in 1usize..7, seeds in seeds()) {
        let members = members(count);
        let expenses = build(&members, &seeds, false);

        let balances = BalanceCalculator::compute(&members, &expenses, Currency::Inr).unwrap();

        for total in BalanceCalculator::net_totals(&balances).values() {
            prop_assert_eq!(*total, 0);
        }
        for balance in &balances {
            prop_assert_eq!(balance.net, balance.total_paid - balance.total_owed);
        }
    }

    /// Once every split is paid, every member nets to zero.
    #[test]
    fn prop_fully_paid_ledger_is_flat(count in 1usize..7, seeds in seeds()) {
        let members = members(count);
        let expenses = build(&members, &seeds, true);

        let balances = BalanceCalculator::compute(&members, &expenses, Currency::Inr).unwrap();

        prop_assert!(balances.iter().all(|b| b.net == 0));
    }

    /// Every member has a row for every currency present.
    #[test]
    fn prop_rows_per_member_and_currency(count in 1usize..7, seeds in seeds()) {
        let members = members(count);
        let expenses = build(&members, &seeds, false);

        let balances = BalanceCalculator::compute(&members, &expenses, Currency::Inr).unwrap();

        let currencies = BalanceCalculator::net_totals(&balances).len().max(1);
        prop_assert_eq!(balances.len(), currencies * count);
    }
}
