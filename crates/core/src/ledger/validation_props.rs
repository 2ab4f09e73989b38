//! Property-based tests for split validation and split strategies.
//!
//! - Split-sum invariant for every strategy
//! - Tolerance boundary
//! - Reconciliation always yields an exact sum

use proptest::prelude::*;
use rust_decimal::Decimal;
use tripsplit_shared::types::{MemberId, MinorUnits, TripId};

use super::allocation::SplitStrategy;
use super::error::LedgerError;
use super::types::SplitInput;
use super::validation::SplitValidator;

/// Strategy to generate a positive total (0.01 to 1,000,000.00).
fn positive_total() -> impl Strategy<Value = MinorUnits> {
    1i64..100_000_000i64
}

/// Strategy to generate a list of distinct members.
fn members(max: usize) -> impl Strategy<Value = Vec<MemberId>> {
    (1..=max).prop_map(|n| (0..n).map(|_| MemberId::new()).collect())
}

/// Strategy to generate whole percentages summing to 100.
fn percentages() -> impl Strategy<Value = Vec<Decimal>> {
    prop::collection::vec(0u32..=100u32, 1..8).prop_map(|weights| {
        let sum: u32 = weights.iter().sum();
        let mut result: Vec<Decimal> = if sum == 0 {
            weights.iter().map(|_| Decimal::ZERO).collect()
        } else {
            weights
                .iter()
                .map(|w| Decimal::from(w * 100 / sum))
                .collect()
        };
        let assigned: Decimal = result.iter().copied().sum();
        result[0] += Decimal::ONE_HUNDRED - assigned;
        result
    })
}

fn sum(splits: &[SplitInput]) -> MinorUnits {
    splits.iter().map(|s| s.owed_amount).sum()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Equal splits always sum to the total and differ by at most one unit.
    #[test]
    fn prop_equal_split_sums_exactly(total in positive_total(), members in members(12)) {
        let splits = SplitStrategy::Equal { members }.into_splits(total).unwrap();

        prop_assert_eq!(sum(&splits), total);
        let max = splits.iter().map(|s| s.owed_amount).max().unwrap();
        let min = splits.iter().map(|s| s.owed_amount).min().unwrap();
        prop_assert!(max - min <= 1);
        prop_assert!(SplitValidator::exact()
            .validate(TripId::new(), total, &splits, |_| true)
            .is_ok());
    }

    /// Percentage splits always sum to the total and never go negative.
    #[test]
    fn prop_percentage_split_sums_exactly(total in positive_total(), pcts in percentages()) {
        let shares = pcts.into_iter().map(|p| (MemberId::new(), p)).collect();
        let splits = SplitStrategy::Percentage { shares }.into_splits(total).unwrap();

        prop_assert_eq!(sum(&splits), total);
        prop_assert!(splits.iter().all(|s| s.owed_amount >= 0));
    }

    /// A gap larger than the tolerance is rejected; a gap within it is accepted.
    #[test]
    fn prop_tolerance_boundary(
        total in 1_000i64..1_000_000i64,
        tolerance in 0i64..50i64,
        gap in -100i64..100i64,
    ) {
        let splits = [SplitInput::new(MemberId::new(), total + gap)];
        let result = SplitValidator::new(tolerance).validate(TripId::new(), total, &splits, |_| true);

        if gap.abs() <= tolerance {
            prop_assert!(result.is_ok());
        } else {
            let is_mismatch = matches!(result, Err(LedgerError::SplitSumMismatch { .. }));
            prop_assert!(is_mismatch);
        }
    }

    /// Reconciling an accepted split always yields the exact total with no negative share.
    #[test]
    fn prop_reconcile_is_exact(
        shares in prop::collection::vec(0i64..10_000i64, 1..8),
        gap in -20i64..20i64,
        payer_index in 0usize..8,
    ) {
        let splits: Vec<SplitInput> = shares
            .iter()
            .map(|amount| SplitInput::new(MemberId::new(), *amount))
            .collect();
        let allocated = sum(&splits);
        let total = allocated + gap;
        prop_assume!(total > 0);
        let payer = splits.get(payer_index).map_or_else(MemberId::new, |s| s.member_id);

        let reconciled = SplitValidator::reconcile(total, payer, splits);

        prop_assert_eq!(sum(&reconciled), total);
        prop_assert!(reconciled.iter().all(|s| s.owed_amount >= 0));
    }
}
