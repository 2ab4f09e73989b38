//! Split strategies: shaping caller input into exact per-member shares.
//!
//! Every strategy guarantees the shares sum EXACTLY to the total:
//! 1. Compute each member's share rounded down to a whole minor unit
//! 2. Compute the remainder (total - sum of rounded shares)
//! 3. Hand out remainder units one at a time, starting with the first member
//!
//! These are input helpers, not validation. The result still goes through
//! [`super::validation::SplitValidator`] when recorded.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use tripsplit_shared::types::{MemberId, MinorUnits};

use super::error::LedgerError;
use super::types::SplitInput;

/// How an expense total is divided among members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum SplitStrategy {
    /// Divide evenly; the first `total % n` members pay one extra unit.
    Equal {
        /// Members sharing the expense, in remainder priority order.
        members: Vec<MemberId>,
    },
    /// Caller supplies every amount.
    Exact {
        /// Member and amount owed in minor units.
        shares: Vec<(MemberId, MinorUnits)>,
    },
    /// Caller supplies percentages summing to 100.
    Percentage {
        /// Member and percentage of the total.
        shares: Vec<(MemberId, Decimal)>,
    },
}

impl SplitStrategy {
    /// Converts the strategy into concrete split inputs for `total`.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no members, the total is not positive,
    /// or the percentages are invalid.
    pub fn into_splits(self, total: MinorUnits) -> Result<Vec<SplitInput>, LedgerError> {
        match self {
            Self::Equal { members } => {
                if members.is_empty() {
                    return Err(LedgerError::EmptySplits);
                }
                ensure_positive(total)?;
                let amounts = AllocationUtil::allocate_equal(total, members.len());
                Ok(members
                    .into_iter()
                    .zip(amounts)
                    .map(|(member_id, amount)| SplitInput::new(member_id, amount))
                    .collect())
            }
            Self::Exact { shares } => Ok(shares
                .into_iter()
                .map(|(member_id, amount)| SplitInput::new(member_id, amount))
                .collect()),
            Self::Percentage { shares } => {
                if shares.is_empty() {
                    return Err(LedgerError::EmptySplits);
                }
                ensure_positive(total)?;
                let percentages: Vec<Decimal> = shares.iter().map(|(_, p)| *p).collect();
                validate_percentages(&percentages)?;
                let amounts = AllocationUtil::allocate_by_percentages(total, &percentages);
                Ok(shares
                    .into_iter()
                    .zip(amounts)
                    .map(|((member_id, _), amount)| SplitInput::new(member_id, amount))
                    .collect())
            }
        }
    }
}

fn ensure_positive(total: MinorUnits) -> Result<(), LedgerError> {
    if total <= 0 {
        return Err(LedgerError::NonPositiveTotal(total));
    }
    Ok(())
}

fn validate_percentages(percentages: &[Decimal]) -> Result<(), LedgerError> {
    if let Some(negative) = percentages.iter().find(|p| p.is_sign_negative() && !p.is_zero()) {
        return Err(LedgerError::InvalidPercentages(format!(
            "percentage {negative} is negative"
        )));
    }
    let sum: Decimal = percentages.iter().copied().sum();
    if sum != Decimal::ONE_HUNDRED {
        return Err(LedgerError::InvalidPercentages(format!(
            "percentages sum to {sum}, expected 100"
        )));
    }
    Ok(())
}

/// Allocation utility for distributing minor-unit amounts.
///
/// Ensures:
/// - Sum of allocations EXACTLY equals the original total
/// - No paise are lost or gained
/// - Remainder units go to the earliest members
pub struct AllocationUtil;

impl AllocationUtil {
    /// Allocate `total` equally across `count` members.
    ///
    /// # Example
    ///
    /// ```
    /// use tripsplit_core::ledger::AllocationUtil;
    ///
    /// // 100 / 3 = [34, 33, 33]
    /// let result = AllocationUtil::allocate_equal(100, 3);
    /// assert_eq!(result, vec![34, 33, 33]);
    /// ```
    #[must_use]
    pub fn allocate_equal(total: MinorUnits, count: usize) -> Vec<MinorUnits> {
        let Ok(divisor) = i64::try_from(count) else {
            return vec![];
        };
        if divisor == 0 {
            return vec![];
        }

        let base = total.div_euclid(divisor);
        let remainder = total.rem_euclid(divisor);

        (0..divisor)
            .map(|i| if i < remainder { base + 1 } else { base })
            .collect()
    }

    /// Allocate `total` by percentages that sum to 100.
    ///
    /// Each share is rounded down; leftover units go to the first members
    /// with a positive percentage.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use tripsplit_core::ledger::AllocationUtil;
    ///
    /// let result = AllocationUtil::allocate_by_percentages(1_000, &[dec!(50), dec!(30), dec!(20)]);
    /// assert_eq!(result, vec![500, 300, 200]);
    /// ```
    #[must_use]
    pub fn allocate_by_percentages(total: MinorUnits, percentages: &[Decimal]) -> Vec<MinorUnits> {
        if percentages.is_empty() {
            return vec![];
        }

        let total_dec = Decimal::from(total);
        let mut allocated: Vec<MinorUnits> = percentages
            .iter()
            .map(|p| {
                (total_dec * *p / Decimal::ONE_HUNDRED)
                    .floor()
                    .to_i64()
                    .unwrap_or_default()
            })
            .collect();

        let remainder = total - allocated.iter().sum::<MinorUnits>();
        let recipients: Vec<usize> = percentages
            .iter()
            .enumerate()
            .filter(|(_, p)| **p > Decimal::ZERO)
            .map(|(i, _)| i)
            .collect();

        if remainder > 0 && !recipients.is_empty() {
            let units = usize::try_from(remainder).unwrap_or_default();
            for idx in recipients.iter().cycle().take(units) {
                allocated[*idx] += 1;
            }
        }

        allocated
    }
}
