//! Split validation rules.
//!
//! Pure functions only: given a total, a proposed split set and a membership
//! predicate, decide whether the split is acceptable.

use std::collections::HashSet;

use tripsplit_shared::types::{MemberId, MinorUnits, TripId};

use super::error::LedgerError;
use super::types::SplitInput;

/// Validates proposed expense splits against their total.
#[derive(Debug, Clone, Copy, Default)]
pub struct SplitValidator {
    tolerance: MinorUnits,
}

impl SplitValidator {
    /// Creates a validator that accepts a sum gap of up to `tolerance` minor units.
    #[must_use]
    pub const fn new(tolerance: MinorUnits) -> Self {
        Self { tolerance }
    }

    /// Creates a validator that requires an exact sum.
    #[must_use]
    pub const fn exact() -> Self {
        Self::new(0)
    }

    /// The accepted sum gap in minor units.
    #[must_use]
    pub const fn tolerance(&self) -> MinorUnits {
        self.tolerance
    }

    /// Validate a split set.
    ///
    /// Checks, in order:
    /// 1. At least one split
    /// 2. Positive total
    /// 3. No negative shares, no duplicate members
    /// 4. Every member belongs to the trip (`is_member`)
    /// 5. Shares sum to the total within tolerance
    ///
    /// # Errors
    ///
    /// Returns the first rule violated.
    pub fn validate<M>(
        &self,
        trip_id: TripId,
        total_amount: MinorUnits,
        splits: &[SplitInput],
        is_member: M,
    ) -> Result<(), LedgerError>
    where
        M: Fn(MemberId) -> bool,
    {
        if splits.is_empty() {
            return Err(LedgerError::EmptySplits);
        }
        if total_amount <= 0 {
            return Err(LedgerError::NonPositiveTotal(total_amount));
        }

        let mut seen = HashSet::with_capacity(splits.len());
        for split in splits {
            if split.owed_amount < 0 {
                return Err(LedgerError::NegativeShare {
                    member_id: split.member_id,
                    amount: split.owed_amount,
                });
            }
            if !seen.insert(split.member_id) {
                return Err(LedgerError::DuplicateSplitMember(split.member_id));
            }
            if !is_member(split.member_id) {
                return Err(LedgerError::MemberNotInTrip {
                    member_id: split.member_id,
                    trip_id,
                });
            }
        }

        let allocated = sum_shares(total_amount, splits)?;
        if (allocated - total_amount).abs() > self.tolerance {
            return Err(LedgerError::SplitSumMismatch {
                total: total_amount,
                allocated,
            });
        }

        Ok(())
    }

    /// Absorbs a within-tolerance rounding gap so the shares sum exactly.
    ///
    /// The residue goes to the payer's share if present, otherwise the first
    /// share. Call only after [`SplitValidator::validate`] succeeded.
    #[must_use]
    pub fn reconcile(
        total_amount: MinorUnits,
        payer_id: MemberId,
        mut splits: Vec<SplitInput>,
    ) -> Vec<SplitInput> {
        let allocated: MinorUnits = splits.iter().map(|s| s.owed_amount).sum();
        let mut residue = total_amount - allocated;
        if residue == 0 || splits.is_empty() {
            return splits;
        }

        let target = splits
            .iter()
            .position(|s| s.member_id == payer_id)
            .unwrap_or(0);
        if residue > 0 {
            splits[target].owed_amount += residue;
            return splits;
        }

        // Over-allocated: trim the target first, then the others in order,
        // never taking a share below zero.
        let order = std::iter::once(target).chain((0..splits.len()).filter(|i| *i != target));
        for index in order {
            if residue == 0 {
                break;
            }
            let take = splits[index].owed_amount.min(-residue);
            splits[index].owed_amount -= take;
            residue += take;
        }
        splits
    }
}

fn sum_shares(total: MinorUnits, splits: &[SplitInput]) -> Result<MinorUnits, LedgerError> {
    splits
        .iter()
        .try_fold(0_i64, |acc, s| acc.checked_add(s.owed_amount))
        .ok_or(LedgerError::SplitSumMismatch {
            total,
            allocated: MinorUnits::MAX,
        })
}
