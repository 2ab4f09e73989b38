//! Single-currency view of per-currency balances.
//!
//! Informational only: rounding per row means unified nets need not sum to
//! zero, and nothing settles against them.

use serde::{Deserialize, Serialize};
use tripsplit_shared::types::{Currency, MemberId, MinorUnits};

use super::conversion::convert_minor;
use super::exchange::FxRateProvider;
use crate::balance::Balance;
use crate::ledger::error::LedgerError;

/// A member's net position expressed in one target currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnifiedBalance {
    /// The member.
    pub member_id: MemberId,
    /// The target currency.
    pub currency: Currency,
    /// Sum of converted nets.
    pub net: MinorUnits,
}

/// Converts every balance row into `target` and sums per member.
///
/// Members keep their first-seen order from `balances`.
///
/// # Errors
///
/// Returns `NoExchangeRate` if any currency present has no rate to `target`,
/// `AmountOutOfRange` if a conversion overflows, or `BalanceOverflow` if a
/// member's summed net does.
pub fn unify_balances<F>(
    balances: &[Balance],
    target: Currency,
    fx: &F,
) -> Result<Vec<UnifiedBalance>, LedgerError>
where
    F: FxRateProvider + ?Sized,
{
    let mut unified: Vec<UnifiedBalance> = Vec::new();

    for balance in balances {
        let rate = fx
            .rate(balance.currency, target)
            .ok_or(LedgerError::NoExchangeRate {
                from: balance.currency,
                to: target,
            })?;
        let converted = convert_minor(balance.net, balance.currency, target, rate)?;

        match unified.iter_mut().find(|u| u.member_id == balance.member_id) {
            Some(row) => {
                row.net = row
                    .net
                    .checked_add(converted)
                    .ok_or(LedgerError::BalanceOverflow {
                        member_id: row.member_id,
                        currency: target,
                    })?;
            }
            None => unified.push(UnifiedBalance {
                member_id: balance.member_id,
                currency: target,
                net: converted,
            }),
        }
    }

    Ok(unified)
}
