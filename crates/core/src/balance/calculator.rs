//! Balance calculation.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tripsplit_shared::types::{Currency, MemberId, MinorUnits};

use crate::ledger::error::LedgerError;
use crate::ledger::types::{Expense, TripMember};

/// A member's position in one currency.
///
/// Positive `net` means the member is owed money; negative means they owe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    /// The member.
    pub member_id: MemberId,
    /// Currency of every amount on this row.
    pub currency: Currency,
    /// Paid on behalf of the group, including shares repaid to others.
    pub total_paid: MinorUnits,
    /// Consumed, including repayments received.
    pub total_owed: MinorUnits,
    /// `total_paid - total_owed`.
    pub net: MinorUnits,
}

impl Balance {
    fn zero(member_id: MemberId, currency: Currency) -> Self {
        Self {
            member_id,
            currency,
            total_paid: 0,
            total_owed: 0,
            net: 0,
        }
    }

    fn add_paid(&mut self, amount: MinorUnits) -> Result<(), LedgerError> {
        self.total_paid = self
            .total_paid
            .checked_add(amount)
            .ok_or_else(|| self.overflow())?;
        Ok(())
    }

    fn add_owed(&mut self, amount: MinorUnits) -> Result<(), LedgerError> {
        self.total_owed = self
            .total_owed
            .checked_add(amount)
            .ok_or_else(|| self.overflow())?;
        Ok(())
    }

    const fn overflow(&self) -> LedgerError {
        LedgerError::BalanceOverflow {
            member_id: self.member_id,
            currency: self.currency,
        }
    }
}

/// Rows of a single currency in member join order.
#[derive(Default)]
struct CurrencyRows {
    rows: Vec<Balance>,
    index: HashMap<MemberId, usize>,
}

impl CurrencyRows {
    fn seeded(members: &[TripMember], currency: Currency) -> Self {
        let mut rows = Self::default();
        for member in members {
            rows.row(member.id, currency);
        }
        rows
    }

    /// Returns the row for `member_id`, appending one for members not seen yet.
    fn row(&mut self, member_id: MemberId, currency: Currency) -> &mut Balance {
        let position = *self.index.entry(member_id).or_insert_with(|| {
            self.rows.push(Balance::zero(member_id, currency));
            self.rows.len() - 1
        });
        &mut self.rows[position]
    }
}

/// Stateless balance calculator.
pub struct BalanceCalculator;

impl BalanceCalculator {
    /// Computes balances in a single pass over `expenses`.
    ///
    /// Every member gets a zero row for each currency present. A trip without
    /// expenses gets one zero row per member in `fallback_currency`.
    ///
    /// For each expense:
    /// 1. The payer's `total_paid` grows by the total
    /// 2. Each split member's `total_owed` grows by their share
    /// 3. For a paid non-payer split of a regular expense, the member is
    ///    treated as having paid their share back: their `total_paid` and the
    ///    payer's `total_owed` both grow by it
    ///
    /// Output is ordered by currency code, then member join order.
    ///
    /// # Errors
    ///
    /// Returns `BalanceOverflow` if a running total leaves the `i64` range.
    pub fn compute(
        members: &[TripMember],
        expenses: &[Expense],
        fallback_currency: Currency,
    ) -> Result<Vec<Balance>, LedgerError> {
        let mut by_currency: BTreeMap<&'static str, (Currency, CurrencyRows)> = BTreeMap::new();
        if expenses.is_empty() {
            by_currency.insert(
                fallback_currency.code(),
                (fallback_currency, CurrencyRows::seeded(members, fallback_currency)),
            );
        }

        for expense in expenses {
            let currency = expense.currency;
            let (_, rows) = by_currency
                .entry(currency.code())
                .or_insert_with(|| (currency, CurrencyRows::seeded(members, currency)));

            rows.row(expense.payer_id, currency).add_paid(expense.total_amount)?;

            for split in &expense.splits {
                rows.row(split.member_id, currency).add_owed(split.owed_amount)?;

                if expense.kind.is_expense() && split.is_paid && split.member_id != expense.payer_id {
                    rows.row(split.member_id, currency).add_paid(split.owed_amount)?;
                    rows.row(expense.payer_id, currency).add_owed(split.owed_amount)?;
                }
            }
        }

        by_currency
            .into_values()
            .flat_map(|(_, rows)| rows.rows)
            .map(|mut balance| {
                balance.net = balance
                    .total_paid
                    .checked_sub(balance.total_owed)
                    .ok_or_else(|| balance.overflow())?;
                Ok::<_, LedgerError>(balance)
            })
            .collect()
    }

    /// Sum of `net` per currency. Zero for every currency of a consistent ledger.
    #[must_use]
    pub fn net_totals(balances: &[Balance]) -> BTreeMap<&'static str, i128> {
        let mut totals = BTreeMap::new();
        for balance in balances {
            *totals.entry(balance.currency.code()).or_insert(0) += i128::from(balance.net);
        }
        totals
    }
}
