//! Greedy debt simplification.
//!
//! Per currency, repeatedly match the largest creditor with the largest
//! debtor and transfer the smaller of the two amounts. Each step settles at
//! least one party, so `N` nonzero members need at most `N - 1` payments.
//! The result is not globally minimal.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap};

use serde::{Deserialize, Serialize};
use tracing::warn;
use tripsplit_shared::types::{Currency, MemberId, MinorUnits};

use crate::balance::Balance;

/// One suggested peer-to-peer payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementTransaction {
    /// The debtor who pays.
    pub from_member_id: MemberId,
    /// The creditor who receives.
    pub to_member_id: MemberId,
    /// Amount in minor units; always positive.
    pub amount: MinorUnits,
    /// Currency of the payment.
    pub currency: Currency,
}

/// Heap entry: remaining amount, then the smaller member ID wins ties.
type Party = (MinorUnits, Reverse<MemberId>);

/// Stateless settlement planner.
pub struct SettlementPlanner;

impl SettlementPlanner {
    /// Plans payments that zero out `balances`.
    ///
    /// Currencies are planned independently, in code order. A currency whose
    /// nets do not sum to zero is still planned; the residue is left unplanned
    /// and a warning is logged.
    #[must_use]
    pub fn plan(balances: &[Balance]) -> Vec<SettlementTransaction> {
        let mut by_currency: BTreeMap<&'static str, (Currency, Vec<&Balance>)> = BTreeMap::new();
        for balance in balances.iter().filter(|b| b.net != 0) {
            by_currency
                .entry(balance.currency.code())
                .or_insert_with(|| (balance.currency, Vec::new()))
                .1
                .push(balance);
        }

        by_currency
            .into_values()
            .flat_map(|(currency, rows)| Self::plan_currency(currency, &rows))
            .collect()
    }

    fn plan_currency(currency: Currency, rows: &[&Balance]) -> Vec<SettlementTransaction> {
        let residue: i128 = rows.iter().map(|b| i128::from(b.net)).sum();
        if residue != 0 {
            warn!(
                currency = %currency,
                residue = %residue,
                "Balances do not sum to zero; residue left unplanned"
            );
        }

        let mut creditors: BinaryHeap<Party> = rows
            .iter()
            .filter(|b| b.net > 0)
            .map(|b| (b.net, Reverse(b.member_id)))
            .collect();
        let mut debtors: BinaryHeap<Party> = rows
            .iter()
            .filter(|b| b.net < 0)
            .map(|b| (b.net.saturating_neg(), Reverse(b.member_id)))
            .collect();

        let mut transactions = Vec::with_capacity(rows.len().saturating_sub(1));
        while let (Some((credit, Reverse(creditor))), Some((debt, Reverse(debtor)))) =
            (creditors.pop(), debtors.pop())
        {
            let amount = credit.min(debt);
            transactions.push(SettlementTransaction {
                from_member_id: debtor,
                to_member_id: creditor,
                amount,
                currency,
            });

            if credit > amount {
                creditors.push((credit - amount, Reverse(creditor)));
            }
            if debt > amount {
                debtors.push((debt - amount, Reverse(debtor)));
            }
        }

        transactions
    }
}
