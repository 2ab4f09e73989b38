//! Property-based tests for the settlement planner.
//!
//! - Applying the plan zeroes every balance
//! - At most `N - 1` payments for `N` nonzero members
//! - Payments only flow from debtors to creditors

use std::collections::HashMap;

use proptest::prelude::*;
use tripsplit_shared::types::{Currency, MemberId, MinorUnits};

use super::planner::SettlementPlanner;
use crate::balance::Balance;

/// Strategy to generate nets for one currency that sum to zero.
fn zero_sum_nets() -> impl Strategy<Value = Vec<MinorUnits>> {
    prop::collection::vec(-1_000_000i64..1_000_000i64, 1..12).prop_map(|mut nets| {
        let total: MinorUnits = nets.iter().sum();
        nets.push(-total);
        nets
    })
}

fn balances(nets: &[MinorUnits], currency: Currency) -> Vec<Balance> {
    nets.iter()
        .map(|net| Balance {
            member_id: MemberId::new(),
            currency,
            total_paid: (*net).max(0),
            total_owed: (-*net).max(0),
            net: *net,
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// The plan settles everyone within the `N - 1` bound.
    #[test]
    fn prop_plan_settles_everyone(nets in zero_sum_nets()) {
        let balances = balances(&nets, Currency::Inr);
        let nonzero = balances.iter().filter(|b| b.net != 0).count();

        let plan = SettlementPlanner::plan(&balances);

        prop_assert!(plan.len() <= nonzero.saturating_sub(1));

        let mut remaining: HashMap<MemberId, MinorUnits> =
            balances.iter().map(|b| (b.member_id, b.net)).collect();
        for tx in &plan {
            prop_assert!(tx.amount > 0);
            prop_assert!(remaining[&tx.from_member_id] < 0);
            prop_assert!(remaining[&tx.to_member_id] > 0);
            *remaining.get_mut(&tx.from_member_id).unwrap() += tx.amount;
            *remaining.get_mut(&tx.to_member_id).unwrap() -= tx.amount;
        }
        prop_assert!(remaining.values().all(|net| *net == 0));
    }

    /// Currencies never mix within a payment.
    #[test]
    fn prop_currencies_are_independent(usd in zero_sum_nets(), jpy in zero_sum_nets()) {
        let mut all = balances(&usd, Currency::Usd);
        all.extend(balances(&jpy, Currency::Jpy));

        let plan = SettlementPlanner::plan(&all);
        let usd_plan = SettlementPlanner::plan(&all[..usd.len()]);

        let planned_usd: Vec<_> = plan.iter().filter(|t| t.currency == Currency::Usd).copied().collect();
        prop_assert_eq!(planned_usd, usd_plan);
    }
}
