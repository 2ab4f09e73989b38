//! Per-member, per-currency balances.
//!
//! Balances are derived on read from the expense snapshot and memoized by
//! ledger version.

pub mod cache;
pub mod calculator;

#[cfg(test)]
mod props;

pub use cache::BalanceCache;
pub use calculator::{Balance, BalanceCalculator};
