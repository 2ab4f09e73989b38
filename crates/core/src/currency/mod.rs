//! Multi-currency handling and exchange rates.
//!
//! Balances are always kept per currency. This module only offers an
//! optional converted view on top of them.

pub mod conversion;
pub mod exchange;
pub mod unified;

#[cfg(test)]
mod props;

pub use conversion::{convert_amount, convert_minor};
pub use exchange::{ExchangeRate, FxRateProvider, StaticRates};
pub use unified::{UnifiedBalance, unify_balances};
