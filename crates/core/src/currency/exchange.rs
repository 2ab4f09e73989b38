//! Exchange rate types and lookup.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tripsplit_shared::types::Currency;

/// Exchange rate between two currencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRate {
    /// Source currency.
    pub from_currency: Currency,
    /// Target currency.
    pub to_currency: Currency,
    /// Exchange rate (1 from_currency = rate to_currency).
    pub rate: Decimal,
}

impl ExchangeRate {
    /// Creates a new exchange rate.
    #[must_use]
    pub const fn new(from_currency: Currency, to_currency: Currency, rate: Decimal) -> Self {
        Self {
            from_currency,
            to_currency,
            rate,
        }
    }

    /// Returns the inverse rate, or `None` for a zero rate.
    #[must_use]
    pub fn inverse(&self) -> Option<Self> {
        Decimal::ONE.checked_div(self.rate).map(|rate| Self {
            from_currency: self.to_currency,
            to_currency: self.from_currency,
            rate,
        })
    }
}

/// Source of exchange rates for the unified balance view.
pub trait FxRateProvider: Send + Sync {
    /// Rate such that 1 `from` = rate `to`, if known.
    fn rate(&self, from: Currency, to: Currency) -> Option<Decimal>;
}

/// Fixed table of rates, typically loaded once per trip.
///
/// Looks up the direct pair first and falls back to inverting the reverse pair.
#[derive(Debug, Clone, Default)]
pub struct StaticRates {
    rates: HashMap<(Currency, Currency), Decimal>,
}

impl StaticRates {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rate, replacing any previous one for the pair.
    #[must_use]
    pub fn with_rate(mut self, from: Currency, to: Currency, rate: Decimal) -> Self {
        self.insert(ExchangeRate::new(from, to, rate));
        self
    }

    /// Adds a rate, replacing any previous one for the pair.
    pub fn insert(&mut self, rate: ExchangeRate) {
        self.rates
            .insert((rate.from_currency, rate.to_currency), rate.rate);
    }
}

impl FromIterator<ExchangeRate> for StaticRates {
    fn from_iter<I: IntoIterator<Item = ExchangeRate>>(iter: I) -> Self {
        let mut table = Self::new();
        for rate in iter {
            table.insert(rate);
        }
        table
    }
}

impl FxRateProvider for StaticRates {
    fn rate(&self, from: Currency, to: Currency) -> Option<Decimal> {
        if from == to {
            return Some(Decimal::ONE);
        }
        if let Some(rate) = self.rates.get(&(from, to)) {
            return Some(*rate);
        }
        self.rates
            .get(&(to, from))
            .and_then(|rate| ExchangeRate::new(to, from, *rate).inverse())
            .map(|inverse| inverse.rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_same_currency_is_identity() {
        assert_eq!(StaticRates::new().rate(Currency::Inr, Currency::Inr), Some(Decimal::ONE));
    }

    #[test]
    fn test_direct_and_inverse_lookup() {
        let rates = StaticRates::new().with_rate(Currency::Usd, Currency::Inr, dec!(80));

        assert_eq!(rates.rate(Currency::Usd, Currency::Inr), Some(dec!(80)));
        assert_eq!(rates.rate(Currency::Inr, Currency::Usd), Some(dec!(0.0125)));
        assert_eq!(rates.rate(Currency::Eur, Currency::Inr), None);
    }

    #[test]
    fn test_zero_rate_has_no_inverse() {
        let rates = StaticRates::new().with_rate(Currency::Usd, Currency::Inr, Decimal::ZERO);
        assert_eq!(rates.rate(Currency::Inr, Currency::Usd), None);
    }

    #[test]
    fn test_from_iterator() {
        let rates: StaticRates = [
            ExchangeRate::new(Currency::Eur, Currency::Usd, dec!(1.1)),
            ExchangeRate::new(Currency::Gbp, Currency::Usd, dec!(1.25)),
        ]
        .into_iter()
        .collect();
        assert_eq!(rates.rate(Currency::Gbp, Currency::Usd), Some(dec!(1.25)));
    }
}
