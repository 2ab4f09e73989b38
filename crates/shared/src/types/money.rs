//! Money type in integer minor currency units.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Amounts are stored as `i64` minor units (paise, cents, ...). `Decimal` is
//! only used at the presentation boundary.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An amount in the smallest unit of its currency.
pub type MinorUnits = i64;

/// Errors converting between display amounts and minor units.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyError {
    /// Amount has more decimal places than the currency allows.
    #[error("Amount {amount} has more precision than {currency} allows")]
    ExcessPrecision {
        /// The rejected amount.
        amount: Decimal,
        /// The currency it was given in.
        currency: Currency,
    },

    /// Amount does not fit into minor units.
    #[error("Amount {0} is out of range")]
    OutOfRange(Decimal),

    /// Currency code is not supported.
    #[error("Unknown currency: {0}")]
    UnknownCurrency(String),
}

/// Represents a monetary amount with currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    /// The amount in the smallest currency unit (e.g., paise).
    pub amount: MinorUnits,
    /// ISO 4217 currency code (e.g., "INR", "USD").
    pub currency: Currency,
}

/// ISO 4217 currency codes supported by the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// Indian Rupee
    Inr,
    /// US Dollar
    Usd,
    /// Euro
    Eur,
    /// Pound Sterling
    Gbp,
    /// Indonesian Rupiah
    Idr,
    /// Singapore Dollar
    Sgd,
    /// Japanese Yen
    Jpy,
    /// Thai Baht
    Thb,
}

impl Currency {
    /// The ISO 4217 code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Inr => "INR",
            Self::Usd => "USD",
            Self::Eur => "EUR",
            Self::Gbp => "GBP",
            Self::Idr => "IDR",
            Self::Sgd => "SGD",
            Self::Jpy => "JPY",
            Self::Thb => "THB",
        }
    }

    /// Number of decimal places in one major unit.
    #[must_use]
    pub const fn minor_unit_exponent(self) -> u32 {
        match self {
            Self::Jpy => 0,
            _ => 2,
        }
    }

    /// Number of minor units in one major unit.
    #[must_use]
    pub const fn minor_units_per_major(self) -> i64 {
        10_i64.pow(self.minor_unit_exponent())
    }
}

impl Money {
    /// Creates a new Money instance.
    #[must_use]
    pub const fn new(amount: MinorUnits, currency: Currency) -> Self {
        Self { amount, currency }
    }

    /// Creates a zero amount in the specified currency.
    #[must_use]
    pub const fn zero(currency: Currency) -> Self {
        Self {
            amount: 0,
            currency,
        }
    }

    /// Normalizes a display amount (major units) into minor units.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount carries sub-minor-unit precision or
    /// does not fit in an `i64`.
    pub fn from_decimal(amount: Decimal, currency: Currency) -> Result<Self, MoneyError> {
        let scaled = amount
            .checked_mul(Decimal::from(currency.minor_units_per_major()))
            .ok_or(MoneyError::OutOfRange(amount))?;

        if !scaled.fract().is_zero() {
            return Err(MoneyError::ExcessPrecision { amount, currency });
        }

        let minor = scaled.to_i64().ok_or(MoneyError::OutOfRange(amount))?;
        Ok(Self::new(minor, currency))
    }

    /// Converts back to major units for display.
    #[must_use]
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.amount, self.currency.minor_unit_exponent())
    }

    /// Returns true if the amount is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.amount == 0
    }

    /// Returns true if the amount is negative.
    #[must_use]
    pub const fn is_negative(&self) -> bool {
        self.amount < 0
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.currency, self.to_decimal())
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for Currency {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "INR" => Ok(Self::Inr),
            "USD" => Ok(Self::Usd),
            "EUR" => Ok(Self::Eur),
            "GBP" => Ok(Self::Gbp),
            "IDR" => Ok(Self::Idr),
            "SGD" => Ok(Self::Sgd),
            "JPY" => Ok(Self::Jpy),
            "THB" => Ok(Self::Thb),
            _ => Err(MoneyError::UnknownCurrency(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;
    use std::str::FromStr;

    #[test]
    fn test_money_zero() {
        let money = Money::zero(Currency::Inr);
        assert!(money.is_zero());
        assert!(!money.is_negative());
        assert_eq!(money.currency, Currency::Inr);
    }

    #[rstest]
    #[case(dec!(300), Currency::Inr, 30_000)]
    #[case(dec!(300.00), Currency::Inr, 30_000)]
    #[case(dec!(0.01), Currency::Usd, 1)]
    #[case(dec!(-12.5), Currency::Eur, -1_250)]
    #[case(dec!(1500), Currency::Jpy, 1_500)]
    fn test_from_decimal(#[case] amount: Decimal, #[case] currency: Currency, #[case] minor: i64) {
        let money = Money::from_decimal(amount, currency).unwrap();
        assert_eq!(money.amount, minor);
        assert_eq!(money.currency, currency);
    }

    #[rstest]
    #[case(dec!(0.001), Currency::Usd)]
    #[case(dec!(10.5), Currency::Jpy)]
    fn test_from_decimal_rejects_excess_precision(
        #[case] amount: Decimal,
        #[case] currency: Currency,
    ) {
        assert_eq!(
            Money::from_decimal(amount, currency),
            Err(MoneyError::ExcessPrecision { amount, currency })
        );
    }

    #[test]
    fn test_from_decimal_rejects_out_of_range() {
        let huge = Decimal::from(i64::MAX);
        assert!(matches!(
            Money::from_decimal(huge, Currency::Usd),
            Err(MoneyError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_to_decimal_uses_currency_exponent() {
        assert_eq!(Money::new(30_000, Currency::Inr).to_decimal(), dec!(300.00));
        assert_eq!(Money::new(1_500, Currency::Jpy).to_decimal(), dec!(1500));
        assert_eq!(Money::new(30_000, Currency::Inr).to_string(), "INR 300.00");
    }

    #[test]
    fn test_currency_from_str() {
        assert_eq!(Currency::from_str("INR").unwrap(), Currency::Inr);
        assert_eq!(Currency::from_str("usd").unwrap(), Currency::Usd);
        assert_eq!(Currency::from_str(" jpy ").unwrap(), Currency::Jpy);
        assert!(Currency::from_str("XXX").is_err());
        assert!(Currency::from_str("").is_err());
    }

    #[test]
    fn test_currency_serde_uppercase() {
        let json = serde_json::to_string(&Currency::Thb).unwrap();
        assert_eq!(json, "\"THB\"");
        let parsed: Currency = serde_json::from_str("\"GBP\"").unwrap();
        assert_eq!(parsed, Currency::Gbp);
    }
}
