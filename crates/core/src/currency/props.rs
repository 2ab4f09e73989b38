//! Property-based tests for currency conversion.
//!
//! - Banker's rounding to the target minor unit
//! - Identity conversion preserves amounts
//! - Sign is preserved for positive rates

use proptest::prelude::*;
use rust_decimal::Decimal;
use tripsplit_shared::types::{Currency, MinorUnits};

use super::conversion::{convert_amount, convert_minor};

/// Strategy to generate amounts in minor units (-1,000,000.00 to 1,000,000.00).
fn minor_amount() -> impl Strategy<Value = MinorUnits> {
    -100_000_000i64..100_000_000i64
}

/// Strategy to generate positive exchange rates (0.0001 to 10000.0000).
fn positive_rate() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|v| Decimal::new(v, 4))
}

/// Strategy to generate a currency.
fn currency() -> impl Strategy<Value = Currency> {
    prop_oneof![
        Just(Currency::Inr),
        Just(Currency::Usd),
        Just(Currency::Idr),
        Just(Currency::Jpy),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Converting with rate 1 between currencies of equal exponent is lossless.
    #[test]
    fn prop_identity_rate_preserves_amount(amount in minor_amount()) {
        prop_assert_eq!(
            convert_minor(amount, Currency::Usd, Currency::Inr, Decimal::ONE),
            Ok(amount)
        );
    }

    /// The result matches rounding the exact product half-to-even.
    #[test]
    fn prop_matches_bankers_rounding(
        amount in minor_amount(),
        rate in positive_rate(),
        from in currency(),
        to in currency(),
    ) {
        let major = Decimal::new(amount, from.minor_unit_exponent());
        let expected = convert_amount(major, rate, to.minor_unit_exponent());
        let converted = convert_minor(amount, from, to, rate).unwrap();

        prop_assert_eq!(Decimal::new(converted, to.minor_unit_exponent()), expected);
    }

    /// A positive rate never flips the sign.
    #[test]
    fn prop_sign_preserved(amount in minor_amount(), rate in positive_rate()) {
        let converted = convert_minor(amount, Currency::Usd, Currency::Jpy, rate).unwrap();
        prop_assert!(converted == 0 || converted.signum() == amount.signum());
    }
}
