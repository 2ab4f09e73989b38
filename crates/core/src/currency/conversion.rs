//! Currency conversion logic.
//!
//! CRITICAL: Rounding strategy for multi-currency:
//! - Always round to the target currency's minor unit
//! - Use banker's rounding (round half to even)
//! - Converted figures are informational; the ledger keeps original amounts

use rust_decimal::Decimal;
use rust_decimal::RoundingStrategy;
use tripsplit_shared::types::{Currency, MinorUnits, Money, MoneyError};

/// Converts an amount using the given exchange rate.
///
/// Uses banker's rounding (round half to even) to minimize cumulative errors.
#[must_use]
pub fn convert_amount(amount: Decimal, rate: Decimal, decimal_places: u32) -> Decimal {
    let converted = amount * rate;
    converted.round_dp_with_strategy(decimal_places, RoundingStrategy::MidpointNearestEven)
}

/// Converts minor units of `from` into minor units of `to`.
///
/// # Errors
///
/// Returns `MoneyError::OutOfRange` if the result does not fit in minor units.
pub fn convert_minor(
    amount: MinorUnits,
    from: Currency,
    to: Currency,
    rate: Decimal,
) -> Result<MinorUnits, MoneyError> {
    let major = Money::new(amount, from).to_decimal();
    let converted = major
        .checked_mul(rate)
        .ok_or(MoneyError::OutOfRange(major))?
        .round_dp_with_strategy(to.minor_unit_exponent(), RoundingStrategy::MidpointNearestEven);
    Ok(Money::from_decimal(converted, to)?.amount)
}
