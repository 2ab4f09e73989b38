//! API route definitions.

use axum::{Router, response::Response};
use rust_decimal::Decimal;
use tripsplit_core::ledger::LedgerError;
use tripsplit_shared::types::{Currency, MinorUnits, Money};

use crate::AppState;
use crate::error::ledger_error_response;

pub mod balances;
pub mod expenses;
pub mod health;
pub mod members;
pub mod settlements;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(members::routes())
        .merge(expenses::routes())
        .merge(balances::routes())
        .merge(settlements::routes())
}

/// Renders minor units as a major-unit decimal string, e.g. `"300.00"`.
pub(crate) fn format_amount(amount: MinorUnits, currency: Currency) -> String {
    Money::new(amount, currency).to_decimal().to_string()
}

/// Normalizes a major-unit amount into minor units of `currency`.
pub(crate) fn parse_amount(amount: Decimal, currency: Currency) -> Result<MinorUnits, Response> {
    Money::from_decimal(amount, currency)
        .map(|money| money.amount)
        .map_err(|e| ledger_error_response(LedgerError::from(e)))
}
