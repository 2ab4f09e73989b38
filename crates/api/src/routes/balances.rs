//! Balance routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde::Serialize;
use serde_json::json;
use tripsplit_core::balance::Balance;
use tripsplit_shared::types::{Currency, MemberId, TripId};

use super::format_amount;
use crate::AppState;
use crate::error::ledger_error_response;

/// Creates the balance routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/trips/{trip_id}/balances", get(get_balances))
}

/// One member's position in one currency, in major units.
#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    /// The member.
    pub member_id: MemberId,
    /// Currency of every amount on this row.
    pub currency: Currency,
    /// Paid on behalf of the group.
    pub total_paid: String,
    /// Consumed.
    pub total_owed: String,
    /// Positive when owed money, negative when owing.
    pub net: String,
}

impl From<&Balance> for BalanceResponse {
    fn from(balance: &Balance) -> Self {
        let currency = balance.currency;
        Self {
            member_id: balance.member_id,
            currency,
            total_paid: format_amount(balance.total_paid, currency),
            total_owed: format_amount(balance.total_owed, currency),
            net: format_amount(balance.net, currency),
        }
    }
}

/// GET `/trips/{trip_id}/balances` - Per-member, per-currency balances.
async fn get_balances(
    State(state): State<AppState>,
    Path(trip_id): Path<TripId>,
) -> impl IntoResponse {
    match state.ledger.get_balances(trip_id) {
        Ok(balances) => {
            let balances: Vec<BalanceResponse> = balances.iter().map(BalanceResponse::from).collect();
            (
                StatusCode::OK,
                Json(json!({
                    "trip_id": trip_id,
                    "balances": balances
                })),
            )
                .into_response()
        }
        Err(e) => ledger_error_response(e),
    }
}
