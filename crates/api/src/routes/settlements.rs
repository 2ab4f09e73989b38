//! Settlement planning and payment routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use tripsplit_core::settlement::SettlementTransaction;
use tripsplit_shared::types::{Currency, ExpenseId, MemberId, TripId};

use super::{format_amount, parse_amount};
use crate::AppState;
use crate::error::ledger_error_response;

/// Creates the settlement routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/trips/{trip_id}/settlement-plan", get(get_settlement_plan))
        .route("/trips/{trip_id}/settlements", post(settle_transaction))
        .route(
            "/expenses/{expense_id}/splits/{member_id}/payment",
            post(mark_paid),
        )
}

/// A suggested payment, in major units.
#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    /// Debtor.
    pub from_member_id: MemberId,
    /// Creditor.
    pub to_member_id: MemberId,
    /// Amount in major units.
    pub amount: String,
    /// Currency of the payment.
    pub currency: Currency,
}

impl From<&SettlementTransaction> for TransactionResponse {
    fn from(tx: &SettlementTransaction) -> Self {
        Self {
            from_member_id: tx.from_member_id,
            to_member_id: tx.to_member_id,
            amount: format_amount(tx.amount, tx.currency),
            currency: tx.currency,
        }
    }
}

/// Request body for recording a completed transfer.
#[derive(Debug, Deserialize)]
pub struct SettleRequest {
    /// Debtor.
    pub from_member_id: MemberId,
    /// Creditor.
    pub to_member_id: MemberId,
    /// Amount transferred in major units.
    pub amount: Decimal,
    /// Currency of the transfer.
    pub currency: Currency,
}

/// GET `/trips/{trip_id}/settlement-plan` - Suggested payments.
async fn get_settlement_plan(
    State(state): State<AppState>,
    Path(trip_id): Path<TripId>,
) -> impl IntoResponse {
    match state.ledger.get_settlement_plan(trip_id) {
        Ok(plan) => {
            let transactions: Vec<TransactionResponse> =
                plan.iter().map(TransactionResponse::from).collect();
            (
                StatusCode::OK,
                Json(json!({
                    "trip_id": trip_id,
                    "transactions": transactions
                })),
            )
                .into_response()
        }
        Err(e) => ledger_error_response(e),
    }
}

/// POST `/trips/{trip_id}/settlements` - Apply a transfer to open splits.
async fn settle_transaction(
    State(state): State<AppState>,
    Path(trip_id): Path<TripId>,
    Json(payload): Json<SettleRequest>,
) -> impl IntoResponse {
    let amount = match parse_amount(payload.amount, payload.currency) {
        Ok(amount) => amount,
        Err(response) => return response,
    };
    let tx = SettlementTransaction {
        from_member_id: payload.from_member_id,
        to_member_id: payload.to_member_id,
        amount,
        currency: payload.currency,
    };

    match state.ledger.settle_transaction(trip_id, &tx) {
        Ok(receipt) => {
            info!(
                trip_id = %trip_id,
                applied = receipt.applied.len(),
                uncovered = receipt.uncovered,
                "Settlement applied via API"
            );
            (
                StatusCode::OK,
                Json(json!({
                    "applied": receipt.applied,
                    "covered": format_amount(receipt.covered, tx.currency),
                    "uncovered": format_amount(receipt.uncovered, tx.currency)
                })),
            )
                .into_response()
        }
        Err(e) => ledger_error_response(e),
    }
}

/// POST `/expenses/{expense_id}/splits/{member_id}/payment` - Mark one split paid.
async fn mark_paid(
    State(state): State<AppState>,
    Path((expense_id, member_id)): Path<(ExpenseId, MemberId)>,
) -> impl IntoResponse {
    match state.ledger.mark_paid(expense_id, member_id) {
        Ok(outcome) => (StatusCode::OK, Json(json!(outcome))).into_response(),
        Err(e) => ledger_error_response(e),
    }
}
