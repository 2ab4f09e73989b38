//! Expense recording routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use tripsplit_core::ledger::{
    Expense, ExpenseCategory, ExpenseKind, ExpenseStatus, NewExpense, SplitStrategy,
};
use tripsplit_shared::types::{Currency, ExpenseId, MemberId, TripId};

use super::{format_amount, parse_amount};
use crate::AppState;
use crate::error::ledger_error_response;

/// Creates the expense routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/trips/{trip_id}/expenses",
            get(list_expenses).post(create_expense),
        )
        .route("/expenses/{expense_id}", get(get_expense))
        .route("/expenses/{expense_id}/reversal", post(reverse_expense))
}

/// How the expense total is divided.
#[derive(Debug, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum SplitRequest {
    /// Divide evenly among `members`.
    Equal {
        /// Members sharing the cost.
        members: Vec<MemberId>,
    },
    /// Explicit amounts per member.
    Exact {
        /// Member shares in major units.
        shares: Vec<ExactShare>,
    },
    /// Percentages summing to 100.
    Percentage {
        /// Member percentages.
        shares: Vec<PercentageShare>,
    },
}

/// One explicit share.
#[derive(Debug, Deserialize)]
pub struct ExactShare {
    /// The member.
    pub member_id: MemberId,
    /// Amount owed in major units, e.g. `"100.00"`.
    pub amount: Decimal,
}

/// One percentage share.
#[derive(Debug, Deserialize)]
pub struct PercentageShare {
    /// The member.
    pub member_id: MemberId,
    /// Percentage of the total.
    pub percentage: Decimal,
}

/// Request body for recording an expense.
#[derive(Debug, Deserialize)]
pub struct CreateExpenseRequest {
    /// Short description.
    pub title: String,
    /// Total in major units, e.g. `"300.00"`.
    pub amount: Decimal,
    /// Currency of the total and every share.
    pub currency: Currency,
    /// The member who paid.
    pub payer_id: MemberId,
    /// When the payment happened; defaults to now.
    pub occurred_at: Option<DateTime<Utc>>,
    /// Category, defaults to `other`.
    #[serde(default)]
    pub category: ExpenseCategory,
    /// Split definition.
    pub split: SplitRequest,
}

/// Request body for reversing an expense.
#[derive(Debug, Deserialize)]
pub struct ReverseExpenseRequest {
    /// Why the expense is being cancelled.
    pub reason: String,
}

/// One split in an expense response.
#[derive(Debug, Serialize)]
pub struct SplitResponse {
    /// The member.
    pub member_id: MemberId,
    /// Amount owed in major units.
    pub amount: String,
    /// Whether the share has been paid back.
    pub is_paid: bool,
    /// When it was paid.
    pub paid_at: Option<DateTime<Utc>>,
}

/// Expense response with amounts in major units.
#[derive(Debug, Serialize)]
pub struct ExpenseResponse {
    /// Expense ID.
    pub id: ExpenseId,
    /// Trip ID.
    pub trip_id: TripId,
    /// Short description.
    pub title: String,
    /// Total in major units.
    pub amount: String,
    /// Currency code.
    pub currency: Currency,
    /// The member who paid.
    pub payer_id: MemberId,
    /// Category.
    pub category: ExpenseCategory,
    /// Expense or adjustment.
    pub kind: ExpenseKind,
    /// Lifecycle status derived from the splits.
    pub status: ExpenseStatus,
    /// True once every split is paid.
    pub is_settled: bool,
    /// Sum still owed to the payer, in major units.
    pub outstanding: String,
    /// When the payment happened.
    pub occurred_at: DateTime<Utc>,
    /// When the ledger accepted the record.
    pub recorded_at: DateTime<Utc>,
    /// Per-member shares.
    pub splits: Vec<SplitResponse>,
}

impl From<&Expense> for ExpenseResponse {
    fn from(expense: &Expense) -> Self {
        let currency = expense.currency;
        Self {
            id: expense.id,
            trip_id: expense.trip_id,
            title: expense.title.clone(),
            amount: expense.total().to_decimal().to_string(),
            currency,
            payer_id: expense.payer_id,
            category: expense.category,
            kind: expense.kind,
            status: expense.status(),
            is_settled: expense.is_settled,
            outstanding: format_amount(expense.outstanding(), currency),
            occurred_at: expense.occurred_at,
            recorded_at: expense.recorded_at,
            splits: expense
                .splits
                .iter()
                .map(|s| SplitResponse {
                    member_id: s.member_id,
                    amount: format_amount(s.owed_amount, currency),
                    is_paid: s.is_paid,
                    paid_at: s.paid_at,
                })
                .collect(),
        }
    }
}

/// Converts the wire split definition into a strategy in minor units.
fn to_strategy(split: SplitRequest, currency: Currency) -> Result<SplitStrategy, Response> {
    Ok(match split {
        SplitRequest::Equal { members } => SplitStrategy::Equal { members },
        SplitRequest::Exact { shares } => SplitStrategy::Exact {
            shares: shares
                .into_iter()
                .map(|s| parse_amount(s.amount, currency).map(|amount| (s.member_id, amount)))
                .collect::<Result<_, _>>()?,
        },
        SplitRequest::Percentage { shares } => SplitStrategy::Percentage {
            shares: shares
                .into_iter()
                .map(|s| (s.member_id, s.percentage))
                .collect(),
        },
    })
}

/// POST `/trips/{trip_id}/expenses` - Record an expense.
async fn create_expense(
    State(state): State<AppState>,
    Path(trip_id): Path<TripId>,
    Json(payload): Json<CreateExpenseRequest>,
) -> impl IntoResponse {
    let total_amount = match parse_amount(payload.amount, payload.currency) {
        Ok(amount) => amount,
        Err(response) => return response,
    };
    let strategy = match to_strategy(payload.split, payload.currency) {
        Ok(strategy) => strategy,
        Err(response) => return response,
    };

    let draft = NewExpense {
        trip_id,
        title: payload.title,
        total_amount,
        currency: payload.currency,
        payer_id: payload.payer_id,
        occurred_at: payload.occurred_at,
        category: payload.category,
        splits: vec![],
    };

    let recorded = state
        .ledger
        .record_split_expense(draft, strategy)
        .and_then(|id| state.ledger.expense(id));
    match recorded {
        Ok(expense) => {
            info!(trip_id = %trip_id, expense_id = %expense.id, "Expense recorded via API");
            (StatusCode::CREATED, Json(json!(ExpenseResponse::from(&expense)))).into_response()
        }
        Err(e) => ledger_error_response(e),
    }
}

/// GET `/trips/{trip_id}/expenses` - List expenses in insertion order.
async fn list_expenses(
    State(state): State<AppState>,
    Path(trip_id): Path<TripId>,
) -> impl IntoResponse {
    match state.ledger.expenses(trip_id) {
        Ok(expenses) => {
            let expenses: Vec<ExpenseResponse> = expenses.iter().map(ExpenseResponse::from).collect();
            (
                StatusCode::OK,
                Json(json!({
                    "trip_id": trip_id,
                    "expenses": expenses
                })),
            )
                .into_response()
        }
        Err(e) => ledger_error_response(e),
    }
}

/// GET `/expenses/{expense_id}` - Get one expense.
async fn get_expense(
    State(state): State<AppState>,
    Path(expense_id): Path<ExpenseId>,
) -> impl IntoResponse {
    match state.ledger.expense(expense_id) {
        Ok(expense) => (StatusCode::OK, Json(json!(ExpenseResponse::from(&expense)))).into_response(),
        Err(e) => ledger_error_response(e),
    }
}

/// POST `/expenses/{expense_id}/reversal` - Cancel an expense with an adjustment.
async fn reverse_expense(
    State(state): State<AppState>,
    Path(expense_id): Path<ExpenseId>,
    Json(payload): Json<ReverseExpenseRequest>,
) -> impl IntoResponse {
    let reversed = state
        .ledger
        .reverse_expense(expense_id, &payload.reason)
        .and_then(|id| state.ledger.expense(id));
    match reversed {
        Ok(adjustment) => {
            (StatusCode::CREATED, Json(json!(ExpenseResponse::from(&adjustment)))).into_response()
        }
        Err(e) => ledger_error_response(e),
    }
}
