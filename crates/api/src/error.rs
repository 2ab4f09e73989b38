//! Mapping ledger errors onto HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::{error, warn};
use tripsplit_core::ledger::LedgerError;
use tripsplit_shared::AppError;

/// Builds the `{"error": code, "message": text}` body for an application error.
pub fn app_error_response(err: &AppError) -> Response {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let message = match err {
        AppError::Storage(_) | AppError::Internal(_) => "An error occurred".to_string(),
        AppError::NotFound(m)
        | AppError::Validation(m)
        | AppError::Reference(m)
        | AppError::Conflict(m)
        | AppError::ExternalService(m) => m.clone(),
    };

    (
        status,
        Json(json!({
            "error": err.error_code(),
            "message": message
        })),
    )
        .into_response()
}

/// Logs a ledger error at a level matching its severity and converts it.
pub fn ledger_error_response(err: LedgerError) -> Response {
    if err.is_recoverable() {
        warn!(error = %err, "Rejected ledger request");
    } else {
        error!(error = %err, kind = ?err.kind(), "Ledger operation failed");
    }
    app_error_response(&AppError::from(err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tripsplit_shared::types::{ExpenseId, MemberId, TripId};

    #[rstest]
    #[case(LedgerError::EmptySplits, StatusCode::BAD_REQUEST)]
    #[case(
        LedgerError::MemberNotInTrip { member_id: MemberId::new(), trip_id: TripId::new() },
        StatusCode::UNPROCESSABLE_ENTITY
    )]
    #[case(LedgerError::ExpenseNotFound(ExpenseId::new()), StatusCode::NOT_FOUND)]
    #[case(LedgerError::AlreadyReversed(ExpenseId::new()), StatusCode::BAD_REQUEST)]
    #[case(LedgerError::ExpenseReversed(ExpenseId::new()), StatusCode::BAD_REQUEST)]
    fn test_status_mapping(#[case] err: LedgerError, #[case] expected: StatusCode) {
        assert_eq!(ledger_error_response(err).status(), expected);
    }
}
