//! Trip membership routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use tripsplit_shared::types::TripId;

use crate::AppState;
use crate::error::ledger_error_response;

/// Creates the member routes.
pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/trips/{trip_id}/members",
        get(list_members).post(add_member),
    )
}

/// Request body for joining a trip.
#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    /// Name shown to other travelers.
    pub display_name: String,
}

/// POST `/trips/{trip_id}/members` - Add a member to a trip.
async fn add_member(
    State(state): State<AppState>,
    Path(trip_id): Path<TripId>,
    Json(payload): Json<AddMemberRequest>,
) -> impl IntoResponse {
    match state.ledger.add_member(trip_id, &payload.display_name) {
        Ok(member) => {
            info!(trip_id = %trip_id, member_id = %member.id, "Member added via API");
            (StatusCode::CREATED, Json(json!(member))).into_response()
        }
        Err(e) => ledger_error_response(e),
    }
}

/// GET `/trips/{trip_id}/members` - List members in join order.
async fn list_members(
    State(state): State<AppState>,
    Path(trip_id): Path<TripId>,
) -> impl IntoResponse {
    match state.ledger.members(trip_id) {
        Ok(members) => (
            StatusCode::OK,
            Json(json!({
                "trip_id": trip_id,
                "members": members
            })),
        )
            .into_response(),
        Err(e) => ledger_error_response(e),
    }
}
