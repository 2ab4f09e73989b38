//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - REST API routes over the trip ledger
//! - Error-to-response mapping
//! - A tracing-backed reminder hook

pub mod error;
pub mod notify;
pub mod routes;

use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tripsplit_core::TripLedger;
use tripsplit_core::ledger::InMemoryExpenseStore;
use tripsplit_shared::LedgerConfig;

use crate::notify::TracingReminderHook;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Trip ledger over the in-memory store.
    pub ledger: Arc<TripLedger<InMemoryExpenseStore>>,
}

impl AppState {
    /// Builds state with a fresh store and reminders logged through tracing.
    #[must_use]
    pub fn new(config: &LedgerConfig) -> Self {
        let ledger = TripLedger::with_reminder_hook(
            Arc::new(InMemoryExpenseStore::new()),
            config,
            Arc::new(TracingReminderHook),
        );
        Self {
            ledger: Arc::new(ledger),
        }
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
