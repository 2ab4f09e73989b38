//! Reminder hook for expenses that remain partially settled.
//!
//! Delivery (push, email, chat) lives outside the ledger. The recorder only
//! emits the event.

use serde::Serialize;
use tripsplit_shared::types::{Currency, ExpenseId, MemberId, MinorUnits, TripId};

use crate::ledger::types::Expense;

/// Emitted after a payment when an expense still has unpaid splits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReminderEvent {
    /// The trip.
    pub trip_id: TripId,
    /// The expense still open.
    pub expense_id: ExpenseId,
    /// Expense title, for the message body.
    pub title: String,
    /// Who is waiting to be paid back.
    pub payer_id: MemberId,
    /// Currency of `outstanding`.
    pub currency: Currency,
    /// Sum still owed to the payer.
    pub outstanding: MinorUnits,
    /// Members who have not paid yet.
    pub unpaid_members: Vec<MemberId>,
}

impl ReminderEvent {
    /// Builds the event for an expense's current state.
    #[must_use]
    pub fn for_expense(expense: &Expense) -> Self {
        Self {
            trip_id: expense.trip_id,
            expense_id: expense.id,
            title: expense.title.clone(),
            payer_id: expense.payer_id,
            currency: expense.currency,
            outstanding: expense.outstanding(),
            unpaid_members: expense
                .obligations()
                .filter(|s| !s.is_paid)
                .map(|s| s.member_id)
                .collect(),
        }
    }
}

/// Receives reminder events. Must not block.
pub trait ReminderHook: Send + Sync {
    /// Called once per payment that leaves the expense unsettled.
    fn remind(&self, event: &ReminderEvent);
}

/// Hook that drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopReminderHook;

impl ReminderHook for NoopReminderHook {
    fn remind(&self, _event: &ReminderEvent) {}
}
