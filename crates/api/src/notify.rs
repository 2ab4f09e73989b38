//! Reminder delivery through structured logs.

use tracing::info;
use tripsplit_core::settlement::{ReminderEvent, ReminderHook};

/// Emits each reminder as a tracing event for a downstream notifier to pick up.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReminderHook;

impl ReminderHook for TracingReminderHook {
    fn remind(&self, event: &ReminderEvent) {
        info!(
            target: "tripsplit::reminder",
            trip_id = %event.trip_id,
            expense_id = %event.expense_id,
            payer_id = %event.payer_id,
            currency = %event.currency,
            outstanding = event.outstanding,
            unpaid = event.unpaid_members.len(),
            title = %event.title,
            "Expense still has unpaid splits"
        );
    }
}
