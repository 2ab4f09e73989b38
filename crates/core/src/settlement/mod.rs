//! Settling up: planning peer-to-peer payments and recording them.
//!
//! - `planner` - greedy debt simplification over balances
//! - `recorder` - idempotent application of payments to splits
//! - `notify` - reminder hook fired while an expense stays open

pub mod notify;
pub mod planner;
pub mod recorder;

#[cfg(test)]
mod props;

pub use notify::{NoopReminderHook, ReminderEvent, ReminderHook};
pub use planner::{SettlementPlanner, SettlementTransaction};
pub use recorder::{PaymentOutcome, SettlementRecorder, TransactionReceipt};
