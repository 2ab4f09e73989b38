//! Expense recording.
//!
//! This module implements the write side of a trip ledger:
//! - Domain types for members, expenses and splits
//! - Split validation and split strategies
//! - The storage contract and its in-memory implementation
//! - The append-only expense ledger service
//! - Error types for ledger operations

pub mod allocation;
pub mod error;
pub mod memory;
pub mod service;
pub mod store;
pub mod types;
pub mod validation;

#[cfg(test)]
mod service_props;
#[cfg(test)]
mod validation_props;

pub use allocation::{AllocationUtil, SplitStrategy};
pub use error::{ErrorKind, LedgerError};
pub use memory::InMemoryExpenseStore;
pub use service::{Amendment, ExpenseLedger};
pub use store::{ExpenseStore, StoreError};
pub use types::{
    Expense, ExpenseCategory, ExpenseKind, ExpenseRecord, ExpenseStatus, NewExpense, Split,
    SplitInput, TripMember,
};
pub use validation::SplitValidator;
