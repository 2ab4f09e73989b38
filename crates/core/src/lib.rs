//! Core business logic for Tripsplit.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `ledger` - Expense recording, split validation and the storage contract
//! - `balance` - Per-member, per-currency net positions
//! - `settlement` - Debt simplification and payment recording
//! - `currency` - Exchange rates and the unified balance view
//! - `trip` - Facade tying the above together

pub mod balance;
pub mod currency;
pub mod ledger;
pub mod settlement;
pub mod trip;

pub use trip::TripLedger;
