//! Ledger error types for validation, reference and state errors.
//!
//! This module defines all errors that can occur during ledger operations.
//! `AlreadyPaid` is deliberately absent: it is a successful outcome of
//! marking a split paid, see [`crate::settlement::PaymentOutcome`].

use thiserror::Error;
use tripsplit_shared::AppError;
use tripsplit_shared::types::{Currency, ExpenseId, MemberId, MinorUnits, MoneyError, TripId};

use super::store::StoreError;

/// Broad classification of a [`LedgerError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input; the caller can correct and resubmit.
    Validation,
    /// Input references a member outside the trip.
    Reference,
    /// Target expense or split does not exist.
    NotFound,
    /// No exchange rate for a unified view.
    Currency,
    /// Persistence collaborator failed.
    Storage,
}

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// An expense needs at least one split.
    #[error("Expense must have at least one split")]
    EmptySplits,

    /// Expense total must be positive.
    #[error("Expense total must be positive, got {0}")]
    NonPositiveTotal(MinorUnits),

    /// A split owes a negative amount.
    #[error("Split for member {member_id} has negative amount {amount}")]
    NegativeShare {
        /// The offending member.
        member_id: MemberId,
        /// The negative amount.
        amount: MinorUnits,
    },

    /// A member appears twice in one split set.
    #[error("Member {0} appears more than once in the split")]
    DuplicateSplitMember(MemberId),

    /// Split amounts do not add up to the total.
    #[error("Split amounts sum to {allocated}, expected {total}")]
    SplitSumMismatch {
        /// The expense total.
        total: MinorUnits,
        /// Sum of the split amounts.
        allocated: MinorUnits,
    },

    /// Percentages are negative or do not sum to 100.
    #[error("Invalid split percentages: {0}")]
    InvalidPercentages(String),

    /// Expense title is blank.
    #[error("Expense title cannot be empty")]
    EmptyTitle,

    /// Reversal reason is blank.
    #[error("Reversal reason cannot be empty")]
    EmptyReason,

    /// A settlement payment names the same member on both sides.
    #[error("Member {0} cannot pay themselves")]
    SelfPayment(MemberId),

    /// Member display name is blank.
    #[error("Member display name cannot be empty")]
    EmptyDisplayName,

    /// Amount cannot be represented in minor units.
    #[error("Amount out of range: {0}")]
    AmountOutOfRange(#[from] MoneyError),

    /// Adjustments cannot themselves be reversed.
    #[error("Expense {0} is an adjustment and cannot be reversed")]
    CannotReverseAdjustment(ExpenseId),

    /// Expense already has an adjustment cancelling it.
    #[error("Expense {0} has already been reversed")]
    AlreadyReversed(ExpenseId),

    /// Splits of a reversed expense can no longer be paid.
    #[error("Expense {0} has been reversed and cannot take payments")]
    ExpenseReversed(ExpenseId),

    /// A running balance left the `i64` range.
    #[error("Balance of member {member_id} in {currency} exceeds the representable range")]
    BalanceOverflow {
        /// The member whose total overflowed.
        member_id: MemberId,
        /// Currency of the overflowing row.
        currency: Currency,
    },

    // ========== Reference Errors ==========
    /// A split names a member outside the trip.
    #[error("Member {member_id} is not part of trip {trip_id}")]
    MemberNotInTrip {
        /// The unknown member.
        member_id: MemberId,
        /// The trip being recorded against.
        trip_id: TripId,
    },

    /// The payer is not part of the trip.
    #[error("Payer {payer_id} is not part of trip {trip_id}")]
    PayerNotInTrip {
        /// The unknown payer.
        payer_id: MemberId,
        /// The trip being recorded against.
        trip_id: TripId,
    },

    // ========== Not Found Errors ==========
    /// Expense does not exist.
    #[error("Expense not found: {0}")]
    ExpenseNotFound(ExpenseId),

    /// Member has no split on the expense.
    #[error("Member {member_id} has no split on expense {expense_id}")]
    SplitNotFound {
        /// The expense searched.
        expense_id: ExpenseId,
        /// The member without a split.
        member_id: MemberId,
    },

    // ========== Currency Errors ==========
    /// No exchange rate available.
    #[error("No exchange rate from {from} to {to}")]
    NoExchangeRate {
        /// Source currency.
        from: Currency,
        /// Target currency.
        to: Currency,
    },

    // ========== Storage Errors ==========
    /// Persistence collaborator failure.
    #[error("Storage error: {0}")]
    Storage(#[source] StoreError),
}

impl From<StoreError> for LedgerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::AlreadyReversed(id) => Self::AlreadyReversed(id),
            StoreError::ExpenseReversed(id) => Self::ExpenseReversed(id),
            other => Self::Storage(other),
        }
    }
}

impl LedgerError {
    /// Classifies this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptySplits
            | Self::NonPositiveTotal(_)
            | Self::NegativeShare { .. }
            | Self::DuplicateSplitMember(_)
            | Self::SplitSumMismatch { .. }
            | Self::InvalidPercentages(_)
            | Self::EmptyTitle
            | Self::EmptyReason
            | Self::EmptyDisplayName
            | Self::SelfPayment(_)
            | Self::AmountOutOfRange(_)
            | Self::CannotReverseAdjustment(_)
            | Self::AlreadyReversed(_)
            | Self::ExpenseReversed(_)
            | Self::BalanceOverflow { .. } => ErrorKind::Validation,
            Self::MemberNotInTrip { .. } | Self::PayerNotInTrip { .. } => ErrorKind::Reference,
            Self::ExpenseNotFound(_) | Self::SplitNotFound { .. } => ErrorKind::NotFound,
            Self::NoExchangeRate { .. } => ErrorKind::Currency,
            Self::Storage(_) => ErrorKind::Storage,
        }
    }

    /// Returns true if the caller can fix the input and resubmit.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Validation)
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        let message = err.to_string();
        match err.kind() {
            ErrorKind::Validation => Self::Validation(message),
            ErrorKind::Reference => Self::Reference(message),
            ErrorKind::NotFound => Self::NotFound(message),
            ErrorKind::Currency => Self::ExternalService(message),
            ErrorKind::Storage => Self::Storage(message),
        }
    }
}
