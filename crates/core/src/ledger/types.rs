//! Ledger domain types for expense recording and settlement.
//!
//! This module defines the core entities of a trip ledger: members,
//! expenses and their per-member splits.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tripsplit_shared::types::{Currency, ExpenseId, MemberId, MinorUnits, Money, TripId};

/// A party who can owe or be owed money on a trip.
///
/// Immutable once referenced by an expense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripMember {
    /// The member ID.
    pub id: MemberId,
    /// Name shown to other travelers.
    pub display_name: String,
    /// The trip this member joined.
    pub trip_id: TripId,
}

impl TripMember {
    /// Creates a new member with a fresh ID.
    #[must_use]
    pub fn new(trip_id: TripId, display_name: impl Into<String>) -> Self {
        Self {
            id: MemberId::new(),
            display_name: display_name.into(),
            trip_id,
        }
    }
}

/// Expense category used for grouping on the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseCategory {
    /// Meals, snacks, drinks.
    Food,
    /// Hotels and stays.
    Lodging,
    /// Flights, trains, cabs, fuel.
    Transport,
    /// Tickets, tours, entry fees.
    Activities,
    /// Souvenirs and other purchases.
    Shopping,
    /// Anything else.
    #[default]
    Other,
}

impl std::str::FromStr for ExpenseCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "food" => Ok(Self::Food),
            "lodging" => Ok(Self::Lodging),
            "transport" => Ok(Self::Transport),
            "activities" => Ok(Self::Activities),
            "shopping" => Ok(Self::Shopping),
            "other" => Ok(Self::Other),
            _ => Err(format!("Unknown expense category: {s}")),
        }
    }
}

/// Whether a record is an ordinary expense or an append-only correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExpenseKind {
    /// A real-world payment made on behalf of the group.
    Expense,
    /// Negated copy of an earlier expense, cancelling it out.
    Adjustment {
        /// The expense this adjustment cancels.
        supersedes: ExpenseId,
    },
}

impl ExpenseKind {
    /// Returns true for ordinary expenses.
    #[must_use]
    pub const fn is_expense(&self) -> bool {
        matches!(self, Self::Expense)
    }

    /// The expense this record cancels, if it is an adjustment.
    #[must_use]
    pub const fn supersedes(&self) -> Option<ExpenseId> {
        match self {
            Self::Expense => None,
            Self::Adjustment { supersedes } => Some(*supersedes),
        }
    }
}

/// Lifecycle of an expense.
///
/// Transitions only move forward; corrections are appended as adjustments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseStatus {
    /// Being composed, not yet validated.
    Draft,
    /// Validated and stored, no obligation paid yet.
    Recorded,
    /// Some but not all obligations paid.
    PartiallySettled,
    /// Every split paid.
    Settled,
}

impl ExpenseStatus {
    /// Returns true if the status may move to `next`.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        next > self
    }

    /// Returns true if the core fields of the expense are frozen.
    #[must_use]
    pub const fn is_immutable(self) -> bool {
        !matches!(self, Self::Draft)
    }
}

/// One member's share of one expense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Split {
    /// The member who owes this share.
    pub member_id: MemberId,
    /// Amount owed, in minor units.
    pub owed_amount: MinorUnits,
    /// Whether the share has been paid back to the payer.
    pub is_paid: bool,
    /// When the share was paid.
    pub paid_at: Option<DateTime<Utc>>,
}

/// A recorded expense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    /// The expense ID.
    pub id: ExpenseId,
    /// The trip this expense belongs to.
    pub trip_id: TripId,
    /// Short description.
    pub title: String,
    /// Total paid, in minor units.
    pub total_amount: MinorUnits,
    /// Currency of every amount on this expense.
    pub currency: Currency,
    /// The member who paid.
    pub payer_id: MemberId,
    /// When the payment happened.
    pub occurred_at: DateTime<Utc>,
    /// Category for grouping.
    pub category: ExpenseCategory,
    /// Per-member shares; sum equals `total_amount`.
    pub splits: Vec<Split>,
    /// True once every split is paid.
    pub is_settled: bool,
    /// Ordinary expense or adjustment.
    pub kind: ExpenseKind,
    /// When the ledger accepted the record.
    pub recorded_at: DateTime<Utc>,
}

impl Expense {
    /// Returns the split owed by `member_id`, if any.
    #[must_use]
    pub fn split_for(&self, member_id: MemberId) -> Option<&Split> {
        self.splits.iter().find(|s| s.member_id == member_id)
    }

    /// Splits owed to the payer by other members.
    pub fn obligations(&self) -> impl Iterator<Item = &Split> {
        self.splits.iter().filter(move |s| s.member_id != self.payer_id)
    }

    /// Returns true if no split remains unpaid.
    #[must_use]
    pub fn all_splits_paid(&self) -> bool {
        self.splits.iter().all(|s| s.is_paid)
    }

    /// Derives the lifecycle status from the split flags.
    #[must_use]
    pub fn status(&self) -> ExpenseStatus {
        if self.is_settled || self.all_splits_paid() {
            return ExpenseStatus::Settled;
        }
        if self.obligations().any(|s| s.is_paid) {
            ExpenseStatus::PartiallySettled
        } else {
            ExpenseStatus::Recorded
        }
    }

    /// The total as a `Money` value.
    #[must_use]
    pub const fn total(&self) -> Money {
        Money::new(self.total_amount, self.currency)
    }

    /// Sum of unpaid obligations.
    #[must_use]
    pub fn outstanding(&self) -> MinorUnits {
        self.obligations()
            .filter(|s| !s.is_paid)
            .map(|s| s.owed_amount)
            .sum()
    }
}

/// Input for one member's share of a new expense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitInput {
    /// The member who owes this share.
    pub member_id: MemberId,
    /// Amount owed, in minor units.
    pub owed_amount: MinorUnits,
}

impl SplitInput {
    /// Creates a split input.
    #[must_use]
    pub const fn new(member_id: MemberId, owed_amount: MinorUnits) -> Self {
        Self {
            member_id,
            owed_amount,
        }
    }
}

/// Input for recording a new expense (the `Draft` state).
#[derive(Debug, Clone)]
pub struct NewExpense {
    /// The trip to record against.
    pub trip_id: TripId,
    /// Short description.
    pub title: String,
    /// Total paid, in minor units (must be positive).
    pub total_amount: MinorUnits,
    /// Currency of every amount.
    pub currency: Currency,
    /// The member who paid.
    pub payer_id: MemberId,
    /// When the payment happened; defaults to the recording time.
    pub occurred_at: Option<DateTime<Utc>>,
    /// Category for grouping.
    pub category: ExpenseCategory,
    /// Proposed shares.
    pub splits: Vec<SplitInput>,
}

/// A validated expense ready for insertion. The store assigns its ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseRecord {
    /// The trip this expense belongs to.
    pub trip_id: TripId,
    /// Short description.
    pub title: String,
    /// Total paid, in minor units.
    pub total_amount: MinorUnits,
    /// Currency of every amount.
    pub currency: Currency,
    /// The member who paid.
    pub payer_id: MemberId,
    /// When the payment happened.
    pub occurred_at: DateTime<Utc>,
    /// Category for grouping.
    pub category: ExpenseCategory,
    /// Validated shares.
    pub splits: Vec<Split>,
    /// True if every split is already paid.
    pub is_settled: bool,
    /// Ordinary expense or adjustment.
    pub kind: ExpenseKind,
    /// When the ledger accepted the record.
    pub recorded_at: DateTime<Utc>,
}

impl ExpenseRecord {
    /// Attaches the store-assigned ID.
    #[must_use]
    pub fn into_expense(self, id: ExpenseId) -> Expense {
        Expense {
            id,
            trip_id: self.trip_id,
            title: self.title,
            total_amount: self.total_amount,
            currency: self.currency,
            payer_id: self.payer_id,
            occurred_at: self.occurred_at,
            category: self.category,
            splits: self.splits,
            is_settled: self.is_settled,
            kind: self.kind,
            recorded_at: self.recorded_at,
        }
    }
}
