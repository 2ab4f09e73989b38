//! In-memory implementation of the storage contract.
//!
//! Backed by `DashMap`, so writers on different trips never contend and
//! every per-trip mutation happens under that trip's shard lock.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tripsplit_shared::types::{ExpenseId, MemberId, TripId};

use super::store::{ExpenseStore, StoreError};
use super::types::{Expense, ExpenseRecord, TripMember};

#[derive(Debug, Default)]
struct TripState {
    members: Vec<TripMember>,
    expenses: Vec<Expense>,
    version: u64,
}

impl TripState {
    fn is_superseded(&self, expense_id: ExpenseId) -> bool {
        self.expenses
            .iter()
            .any(|e| e.kind.supersedes() == Some(expense_id))
    }
}

/// Thread-safe in-memory expense store.
#[derive(Debug, Default)]
pub struct InMemoryExpenseStore {
    trips: DashMap<TripId, TripState>,
    /// Expense ID -> (trip, position in the trip's append-only log).
    expense_index: DashMap<ExpenseId, (TripId, usize)>,
    members: DashMap<MemberId, TripId>,
}

impl InMemoryExpenseStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends under the trip's shard lock once `admit` accepts the state.
    fn append<F>(&self, record: ExpenseRecord, admit: F) -> Result<ExpenseId, StoreError>
    where
        F: FnOnce(&TripState) -> Result<(), StoreError>,
    {
        let id = ExpenseId::new();
        let trip_id = record.trip_id;

        let position = {
            let mut state = self.trips.entry(trip_id).or_default();
            admit(&*state)?;
            state.expenses.push(record.into_expense(id));
            state.version += 1;
            state.expenses.len() - 1
        };

        self.expense_index.insert(id, (trip_id, position));
        Ok(id)
    }

    fn locate(&self, expense_id: ExpenseId) -> Result<(TripId, usize), StoreError> {
        self.expense_index
            .get(&expense_id)
            .map(|entry| *entry)
            .ok_or(StoreError::ExpenseNotFound(expense_id))
    }
}

impl ExpenseStore for InMemoryExpenseStore {
    fn insert_member(&self, member: TripMember) -> Result<(), StoreError> {
        match self.members.entry(member.id) {
            Entry::Occupied(_) => return Err(StoreError::DuplicateMember(member.id)),
            Entry::Vacant(slot) => {
                slot.insert(member.trip_id);
            }
        }

        let mut state = self.trips.entry(member.trip_id).or_default();
        state.members.push(member);
        state.version += 1;
        Ok(())
    }

    fn list_members(&self, trip_id: TripId) -> Result<Vec<TripMember>, StoreError> {
        Ok(self
            .trips
            .get(&trip_id)
            .map(|state| state.members.clone())
            .unwrap_or_default())
    }

    fn insert_expense(&self, record: ExpenseRecord) -> Result<ExpenseId, StoreError> {
        self.append(record, |_| Ok(()))
    }

    fn insert_adjustment(&self, record: ExpenseRecord) -> Result<ExpenseId, StoreError> {
        let Some(supersedes) = record.kind.supersedes() else {
            return self.insert_expense(record);
        };
        self.append(record, |state| {
            if state.is_superseded(supersedes) {
                return Err(StoreError::AlreadyReversed(supersedes));
            }
            Ok(())
        })
    }

    fn fetch_expenses(&self, trip_id: TripId) -> Result<Vec<Expense>, StoreError> {
        Ok(self
            .trips
            .get(&trip_id)
            .map(|state| state.expenses.clone())
            .unwrap_or_default())
    }

    fn fetch_expense(&self, expense_id: ExpenseId) -> Result<Option<Expense>, StoreError> {
        let Ok((trip_id, position)) = self.locate(expense_id) else {
            return Ok(None);
        };

        Ok(self
            .trips
            .get(&trip_id)
            .and_then(|state| state.expenses.get(position).cloned()))
    }

    fn compare_and_set_split_paid(
        &self,
        expense_id: ExpenseId,
        member_id: MemberId,
        expected: bool,
        new: bool,
        paid_at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let (trip_id, position) = self.locate(expense_id)?;

        let mut guard = self
            .trips
            .get_mut(&trip_id)
            .ok_or(StoreError::ExpenseNotFound(expense_id))?;
        let superseded = new && guard.is_superseded(expense_id);
        let TripState {
            expenses, version, ..
        } = &mut *guard;

        let expense = expenses
            .get_mut(position)
            .ok_or(StoreError::ExpenseNotFound(expense_id))?;
        let split = expense
            .splits
            .iter_mut()
            .find(|s| s.member_id == member_id)
            .ok_or(StoreError::SplitNotFound {
                expense_id,
                member_id,
            })?;

        if split.is_paid != expected {
            return Ok(false);
        }
        if superseded {
            return Err(StoreError::ExpenseReversed(expense_id));
        }

        split.is_paid = new;
        split.paid_at = new.then_some(paid_at);
        if !new {
            expense.is_settled = false;
        }
        *version += 1;
        Ok(true)
    }

    fn mark_expense_settled(&self, expense_id: ExpenseId) -> Result<bool, StoreError> {
        let (trip_id, position) = self.locate(expense_id)?;

        let mut guard = self
            .trips
            .get_mut(&trip_id)
            .ok_or(StoreError::ExpenseNotFound(expense_id))?;
        let expense = guard
            .expenses
            .get_mut(position)
            .ok_or(StoreError::ExpenseNotFound(expense_id))?;
        if expense.is_settled || !expense.all_splits_paid() {
            return Ok(false);
        }
        expense.is_settled = true;
        Ok(true)
    }

    fn trip_version(&self, trip_id: TripId) -> Result<u64, StoreError> {
        Ok(self.trips.get(&trip_id).map_or(0, |state| state.version))
    }
}
