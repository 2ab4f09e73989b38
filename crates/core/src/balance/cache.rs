//! Balance memoization using Moka.
//!
//! Entries are keyed by `(trip_id, ledger_version)`. Any write bumps the
//! version, so a stale entry is never looked up again and simply ages out.

use moka::sync::Cache;
use std::sync::Arc;
use std::time::Duration;

use tripsplit_shared::types::TripId;

use super::calculator::Balance;

/// Default cache capacity (number of entries).
const DEFAULT_CACHE_CAPACITY: u64 = 1_000;

/// Default time-to-live for cache entries (5 minutes).
const DEFAULT_TTL_SECS: u64 = 300;

/// Cache for computed balances.
#[derive(Clone)]
pub struct BalanceCache {
    cache: Cache<(TripId, u64), Arc<Vec<Balance>>>,
}

impl BalanceCache {
    /// Creates a new balance cache with default settings.
    ///
    /// Default: 1000 entries max, 5 minute TTL.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(DEFAULT_CACHE_CAPACITY, DEFAULT_TTL_SECS)
    }

    /// Creates a new balance cache with custom configuration.
    ///
    /// # Arguments
    ///
    /// * `max_capacity` - Maximum number of entries to cache
    /// * `ttl_secs` - Time-to-live in seconds for each entry
    #[must_use]
    pub fn with_config(max_capacity: u64, ttl_secs: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self { cache }
    }

    /// Returns the balances cached for this trip version.
    #[must_use]
    pub fn get(&self, trip_id: TripId, version: u64) -> Option<Arc<Vec<Balance>>> {
        self.cache.get(&(trip_id, version))
    }

    /// Stores balances computed at `version`.
    pub fn insert(&self, trip_id: TripId, version: u64, balances: Arc<Vec<Balance>>) {
        self.cache.insert((trip_id, version), balances);
    }

    /// Returns cached balances, computing and storing them on a miss.
    ///
    /// # Errors
    ///
    /// Propagates the error of `compute`; nothing is cached in that case.
    pub fn get_or_try_compute<F, E>(
        &self,
        trip_id: TripId,
        version: u64,
        compute: F,
    ) -> Result<Arc<Vec<Balance>>, E>
    where
        F: FnOnce() -> Result<Vec<Balance>, E>,
    {
        if let Some(cached) = self.get(trip_id, version) {
            return Ok(cached);
        }

        let balances = Arc::new(compute()?);
        self.insert(trip_id, version, Arc::clone(&balances));
        Ok(balances)
    }
}

impl Default for BalanceCache {
    fn default() -> Self {
        Self::new()
    }
}
