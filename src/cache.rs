//! Record-list cache keyed by resource name: de-duplicated loads, staleness and invalidation.

use crate::error::ApiError;
use crate::record::EntryRecord;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use std::time::{Duration, Instant};

pub type Records = Arc<Vec<EntryRecord>>;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum QueryStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

#[derive(Default)]
struct SlotState {
    data: Option<Records>,
    fetched_at: Option<Instant>,
    stale: bool,
    status: QueryStatus,
    completed: u64,
    invalidations: u64,
}

#[derive(Default)]
struct Slot {
    /// Held for the duration of a load so concurrent loads of one key run once.
    gate: tokio::sync::Mutex<()>,
    state: Mutex<SlotState>,
}

impl Slot {
    fn state(&self) -> MutexGuard<'_, SlotState> {
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }
}

pub struct QueryCache {
    slots: RwLock<HashMap<String, Arc<Slot>>>,
    stale_time: Duration,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(Duration::ZERO)
    }
}

impl QueryCache {
    /// `stale_time`: how long a loaded list is served without refetching.
    pub fn new(stale_time: Duration) -> Self {
        Self {
            slots: RwLock::new(HashMap::new()),
            stale_time,
        }
    }

    fn slot(&self, key: &str) -> Arc<Slot> {
        if let Some(slot) = self
            .slots
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .get(key)
        {
            return slot.clone();
        }
        self.slots
            .write()
            .unwrap_or_else(|p| p.into_inner())
            .entry(key.to_string())
            .or_default()
            .clone()
    }

    /// Return the cached list for `key`, or run `loader` when there is none, it is stale
    /// or it was invalidated. A caller that waited on another caller's load reuses that result.
    pub async fn fetch<F, Fut>(&self, key: &str, loader: F) -> Result<Records, ApiError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<EntryRecord>, ApiError>>,
    {
        let slot = self.slot(key);
        let seen = slot.state().completed;
        let _gate = slot.gate.lock().await;

        let invalidations_at_start = {
            let mut state = slot.state();
            if let Some(data) = &state.data {
                let fresh = !state.stale
                    && state
                        .fetched_at
                        .map(|t| t.elapsed() < self.stale_time)
                        .unwrap_or(false);
                if !state.stale && (fresh || state.completed > seen) {
                    tracing::debug!(key, "cache hit");
                    return Ok(data.clone());
                }
            }
            state.status = QueryStatus::Loading;
            state.invalidations
        };

        tracing::debug!(key, "cache load");
        let result = loader().await;
        let mut state = slot.state();
        match result {
            Ok(rows) => {
                let data = Arc::new(rows);
                state.data = Some(data.clone());
                state.fetched_at = Some(Instant::now());
                state.stale = state.invalidations != invalidations_at_start;
                state.status = QueryStatus::Success;
                state.completed += 1;
                Ok(data)
            }
            Err(e) => {
                state.status = QueryStatus::Error;
                Err(e)
            }
        }
    }

    /// Mark the list for `key` stale; the next fetch reloads it.
    pub fn invalidate(&self, key: &str) {
        let slot = self.slot(key);
        let mut state = slot.state();
        state.stale = true;
        state.invalidations += 1;
        tracing::debug!(key, invalidations = state.invalidations, "cache invalidated");
    }

    pub fn cached(&self, key: &str) -> Option<Records> {
        self.slot(key).state().data.clone()
    }

    pub fn status(&self, key: &str) -> QueryStatus {
        self.slot(key).state().status
    }

    pub fn is_stale(&self, key: &str) -> bool {
        self.slot(key).state().stale
    }

    pub fn invalidation_count(&self, key: &str) -> u64 {
        self.slot(key).state().invalidations
    }

    /// Number of loads of `key` that completed successfully.
    pub fn load_count(&self, key: &str) -> u64 {
        self.slot(key).state().completed
    }
}
