//! Run-scoped aggregation state shared by detectors.
//!
//! Counters are created lazily under the write lock and bumped under the read
//! lock, so concurrent increments from the node pass never serialize on the
//! map. Latches are one-shot: the first caller to take a latch wins.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError, RwLock};

/// Named counters and latches for one analysis run.
#[derive(Debug, Default)]
pub struct AggregationState {
    counters: RwLock<HashMap<&'static str, AtomicU64>>,
    latches: Mutex<HashSet<&'static str>>,
}

impl AggregationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically add `delta` to a counter, creating it at zero first.
    pub fn add(&self, name: &'static str, delta: u64) {
        {
            let counters = self.counters.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(counter) = counters.get(name) {
                counter.fetch_add(delta, Ordering::SeqCst);
                return;
            }
        }

        let mut counters = self.counters.write().unwrap_or_else(PoisonError::into_inner);
        counters
            .entry(name)
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(delta, Ordering::SeqCst);
    }

    /// Current value of a counter; zero if it was never touched.
    pub fn get(&self, name: &str) -> u64 {
        let counters = self.counters.read().unwrap_or_else(PoisonError::into_inner);
        counters
            .get(name)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    /// Take a latch. Returns true for exactly one caller per name.
    pub fn try_latch(&self, name: &'static str) -> bool {
        let mut latches = self.latches.lock().unwrap_or_else(PoisonError::into_inner);
        latches.insert(name)
    }
}
