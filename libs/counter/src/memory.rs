//! In-memory counter store.
//!
//! Sequences live in a sharded map of atomics and last as long as the store.
//! This is the forgiving store: `increment` on an unseeded name starts it at
//! [`DEFAULT_SEED`] instead of failing, which makes it a convenient default
//! and test double.

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;

use crate::error::validate_name;
use crate::{Cancellation, CounterError, CounterStore, DEFAULT_SEED};

/// Process-local counter store.
#[derive(Debug, Default)]
pub struct MemoryCounterStore {
    counters: DashMap<String, AtomicI64>,
}

impl MemoryCounterStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current value of `name` without incrementing.
    pub fn current(&self, name: &str) -> Option<i64> {
        self.counters
            .get(name)
            .map(|counter| counter.load(Ordering::SeqCst))
    }

    /// Number of sequences held.
    pub fn len(&self) -> usize {
        self.counters.len()
    }

    /// Returns true if no sequence exists yet.
    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }

    fn bump(counter: &AtomicI64, name: &str) -> Result<i64, CounterError> {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |v| v.checked_add(1))
            .map(|previous| previous + 1)
            .map_err(|_| CounterError::Overflow {
                name: name.to_string(),
            })
    }
}

#[async_trait]
impl CounterStore for MemoryCounterStore {
    async fn init_seed(
        &self,
        name: &str,
        seed: i64,
        cancel: &Cancellation,
    ) -> Result<(), CounterError> {
        validate_name(name)?;
        cancel.check()?;

        self.counters
            .entry(name.to_string())
            .or_insert_with(|| {
                debug!(counter = %name, seed, "Seeding in-memory counter");
                AtomicI64::new(seed)
            });
        Ok(())
    }

    async fn increment(&self, name: &str, cancel: &Cancellation) -> Result<i64, CounterError> {
        validate_name(name)?;
        cancel.check()?;

        // Fast path: shared shard lock only.
        if let Some(counter) = self.counters.get(name) {
            return Self::bump(&counter, name);
        }

        let counter = self.counters.entry(name.to_string()).or_insert_with(|| {
            debug!(counter = %name, "Auto-seeding unseeded in-memory counter");
            AtomicI64::new(DEFAULT_SEED)
        });
        Self::bump(&counter, name)
    }
}
