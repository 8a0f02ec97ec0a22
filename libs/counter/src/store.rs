//! Counter store interface.
//!
//! A counter store owns named sequences of `i64` values:
//! - `init_seed` creates a sequence if absent and never overwrites one
//! - `increment` atomically bumps a sequence and returns the new value
//!
//! Strict stores fail `increment` on an unseeded name with
//! [`CounterError::NotInitialized`](crate::CounterError::NotInitialized).
//! The in-memory store is forgiving and treats an unseeded name as seeded at
//! [`DEFAULT_SEED`].

use async_trait::async_trait;

use crate::{Cancellation, CounterError};

/// Seed used when the caller has no preference.
pub const DEFAULT_SEED: i64 = 0;

/// Atomic seed/increment operations over named sequences.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Creates `name` with `seed` as its current value. No-op if it exists.
    async fn init_seed(
        &self,
        name: &str,
        seed: i64,
        cancel: &Cancellation,
    ) -> Result<(), CounterError>;

    /// Adds one to `name` and returns the new value.
    ///
    /// For a single name, N concurrent calls after seed `s` return exactly
    /// `s+1..=s+N`.
    async fn increment(&self, name: &str, cancel: &Cancellation) -> Result<i64, CounterError>;
}
