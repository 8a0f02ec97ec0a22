//! # seqid-counter
//!
//! Named, atomically incremented sequences with explicit seeding.
//!
//! This crate provides:
//! - The [`CounterStore`] interface (`init_seed` / `increment`)
//! - Cooperative cancellation via [`Cancellation`]
//! - Three interchangeable stores:
//!   - [`MemoryCounterStore`]: process-local, forgiving (unseeded names start at 0)
//!   - [`FileCounterStore`]: SQLite file, strict, single writer
//!   - [`PgCounterStore`]: PostgreSQL, strict, many writers
//!
//! Stores are picked by the embedding application when it builds them; they
//! share no state with each other.

mod cancel;
mod error;
mod file;
mod memory;
mod postgres;
mod store;

pub use cancel::{CancelHandle, Cancellation};
pub use error::CounterError;
pub use file::{FileCounterConfig, FileCounterStore, SyncMode};
pub use memory::MemoryCounterStore;
pub use postgres::{PgCounterConfig, PgCounterStore};
pub use store::{CounterStore, DEFAULT_SEED};
