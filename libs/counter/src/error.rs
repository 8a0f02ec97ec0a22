//! Counter store error types.

use thiserror::Error;

/// Counter store operation errors.
#[derive(Debug, Error)]
pub enum CounterError {
    /// `increment` was called on a sequence that was never seeded.
    #[error("counter '{name}' is not initialized; call init_seed first")]
    NotInitialized { name: String },

    /// The caller's cancellation signal fired before the commit point.
    #[error("counter operation cancelled")]
    Cancelled,

    /// The counter name is empty or whitespace.
    #[error("counter name cannot be empty")]
    InvalidName,

    /// The sequence is already at `i64::MAX`.
    #[error("counter '{name}' would overflow")]
    Overflow { name: String },

    /// Embedded file store failure.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Failed to connect to the database.
    #[error("failed to connect to database: {0}")]
    Connect(#[source] sqlx::Error),

    /// Failed to execute a query.
    #[error("query failed: {0}")]
    Query(#[source] sqlx::Error),

    /// A blocking worker task panicked or was aborted.
    #[error("counter task failed: {0}")]
    Task(String),
}

impl CounterError {
    /// Returns true if the sequence was never seeded.
    pub fn is_not_initialized(&self) -> bool {
        matches!(self, CounterError::NotInitialized { .. })
    }

    /// Returns true if the operation was cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, CounterError::Cancelled)
    }
}

/// Rejects empty or whitespace counter names.
pub(crate) fn validate_name(name: &str) -> Result<(), CounterError> {
    if name.trim().is_empty() {
        return Err(CounterError::InvalidName);
    }
    Ok(())
}
