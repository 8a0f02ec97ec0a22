//! Error types for registry and manager operations.

use seqid_counter::CounterError;
use seqid_id::IdError;
use thiserror::Error;

/// Why a variant could not be registered.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationProblem {
    /// The prefix is empty or whitespace.
    #[error("prefix cannot be empty")]
    BlankPrefix,

    /// The prefix contains the `/` separator.
    #[error("prefix cannot contain '/'")]
    PrefixContainsSeparator,

    /// The prefix differs from the one the variant mints under.
    #[error("prefix must be the variant's own prefix '{expected}'")]
    PrefixMismatch { expected: &'static str },

    /// No constructor from a numeric id was supplied.
    #[error("a constructor from a numeric id is required")]
    MissingNumericConstructor,

    /// No constructor from a string was supplied.
    #[error("a constructor from a string is required")]
    MissingStringConstructor,
}

/// Errors surfaced by [`VariantRegistry`](crate::VariantRegistry) and
/// [`IdentityManager`](crate::IdentityManager).
///
/// Counter failures that callers commonly branch on (`NotInitialized`,
/// `Cancelled`) are lifted to their own variants; everything else from the
/// store stays in [`IdentityError::Counter`].
#[derive(Debug, Error)]
pub enum IdentityError {
    /// Malformed identity string or numeric id.
    #[error(transparent)]
    Validation(#[from] IdError),

    /// No variant is registered for the prefix.
    #[error("unknown identity prefix: '{prefix}'")]
    UnknownVariant { prefix: String },

    /// A variant could not be registered.
    #[error("cannot register identity type {type_name} with prefix '{prefix}': {problem}")]
    Registration {
        type_name: &'static str,
        prefix: String,
        problem: RegistrationProblem,
    },

    /// The sequence for the prefix was never seeded.
    #[error("counter '{name}' is not initialized; call init_seed first")]
    NotInitialized { name: String },

    /// The caller's cancellation signal fired.
    #[error("identity generation cancelled")]
    Cancelled,

    /// Any other counter store failure.
    #[error(transparent)]
    Counter(CounterError),
}

impl IdentityError {
    /// Returns true for malformed input.
    pub fn is_validation(&self) -> bool {
        matches!(self, IdentityError::Validation(_))
    }

    /// Returns true if the prefix is not registered.
    pub fn is_unknown_variant(&self) -> bool {
        matches!(self, IdentityError::UnknownVariant { .. })
    }

    /// Returns true if registration was rejected.
    pub fn is_registration(&self) -> bool {
        matches!(self, IdentityError::Registration { .. })
    }

    /// Returns true if the sequence was never seeded.
    pub fn is_not_initialized(&self) -> bool {
        matches!(self, IdentityError::NotInitialized { .. })
    }

    /// Returns true if the operation was cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, IdentityError::Cancelled)
    }
}

impl From<CounterError> for IdentityError {
    fn from(e: CounterError) -> Self {
        match e {
            CounterError::NotInitialized { name } => IdentityError::NotInitialized { name },
            CounterError::Cancelled => IdentityError::Cancelled,
            other => IdentityError::Counter(other),
        }
    }
}
