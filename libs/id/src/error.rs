//! Error types for identity parsing and validation.

use thiserror::Error;

/// Errors that can occur when parsing or constructing identities.
///
/// Every variant is a validation failure: the input does not describe a
/// well-formed `<prefix>/<numeric-id>` value.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdError {
    /// The identity string is empty or whitespace.
    #[error("identity value cannot be empty")]
    Empty,

    /// The value does not split into exactly two `/`-separated segments.
    #[error("invalid identity format: expected 'prefix/numericId', got '{value}'")]
    InvalidFormat { value: String },

    /// The prefix segment is empty or whitespace.
    #[error("prefix cannot be empty in identity '{value}'")]
    EmptyPrefix { value: String },

    /// The numeric segment is empty.
    #[error("numeric id cannot be empty in identity '{value}'")]
    EmptyNumericId { value: String },

    /// The numeric segment is not a base-10 integer.
    #[error("invalid numeric id in identity '{value}'")]
    InvalidNumericId { value: String },

    /// The numeric segment (or numeric id) is negative.
    #[error("numeric id must be non-negative, got '{value}'")]
    NegativeNumericId { value: String },

    /// The numeric segment does not fit in a signed 64-bit integer.
    #[error("numeric id out of range in identity '{value}'")]
    NumericIdOutOfRange { value: String },

    /// A typed variant was handed an identity with a foreign prefix.
    #[error("invalid identity prefix: expected '{expected}', got '{actual}'")]
    InvalidPrefix {
        expected: &'static str,
        actual: String,
    },

    /// The prefix itself cannot be used to build identities.
    #[error("invalid prefix token '{prefix}': must be non-empty and must not contain '/'")]
    InvalidPrefixToken { prefix: String },
}

impl IdError {
    /// Returns true if this error indicates the input was empty.
    pub fn is_empty(&self) -> bool {
        matches!(self, IdError::Empty)
    }

    /// Returns true if this error concerns the prefix segment.
    pub fn is_prefix_error(&self) -> bool {
        matches!(
            self,
            IdError::EmptyPrefix { .. }
                | IdError::InvalidPrefix { .. }
                | IdError::InvalidPrefixToken { .. }
        )
    }

    /// Returns true if this error concerns the numeric segment.
    pub fn is_numeric_error(&self) -> bool {
        matches!(
            self,
            IdError::EmptyNumericId { .. }
                | IdError::InvalidNumericId { .. }
                | IdError::NegativeNumericId { .. }
                | IdError::NumericIdOutOfRange { .. }
        )
    }
}
