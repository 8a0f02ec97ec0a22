//! The identity value shared by every variant.
//!
//! An [`Identity`] is the untyped shape `<prefix>/<numeric-id>`. Typed
//! variants (see [`crate::Variant`] and [`crate::define_identity!`]) wrap one
//! and pin its prefix.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::IdError;

/// Separator between the prefix and the numeric id.
pub const SEPARATOR: char = '/';

/// An immutable `<prefix>/<numeric-id>` value.
///
/// Built from a string, the input text is kept verbatim (`user/007` stays
/// `user/007`) while [`numeric_id`](Self::numeric_id) holds the parsed value.
/// Built from a numeric id, the text is canonical (`user/7`).
///
/// Equality and hashing use the text only.
#[derive(Debug, Clone)]
pub struct Identity {
    value: String,
    prefix_len: usize,
    numeric_id: i64,
}

impl Identity {
    /// Parses an identity from its text form.
    ///
    /// The value must split into exactly two `/`-separated segments, the
    /// first non-empty and the second a non-negative base-10 integer made of
    /// ASCII digits only.
    pub fn parse(value: &str) -> Result<Self, IdError> {
        if value.trim().is_empty() {
            return Err(IdError::Empty);
        }

        let mut segments = value.split(SEPARATOR);
        let (Some(prefix), Some(digits), None) =
            (segments.next(), segments.next(), segments.next())
        else {
            return Err(IdError::InvalidFormat {
                value: value.to_string(),
            });
        };

        if prefix.trim().is_empty() {
            return Err(IdError::EmptyPrefix {
                value: value.to_string(),
            });
        }

        let numeric_id = parse_numeric_segment(value, digits)?;

        Ok(Self {
            value: value.to_string(),
            prefix_len: prefix.len(),
            numeric_id,
        })
    }

    /// Builds the canonical identity `<prefix>/<numeric_id>`.
    pub fn from_numeric_id(prefix: &str, numeric_id: i64) -> Result<Self, IdError> {
        validate_prefix(prefix)?;

        if numeric_id < 0 {
            return Err(IdError::NegativeNumericId {
                value: numeric_id.to_string(),
            });
        }

        Ok(Self {
            value: format!("{prefix}{SEPARATOR}{numeric_id}"),
            prefix_len: prefix.len(),
            numeric_id,
        })
    }

    /// Returns the text form.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Returns the prefix segment.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.value[..self.prefix_len]
    }

    /// Returns the parsed numeric segment.
    #[must_use]
    pub const fn numeric_id(&self) -> i64 {
        self.numeric_id
    }

    /// Consumes the identity and returns its text form.
    #[must_use]
    pub fn into_value(self) -> String {
        self.value
    }
}

/// Checks that `prefix` can head an identity.
pub fn validate_prefix(prefix: &str) -> Result<(), IdError> {
    if prefix.trim().is_empty() || prefix.contains(SEPARATOR) {
        return Err(IdError::InvalidPrefixToken {
            prefix: prefix.to_string(),
        });
    }
    Ok(())
}

fn parse_numeric_segment(value: &str, digits: &str) -> Result<i64, IdError> {
    if digits.is_empty() {
        return Err(IdError::EmptyNumericId {
            value: value.to_string(),
        });
    }

    if let Some(magnitude) = digits.strip_prefix('-') {
        if !magnitude.is_empty() && magnitude.bytes().all(|b| b.is_ascii_digit()) {
            return Err(IdError::NegativeNumericId {
                value: value.to_string(),
            });
        }
    }

    // `i64::from_str` accepts a leading '+', which is not part of the format.
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(IdError::InvalidNumericId {
            value: value.to_string(),
        });
    }

    digits
        .parse::<i64>()
        .map_err(|_| IdError::NumericIdOutOfRange {
            value: value.to_string(),
        })
}

impl PartialEq for Identity {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for Identity {}

impl Hash for Identity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl Ord for Identity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.prefix()
            .cmp(other.prefix())
            .then(self.numeric_id.cmp(&other.numeric_id))
            .then_with(|| self.value.cmp(&other.value))
    }
}

impl PartialOrd for Identity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl FromStr for Identity {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Identity {
    fn as_ref(&self) -> &str {
        &self.value
    }
}

impl From<Identity> for String {
    fn from(id: Identity) -> Self {
        id.value
    }
}

impl serde::Serialize for Identity {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.value)
    }
}

impl<'de> serde::Deserialize<'de> for Identity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = <String as serde::Deserialize>::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Tests
// =============================================================================
