//! # seqid-id
//!
//! Typed, sequence-backed identity values.
//!
//! ## Design Principles
//!
//! - Identities are immutable values compared by their text form
//! - Every identity kind owns a fixed prefix and two explicit constructors
//! - Parsing is strict; the text of a parsed identity is never rewritten
//!
//! ## Identity Format
//!
//! All identities use a prefixed format: `{prefix}/{numeric-id}`
//!
//! Examples:
//! - `user/1`
//! - `order/42`
//! - `invoice/00017` (leading zeros are preserved as written)
//!
//! The numeric part comes from a per-prefix sequence, so identities of one
//! kind sort in creation order.

mod error;
mod macros;
mod types;
mod variant;

pub use error::IdError;
pub use types::{validate_prefix, Identity, SEPARATOR};
pub use variant::Variant;

/// Re-export serde for the generated `Serialize`/`Deserialize` impls.
#[doc(hidden)]
pub use serde;
