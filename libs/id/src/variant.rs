//! The capability contract every identity kind implements.

use crate::{IdError, Identity};

/// A concrete identity kind with a fixed prefix.
///
/// Implementors supply both constructors explicitly; registries and managers
/// only ever go through this trait. Most variants are produced by
/// [`define_identity!`](crate::define_identity).
pub trait Variant: Sized + Clone + Send + Sync + std::fmt::Debug + 'static {
    /// The prefix owned by this variant.
    const PREFIX: &'static str;

    /// Builds `<PREFIX>/<numeric_id>`.
    fn from_numeric_id(numeric_id: i64) -> Result<Self, IdError>;

    /// Parses a value carrying this variant's prefix, keeping the text verbatim.
    fn from_string(value: &str) -> Result<Self, IdError>;

    /// Borrows the untyped identity.
    fn identity(&self) -> &Identity;

    /// Converts into the untyped identity.
    fn into_identity(self) -> Identity;
}
