//! Identity manager: registry plus counter store.

use std::fmt;
use std::sync::Arc;

use seqid_counter::{Cancellation, CounterStore};
use seqid_id::{validate_prefix, Identity, Variant};
use tracing::{debug, info};

use crate::{AnyIdentity, IdentityError, VariantDescriptor, VariantRegistry};

/// Parses and mints typed identities.
///
/// The manager owns no global state: build one at startup, register the
/// variants the application uses and hand it to whoever needs identities.
/// Each prefix's sequence lives in the counter store under the prefix name.
#[derive(Clone)]
pub struct IdentityManager {
    registry: Arc<VariantRegistry>,
    counters: Arc<dyn CounterStore>,
}

impl IdentityManager {
    /// Create a manager with an empty registry.
    pub fn new(counters: Arc<dyn CounterStore>) -> Self {
        Self::with_registry(Arc::new(VariantRegistry::new()), counters)
    }

    /// Create a manager over an existing registry.
    pub fn with_registry(registry: Arc<VariantRegistry>, counters: Arc<dyn CounterStore>) -> Self {
        Self { registry, counters }
    }

    /// Registers `V` with the underlying registry.
    pub fn register<V: Variant>(&self) -> Result<(), IdentityError> {
        self.registry.register::<V>()
    }

    /// Returns the variant registry.
    pub fn registry(&self) -> &Arc<VariantRegistry> {
        &self.registry
    }

    /// Returns the counter store.
    pub fn counters(&self) -> &Arc<dyn CounterStore> {
        &self.counters
    }

    /// Parses `value` into the variant registered for its prefix.
    ///
    /// The string form is preserved verbatim, including leading zeros.
    pub fn parse(&self, value: &str) -> Result<AnyIdentity, IdentityError> {
        let identity = Identity::parse(value)?;
        let descriptor = self.registry.resolve(identity.prefix())?;
        Ok(descriptor.from_string(value)?)
    }

    /// Mints the next identity of variant `V`.
    ///
    /// # Errors
    ///
    /// `UnknownVariant` if `V` is not registered (the counter store is not
    /// touched), `NotInitialized` if its sequence was never seeded on a
    /// strict store, `Cancelled` if `cancel` fired first.
    pub async fn generate_new<V: Variant>(&self, cancel: &Cancellation) -> Result<V, IdentityError> {
        let descriptor = self.registry.resolve_type::<V>()?;
        let minted = self.mint(&descriptor, cancel).await?;
        minted
            .downcast::<V>()
            .map_err(|other| IdentityError::UnknownVariant {
                prefix: other.prefix().to_string(),
            })
    }

    /// Mints the next identity for `prefix`.
    pub async fn generate_new_by_prefix(
        &self,
        prefix: &str,
        cancel: &Cancellation,
    ) -> Result<AnyIdentity, IdentityError> {
        validate_prefix(prefix)?;
        let descriptor = self.registry.resolve(prefix)?;
        self.mint(&descriptor, cancel).await
    }

    /// Seeds the sequence of a registered prefix.
    ///
    /// A no-op if the sequence already exists.
    pub async fn init_seed(
        &self,
        prefix: &str,
        seed: i64,
        cancel: &Cancellation,
    ) -> Result<(), IdentityError> {
        validate_prefix(prefix)?;
        let descriptor = self.registry.resolve(prefix)?;
        self.counters
            .init_seed(descriptor.prefix(), seed, cancel)
            .await?;
        info!(prefix = %descriptor.prefix(), seed, "Initialized identity sequence");
        Ok(())
    }

    async fn mint(
        &self,
        descriptor: &VariantDescriptor,
        cancel: &Cancellation,
    ) -> Result<AnyIdentity, IdentityError> {
        let prefix = descriptor.prefix();
        let numeric_id = self.counters.increment(prefix, cancel).await?;
        let identity = descriptor.from_numeric_id(numeric_id)?;
        debug!(prefix = %prefix, value = %identity, "Generated identity");
        Ok(identity)
    }
}

impl fmt::Debug for IdentityManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityManager")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}
