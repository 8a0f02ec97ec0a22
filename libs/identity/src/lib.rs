//! # seqid-identity
//!
//! Prefix dispatch and identity minting.
//!
//! - [`VariantRegistry`] maps prefixes to the variants that own them
//! - [`IdentityManager`] parses identity strings into the registered variant
//!   and mints new identities from a [`CounterStore`]
//!
//! ```ignore
//! define_identity!(OrderId, "order");
//!
//! let manager = IdentityManager::new(Arc::new(MemoryCounterStore::new()));
//! manager.register::<OrderId>()?;
//! manager.init_seed("order", 5, &Cancellation::none()).await?;
//!
//! let order: OrderId = manager.generate_new(&Cancellation::none()).await?;
//! assert_eq!(order.value(), "order/6");
//! ```

mod error;
mod manager;
mod registry;

pub use error::{IdentityError, RegistrationProblem};
pub use manager::IdentityManager;
pub use registry::{
    AnyIdentity, NumericConstructor, StringConstructor, VariantDescriptor, VariantRegistry,
    VariantSpec,
};

pub use seqid_counter::{Cancellation, CounterStore};
pub use seqid_id::{define_identity, IdError, Identity, Variant};
