//! Prefix ↔ variant registry.
//!
//! The registry is an owned value built at startup with one explicit
//! registration per variant. Each entry holds the two constructors the
//! variant supplies, type-erased so lookups by prefix can build the right
//! concrete type.
//!
//! Both directions of the mapping sit behind one lock, so a reader never
//! observes a prefix whose reverse entry is missing or stale.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use parking_lot::RwLock;
use seqid_id::{IdError, Identity, Variant, SEPARATOR};
use tracing::{debug, info};

use crate::{IdentityError, RegistrationProblem};

// =============================================================================
// AnyIdentity
// =============================================================================

trait DynVariant: Send + Sync + fmt::Debug {
    fn identity(&self) -> &Identity;
    fn type_name(&self) -> &'static str;
    fn as_any(&self) -> &dyn Any;
    fn clone_box(&self) -> Box<dyn DynVariant>;
}

impl<V: Variant> DynVariant for V {
    fn identity(&self) -> &Identity {
        Variant::identity(self)
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<V>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn clone_box(&self) -> Box<dyn DynVariant> {
        Box::new(self.clone())
    }
}

/// An identity whose concrete variant is only known at runtime.
///
/// Returned by prefix-driven operations. Compares, hashes and displays like
/// the underlying [`Identity`]; use [`downcast`](Self::downcast) to recover
/// the typed value.
pub struct AnyIdentity(Box<dyn DynVariant>);

impl AnyIdentity {
    /// Wraps a typed identity.
    pub fn new<V: Variant>(identity: V) -> Self {
        Self(Box::new(identity))
    }

    /// Borrows the untyped identity.
    pub fn identity(&self) -> &Identity {
        self.0.identity()
    }

    /// Returns the text form.
    pub fn value(&self) -> &str {
        self.identity().value()
    }

    /// Returns the prefix segment.
    pub fn prefix(&self) -> &str {
        self.identity().prefix()
    }

    /// Returns the numeric id.
    pub fn numeric_id(&self) -> i64 {
        self.identity().numeric_id()
    }

    /// Returns the Rust type name of the concrete variant.
    pub fn type_name(&self) -> &'static str {
        self.0.type_name()
    }

    /// Returns true if the concrete variant is `V`.
    pub fn is<V: Variant>(&self) -> bool {
        self.0.as_any().is::<V>()
    }

    /// Borrows the concrete variant if it is `V`.
    pub fn downcast_ref<V: Variant>(&self) -> Option<&V> {
        self.0.as_any().downcast_ref::<V>()
    }

    /// Converts into `V`, or gives `self` back if the variant differs.
    pub fn downcast<V: Variant>(self) -> Result<V, Self> {
        match self.downcast_ref::<V>() {
            Some(typed) => Ok(typed.clone()),
            None => Err(self),
        }
    }

    /// Converts into the untyped identity.
    pub fn into_identity(self) -> Identity {
        self.0.identity().clone()
    }
}

impl Clone for AnyIdentity {
    fn clone(&self) -> Self {
        Self(self.0.clone_box())
    }
}

impl fmt::Debug for AnyIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyIdentity")
            .field("variant", &self.type_name())
            .field("value", &self.value())
            .finish()
    }
}

impl fmt::Display for AnyIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.value())
    }
}

impl PartialEq for AnyIdentity {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}

impl Eq for AnyIdentity {}

impl Hash for AnyIdentity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity().hash(state);
    }
}

impl AsRef<Identity> for AnyIdentity {
    fn as_ref(&self) -> &Identity {
        self.identity()
    }
}

// =============================================================================
// Variant specs and descriptors
// =============================================================================

/// Constructor from a numeric id.
pub type NumericConstructor<V> = fn(i64) -> Result<V, IdError>;

/// Constructor from a string.
pub type StringConstructor<V> = fn(&str) -> Result<V, IdError>;

/// Explicit registration request for variant `V`.
///
/// [`VariantSpec::of`] takes everything from the [`Variant`] impl. The
/// builder form exists for variants assembled by hand; registration rejects a
/// spec that is missing either constructor or whose prefix differs from
/// `V::PREFIX`, since the numeric constructor always mints under `V::PREFIX`.
pub struct VariantSpec<V> {
    prefix: String,
    from_numeric_id: Option<NumericConstructor<V>>,
    from_string: Option<StringConstructor<V>>,
}

impl<V: Variant> VariantSpec<V> {
    /// A spec with the given prefix and no constructors yet.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            from_numeric_id: None,
            from_string: None,
        }
    }

    /// The spec described by `V`'s [`Variant`] impl.
    pub fn of() -> Self {
        Self::new(V::PREFIX)
            .with_numeric_constructor(V::from_numeric_id)
            .with_string_constructor(V::from_string)
    }

    /// Sets the constructor from a numeric id.
    #[must_use]
    pub fn with_numeric_constructor(mut self, ctor: NumericConstructor<V>) -> Self {
        self.from_numeric_id = Some(ctor);
        self
    }

    /// Sets the constructor from a string.
    #[must_use]
    pub fn with_string_constructor(mut self, ctor: StringConstructor<V>) -> Self {
        self.from_string = Some(ctor);
        self
    }

    /// Returns the prefix this spec registers.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

trait ErasedConstructors: Send + Sync {
    fn from_numeric_id(&self, numeric_id: i64) -> Result<AnyIdentity, IdError>;
    fn from_string(&self, value: &str) -> Result<AnyIdentity, IdError>;
}

struct Constructors<V> {
    from_numeric_id: NumericConstructor<V>,
    from_string: StringConstructor<V>,
}

impl<V: Variant> ErasedConstructors for Constructors<V> {
    fn from_numeric_id(&self, numeric_id: i64) -> Result<AnyIdentity, IdError> {
        (self.from_numeric_id)(numeric_id).map(AnyIdentity::new)
    }

    fn from_string(&self, value: &str) -> Result<AnyIdentity, IdError> {
        (self.from_string)(value).map(AnyIdentity::new)
    }
}

/// A registered variant.
#[derive(Clone)]
pub struct VariantDescriptor {
    prefix: Arc<str>,
    type_id: TypeId,
    type_name: &'static str,
    constructors: Arc<dyn ErasedConstructors>,
}

impl VariantDescriptor {
    /// Returns the registered prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns the Rust type name of the variant.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns true if this descriptor builds `V`.
    pub fn is<V: Variant>(&self) -> bool {
        self.type_id == TypeId::of::<V>()
    }

    /// Builds an identity from a numeric id.
    pub fn from_numeric_id(&self, numeric_id: i64) -> Result<AnyIdentity, IdError> {
        self.constructors.from_numeric_id(numeric_id)
    }

    /// Builds an identity from its text form.
    pub fn from_string(&self, value: &str) -> Result<AnyIdentity, IdError> {
        self.constructors.from_string(value)
    }
}

impl fmt::Debug for VariantDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VariantDescriptor")
            .field("prefix", &self.prefix)
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Registry
// =============================================================================

#[derive(Default)]
struct Tables {
    by_prefix: HashMap<String, VariantDescriptor>,
    by_type: HashMap<TypeId, String>,
}

/// Bidirectional prefix ↔ variant mapping.
#[derive(Default)]
pub struct VariantRegistry {
    tables: RwLock<Tables>,
}

impl VariantRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `V` under `V::PREFIX`.
    ///
    /// Registering the same variant again replaces its entry.
    pub fn register<V: Variant>(&self) -> Result<(), IdentityError> {
        self.register_spec(VariantSpec::<V>::of())
    }

    /// Registers a variant from an explicit spec.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::Registration` if the prefix is blank, contains
    /// `/` or differs from `V::PREFIX`, or if either constructor is missing.
    pub fn register_spec<V: Variant>(&self, spec: VariantSpec<V>) -> Result<(), IdentityError> {
        let type_name = std::any::type_name::<V>();
        let reject = |problem| IdentityError::Registration {
            type_name,
            prefix: spec.prefix.clone(),
            problem,
        };

        if spec.prefix.trim().is_empty() {
            return Err(reject(RegistrationProblem::BlankPrefix));
        }
        if spec.prefix.contains(SEPARATOR) {
            return Err(reject(RegistrationProblem::PrefixContainsSeparator));
        }
        if spec.prefix != V::PREFIX {
            return Err(reject(RegistrationProblem::PrefixMismatch {
                expected: V::PREFIX,
            }));
        }
        let Some(from_numeric_id) = spec.from_numeric_id else {
            return Err(reject(RegistrationProblem::MissingNumericConstructor));
        };
        let Some(from_string) = spec.from_string else {
            return Err(reject(RegistrationProblem::MissingStringConstructor));
        };

        let type_id = TypeId::of::<V>();
        let descriptor = VariantDescriptor {
            prefix: Arc::from(spec.prefix.as_str()),
            type_id,
            type_name,
            constructors: Arc::new(Constructors {
                from_numeric_id,
                from_string,
            }),
        };

        let mut tables = self.tables.write();

        // Drop the reverse entry of whichever type owned this prefix before.
        let displaced = tables
            .by_prefix
            .get(&spec.prefix)
            .map(|previous| previous.type_id)
            .filter(|previous| *previous != type_id);
        if let Some(displaced) = displaced {
            tables.by_type.remove(&displaced);
        }

        tables.by_type.insert(type_id, spec.prefix.clone());
        tables.by_prefix.insert(spec.prefix.clone(), descriptor);
        drop(tables);

        info!(prefix = %spec.prefix, type_name, "Registered identity variant");
        Ok(())
    }

    /// Looks up the variant registered for `prefix`.
    pub fn resolve(&self, prefix: &str) -> Result<VariantDescriptor, IdentityError> {
        self.tables
            .read()
            .by_prefix
            .get(prefix)
            .cloned()
            .ok_or_else(|| {
                debug!(prefix, "Unknown identity prefix");
                IdentityError::UnknownVariant {
                    prefix: prefix.to_string(),
                }
            })
    }

    /// Looks up the entry registered for variant `V`.
    pub fn resolve_type<V: Variant>(&self) -> Result<VariantDescriptor, IdentityError> {
        let tables = self.tables.read();
        tables
            .by_type
            .get(&TypeId::of::<V>())
            .and_then(|prefix| tables.by_prefix.get(prefix))
            .cloned()
            .ok_or_else(|| IdentityError::UnknownVariant {
                prefix: V::PREFIX.to_string(),
            })
    }

    /// Returns the prefix `V` is registered under.
    pub fn prefix_of<V: Variant>(&self) -> Option<String> {
        self.tables.read().by_type.get(&TypeId::of::<V>()).cloned()
    }

    /// Returns true if `prefix` is registered.
    pub fn contains(&self, prefix: &str) -> bool {
        self.tables.read().by_prefix.contains_key(prefix)
    }

    /// Returns all registered prefixes, sorted.
    pub fn prefixes(&self) -> Vec<String> {
        let mut prefixes: Vec<String> = self.tables.read().by_prefix.keys().cloned().collect();
        prefixes.sort();
        prefixes
    }

    /// Number of registered variants.
    pub fn len(&self) -> usize {
        self.tables.read().by_prefix.len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.tables.read().by_prefix.is_empty()
    }
}

impl fmt::Debug for VariantRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VariantRegistry")
            .field("prefixes", &self.prefixes())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
