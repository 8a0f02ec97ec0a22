//! Macros for defining typed identity variants.

/// Macro to define a typed identity with a specific prefix.
///
/// This generates a newtype wrapper around [`Identity`](crate::Identity) with:
/// - A `PREFIX` constant
/// - `from_numeric_id()` to build the canonical form
/// - `parse()` to parse from string (the prefix must match)
/// - `Display` and `FromStr` implementations
/// - `Serialize` and `Deserialize` implementations
/// - `Ord`, `Hash`, and other standard traits
/// - A [`Variant`](crate::Variant) implementation
///
/// # Example
///
/// ```ignore
/// define_identity!(UserId, "user");
/// define_identity!(OrderId, "order");
///
/// let user = UserId::from_numeric_id(42)?;
/// let parsed: OrderId = "order/0042".parse()?;
/// ```
#[macro_export]
macro_rules! define_identity {
    ($name:ident, $prefix:literal) => {
        /// A typed identity for this entity kind.
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name($crate::Identity);

        impl $name {
            /// The prefix for this identity type.
            pub const PREFIX: &'static str = $prefix;

            /// Creates the identity `<PREFIX>/<numeric_id>`.
            pub fn from_numeric_id(numeric_id: i64) -> Result<Self, $crate::IdError> {
                $crate::Identity::from_numeric_id(Self::PREFIX, numeric_id).map(Self)
            }

            /// Parses an identity from a string.
            ///
            /// The string must be in the format `{prefix}/{digits}`.
            pub fn parse(s: &str) -> Result<Self, $crate::IdError> {
                let identity = $crate::Identity::parse(s)?;

                if identity.prefix() != Self::PREFIX {
                    return Err($crate::IdError::InvalidPrefix {
                        expected: Self::PREFIX,
                        actual: identity.prefix().to_string(),
                    });
                }

                Ok(Self(identity))
            }

            /// Returns the text form.
            #[must_use]
            pub fn value(&self) -> &str {
                self.0.value()
            }

            /// Returns the parsed numeric id.
            #[must_use]
            pub const fn numeric_id(&self) -> i64 {
                self.0.numeric_id()
            }
        }

        impl $crate::Variant for $name {
            const PREFIX: &'static str = $prefix;

            fn from_numeric_id(numeric_id: i64) -> Result<Self, $crate::IdError> {
                Self::from_numeric_id(numeric_id)
            }

            fn from_string(value: &str) -> Result<Self, $crate::IdError> {
                Self::parse(value)
            }

            fn identity(&self) -> &$crate::Identity {
                &self.0
            }

            fn into_identity(self) -> $crate::Identity {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                std::fmt::Display::fmt(&self.0, f)
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl $crate::serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: $crate::serde::Serializer,
            {
                serializer.serialize_str(self.0.value())
            }
        }

        impl<'de> $crate::serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: $crate::serde::Deserializer<'de>,
            {
                let s = <String as $crate::serde::Deserialize>::deserialize(deserializer)?;
                Self::parse(&s).map_err($crate::serde::de::Error::custom)
            }
        }

        impl AsRef<$crate::Identity> for $name {
            fn as_ref(&self) -> &$crate::Identity {
                &self.0
            }
        }

        impl From<$name> for $crate::Identity {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}
