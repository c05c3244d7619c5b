//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing identifiers from different entity types. All IDs used
//! by the checkout are opaque strings issued by the backend.

use thiserror::Error;

/// Maximum accepted length of an identifier, in bytes.
pub const MAX_ID_LENGTH: usize = 128;

/// Errors that can occur when parsing an identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    /// The input is empty or whitespace only.
    #[error("{kind} cannot be empty")]
    Empty {
        /// Name of the ID type being parsed.
        kind: &'static str,
    },
    /// The input is too long.
    #[error("{kind} must be at most {max} characters")]
    TooLong {
        /// Name of the ID type being parsed.
        kind: &'static str,
        /// Maximum allowed length.
        max: usize,
    },
}

/// Macro to define a type-safe string ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` as a plain string, rejecting blank values
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - `parse()`, `as_str()`, `into_inner()`
/// - `Display`, `FromStr`, `AsRef<str>` and `TryFrom<String>`
///
/// Surrounding whitespace is trimmed on parse.
///
/// # Example
///
/// ```rust
/// # use kingburger_core::define_id;
/// define_id!(CouponId);
/// define_id!(StoreId);
///
/// let coupon = CouponId::parse("SUMMER").unwrap();
/// let store = StoreId::parse("SUMMER").unwrap();
///
/// // These are different types, so this won't compile:
/// // let _: CouponId = store;
/// # let _ = (coupon, store);
/// ```
#[macro_export]
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Parse an ID from a string, trimming surrounding whitespace.
            ///
            /// # Errors
            ///
            /// Returns an error if the input is blank or longer than
            /// `MAX_ID_LENGTH` bytes.
            pub fn parse(id: impl AsRef<str>) -> ::core::result::Result<Self, $crate::IdError> {
                let id = id.as_ref().trim();
                if id.is_empty() {
                    return Err($crate::IdError::Empty {
                        kind: stringify!($name),
                    });
                }
                if id.len() > $crate::MAX_ID_LENGTH {
                    return Err($crate::IdError::TooLong {
                        kind: stringify!($name),
                        max: $crate::MAX_ID_LENGTH,
                    });
                }
                Ok(Self(id.to_owned()))
            }

            /// Returns the ID as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consumes the ID and returns its inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.pad(&self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = $crate::IdError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl ::core::convert::TryFrom<String> for $name {
            type Error = $crate::IdError;

            fn try_from(value: String) -> ::core::result::Result<Self, Self::Error> {
                Self::parse(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(
    /// Stable product identifier; the identity key of a cart line.
    ProductId
);

define_id!(
    /// Backend-issued reference correlating an order with its payment session.
    MerchantReference
);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims_whitespace() {
        let id = ProductId::parse("  burger-1 ").unwrap();
        assert_eq!(id.as_str(), "burger-1");
    }

    #[test]
    fn test_parse_blank_rejected() {
        assert!(matches!(
            MerchantReference::parse("   "),
            Err(IdError::Empty {
                kind: "MerchantReference"
            })
        ));
    }

    #[test]
    fn test_parse_too_long() {
        let long = "x".repeat(MAX_ID_LENGTH + 1);
        assert!(matches!(
            ProductId::parse(&long),
            Err(IdError::TooLong { .. })
        ));
    }

    #[test]
    fn test_serde_rejects_empty_string() {
        let result: Result<ProductId, _> = serde_json::from_str(r#""""#);
        assert!(result.is_err());
    }

    #[test]
    fn test_serde_is_plain_string() {
        let reference = MerchantReference::parse("PAY-20250101120000-AB12CD").unwrap();
        let json = serde_json::to_string(&reference).unwrap();
        assert_eq!(json, r#""PAY-20250101120000-AB12CD""#);
    }
}
