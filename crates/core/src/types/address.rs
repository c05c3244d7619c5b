//! Delivery address type.

use serde::{Deserialize, Serialize};

/// Errors that can occur when validating a [`DeliveryAddress`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    /// A required field is empty.
    #[error("{0} cannot be empty")]
    MissingField(&'static str),
    /// A field is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong {
        /// Name of the offending field.
        field: &'static str,
        /// Maximum allowed length.
        max: usize,
    },
}

/// A delivery address attached to an order.
///
/// ## Constraints
///
/// - `street`, `city`, `postal_code` and `country` must not be blank
/// - Every field is at most 255 characters
/// - `address_name` (e.g. "Home") and `suburb` are optional
///
/// ## Examples
///
/// ```
/// use kingburger_core::DeliveryAddress;
///
/// let address = DeliveryAddress {
///     address_name: Some("Home".to_string()),
///     street: "12 Long Street".to_string(),
///     suburb: None,
///     city: "Cape Town".to_string(),
///     postal_code: "8001".to_string(),
///     country: "South Africa".to_string(),
/// };
/// assert!(address.validate().is_ok());
///
/// let incomplete = DeliveryAddress { city: String::new(), ..address };
/// assert!(incomplete.validate().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryAddress {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_name: Option<String>,
    pub street: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suburb: Option<String>,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

impl DeliveryAddress {
    /// Maximum length of any address field.
    pub const MAX_FIELD_LENGTH: usize = 255;

    /// Check that all required fields are present and within limits.
    ///
    /// # Errors
    ///
    /// Returns the first field that is blank or too long.
    pub fn validate(&self) -> Result<(), AddressError> {
        let required = [
            ("street", self.street.as_str()),
            ("city", self.city.as_str()),
            ("postal_code", self.postal_code.as_str()),
            ("country", self.country.as_str()),
        ];

        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(AddressError::MissingField(field));
            }
        }

        let optional = [
            ("address_name", self.address_name.as_deref()),
            ("suburb", self.suburb.as_deref()),
        ];

        let all = required
            .into_iter()
            .chain(optional.into_iter().filter_map(|(f, v)| v.map(|v| (f, v))));
        for (field, value) in all {
            if value.len() > Self::MAX_FIELD_LENGTH {
                return Err(AddressError::TooLong {
                    field,
                    max: Self::MAX_FIELD_LENGTH,
                });
            }
        }

        Ok(())
    }
}
