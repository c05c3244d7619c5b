//! Checkout error taxonomy.
//!
//! Every stage of a checkout attempt reports through [`CheckoutError`]. The
//! orchestrator wraps it in a [`CheckoutFailure`](crate::CheckoutFailure) that
//! knows which stage failed and what to tell the shopper. Cart storage
//! problems never surface here: reads fall back to an empty cart and a failed
//! clear is logged by the orchestrator.

use std::time::Duration;

use thiserror::Error;

use kingburger_core::AddressError;

/// Maximum number of characters of a response body kept for diagnostics.
const MAX_BODY_PREVIEW: usize = 512;

/// Errors raised while composing, submitting or paying for an order.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The cart has no items.
    #[error("Cart is empty")]
    EmptyCart,

    /// No bearer token is available.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Delivery information is required but missing, or present but invalid.
    #[error("Invalid delivery address: {0}")]
    InvalidAddress(String),

    /// The order endpoint answered with a non-success status.
    #[error("Order creation failed: {status} - {body}")]
    OrderCreationFailed {
        /// HTTP status code.
        status: u16,
        /// Response body preview.
        body: String,
    },

    /// The order history endpoint answered with a non-success status.
    #[error("Order history request failed: {status} - {body}")]
    OrderHistoryFailed {
        /// HTTP status code.
        status: u16,
        /// Response body preview.
        body: String,
    },

    /// The order endpoint answered successfully but without a usable reference.
    #[error("Malformed order response: {0}")]
    MalformedOrderResponse(String),

    /// No redirect URL could be recovered from the payment response.
    #[error("Payment initiation failed: {0}")]
    PaymentInitiationFailed(String),

    /// A query parameter was out of range.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The request could not be sent or the response could not be read.
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// The request did not complete in time.
    #[error("Request timed out after {}s", .0.as_secs())]
    Timeout(Duration),
}

impl From<AddressError> for CheckoutError {
    fn from(err: AddressError) -> Self {
        Self::InvalidAddress(err.to_string())
    }
}

impl CheckoutError {
    /// Whether the failure happened on the wire rather than in the backend's answer.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Timeout(_))
    }
}

/// Shorten a response body for inclusion in errors and logs.
pub(crate) fn body_preview(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() <= MAX_BODY_PREVIEW {
        return trimmed.to_string();
    }
    let mut preview: String = trimmed.chars().take(MAX_BODY_PREVIEW).collect();
    preview.push('…');
    preview
}
