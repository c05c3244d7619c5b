//! Order composition and submission.
//!
//! [`compose_order`] turns a cart snapshot into an [`OrderRequest`];
//! [`OrderGateway`] sends it to the backend and returns the merchant reference
//! used to correlate the payment.

mod gateway;

use rust_decimal::Decimal;
use serde::Serialize;

use kingburger_core::{CartItem, DeliveryAddress, PaymentType, ProductId};

use crate::cart::recalc_total;
use crate::error::CheckoutError;

pub use gateway::{
    OrderCreated, OrderGateway, OrderHistoryPage, OrderHistoryQuery, OrderSummary,
    OrderSummaryLine,
};

/// Whether the checkout flow needs a delivery address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeliveryPolicy {
    /// An address may be attached; if attached it must be valid.
    #[default]
    Optional,
    /// An address must be attached.
    Required,
}

/// One cart line as sent to the order endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderLine {
    pub id: ProductId,
    pub name: String,
    #[serde(rename = "price", with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,
    pub quantity: u32,
}

impl From<&CartItem> for OrderLine {
    fn from(item: &CartItem) -> Self {
        Self {
            id: item.id.clone(),
            name: item.name.clone(),
            unit_price: item.unit_price,
            quantity: item.quantity,
        }
    }
}

/// Order submission body.
///
/// Built fresh for every checkout attempt from the cart as it is at that
/// moment; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderRequest {
    pub payment_type: PaymentType,
    pub items: Vec<OrderLine>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_address: Option<DeliveryAddress>,
}

impl OrderRequest {
    /// Exact total of the submitted lines.
    ///
    /// This is the amount the payment for this order must be requested for.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.items
            .iter()
            .map(|line| line.unit_price.saturating_mul(Decimal::from(line.quantity)))
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }
}

/// Build an order submission from a cart snapshot.
///
/// # Errors
///
/// - `CheckoutError::EmptyCart` if `cart` has no items
/// - `CheckoutError::InvalidAddress` if the policy requires an address and
///   none is given, or if the given address fails validation
pub fn compose_order(
    payment_type: PaymentType,
    cart: &[CartItem],
    delivery_address: Option<DeliveryAddress>,
    policy: DeliveryPolicy,
) -> Result<OrderRequest, CheckoutError> {
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    match (&delivery_address, policy) {
        (Some(address), _) => address.validate()?,
        (None, DeliveryPolicy::Required) => {
            return Err(CheckoutError::InvalidAddress(
                "a delivery address is required".to_string(),
            ));
        }
        (None, DeliveryPolicy::Optional) => {}
    }

    let request = OrderRequest {
        payment_type,
        items: cart.iter().map(OrderLine::from).collect(),
        delivery_address,
    };
    debug_assert_eq!(request.total(), recalc_total(cart));

    Ok(request)
}
