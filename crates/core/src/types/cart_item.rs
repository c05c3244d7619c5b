//! Cart line and product types.
//!
//! The persisted JSON shape matches what the storefront pages have always
//! written to browser storage: `{"id", "name", "price", "quantity", "image"}`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductId;

/// A product that can be added to the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(rename = "price", with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,
    #[serde(default, rename = "image", skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// A single line in the shopping cart.
///
/// The product ID is the identity key: adding the same product again bumps
/// `quantity` instead of creating a second line. A quantity of zero is never
/// stored; such lines are removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// Product identifier. Older pages wrote this as `_id`.
    #[serde(alias = "_id")]
    pub id: ProductId,
    pub name: String,
    #[serde(
        rename = "price",
        alias = "unit_price",
        with = "rust_decimal::serde::float"
    )]
    pub unit_price: Decimal,
    pub quantity: u32,
    #[serde(
        default,
        rename = "image",
        alias = "image_url",
        skip_serializing_if = "Option::is_none"
    )]
    pub image_url: Option<String>,
}

impl CartItem {
    /// Create a line for one unit of a product.
    #[must_use]
    pub fn from_product(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            unit_price: product.unit_price,
            quantity: 1,
            image_url: product.image_url,
        }
    }

    /// Unit price multiplied by quantity, unrounded.
    ///
    /// Saturates at the `Decimal` bounds instead of panicking.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price.saturating_mul(Decimal::from(self.quantity))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_product_starts_at_one() {
        let product = Product {
            id: ProductId::parse("burger-classic").unwrap(),
            name: "Classic Burger".to_string(),
            unit_price: Decimal::new(8990, 2),
            image_url: None,
        };
        let item = CartItem::from_product(product);
        assert_eq!(item.quantity, 1);
        assert_eq!(item.line_total(), Decimal::new(8990, 2));
    }

    #[test]
    fn test_line_total_multiplies_exactly() {
        let item = CartItem {
            id: ProductId::parse("fries").unwrap(),
            name: "Fries".to_string(),
            unit_price: Decimal::new(1, 1),
            quantity: 3,
            image_url: None,
        };
        assert_eq!(item.line_total(), Decimal::new(3, 1));
    }

    #[test]
    fn test_line_total_saturates_on_huge_price() {
        let item = CartItem {
            id: ProductId::parse("gold").unwrap(),
            name: "Gold Burger".to_string(),
            unit_price: Decimal::MAX,
            quantity: 2,
            image_url: None,
        };
        assert_eq!(item.line_total(), Decimal::MAX);
    }

    #[test]
    fn test_deserialize_legacy_underscore_id() {
        let json = r#"{"_id":"abc123","name":"Milkshake","price":35.5,"quantity":2,"image":"/img/shake.png"}"#;
        let item: CartItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.id.as_str(), "abc123");
        assert_eq!(item.unit_price, Decimal::new(355, 1));
        assert_eq!(item.image_url.as_deref(), Some("/img/shake.png"));
    }

    #[test]
    fn test_serialize_uses_id_and_numeric_price() {
        let item = CartItem {
            id: ProductId::parse("abc123").unwrap(),
            name: "Milkshake".to_string(),
            unit_price: Decimal::new(355, 1),
            quantity: 2,
            image_url: None,
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["id"], "abc123");
        assert!(json.get("_id").is_none());
        assert_eq!(json["price"], 35.5);
        assert!(json.get("image").is_none());
    }
}
