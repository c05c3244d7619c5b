//! Persisted shopping cart.
//!
//! The cart is a JSON array of [`CartItem`] stored under [`CART_STORAGE_KEY`].
//! Every mutation reads the current cart, applies the change and writes the
//! whole array back in a single `set`.
//!
//! Reads never fail: an absent, unreadable or malformed value is reported
//! through `tracing` and treated as an empty cart.

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{info, warn};

use kingburger_core::{CartItem, PriceError, Product, ProductId, validate_unit_price};

use crate::storage::{KeyValueStore, StorageError};

/// Storage key holding the serialized cart.
pub const CART_STORAGE_KEY: &str = "checkoutCart";

/// Errors that can occur when persisting the cart.
#[derive(Debug, Error)]
pub enum CartError {
    /// Storage backend failed.
    #[error("Cart storage error: {0}")]
    Storage(#[from] StorageError),

    /// Cart could not be serialized.
    #[error("Cart serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Quantity would exceed the representable maximum.
    #[error("Quantity limit reached for product {0}")]
    QuantityOverflow(ProductId),

    /// Product price is negative or above the accepted maximum.
    #[error("Invalid price: {0}")]
    InvalidPrice(#[from] PriceError),
}

/// Sum of `unit_price × quantity` over all lines.
///
/// Exact and unrounded; round with [`kingburger_core::round_money`] when
/// displaying or sending the amount. Saturates instead of panicking.
#[must_use]
pub fn recalc_total(cart: &[CartItem]) -> Decimal {
    cart.iter()
        .map(CartItem::line_total)
        .fold(Decimal::ZERO, Decimal::saturating_add)
}

/// Total number of units across all lines.
#[must_use]
pub fn item_count(cart: &[CartItem]) -> u64 {
    cart.iter().map(|item| u64::from(item.quantity)).sum()
}

/// Cart persisted in a [`KeyValueStore`].
#[derive(Debug, Clone)]
pub struct CartStore<S> {
    store: S,
}

impl<S: KeyValueStore> CartStore<S> {
    /// Create a cart store over `store`.
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Read the persisted cart.
    ///
    /// Returns an empty cart when nothing is stored, when storage cannot be
    /// read, or when the stored value is not a valid cart. Lines with a zero
    /// quantity or an out-of-range price are dropped and duplicate IDs merged.
    pub fn get_cart(&self) -> Vec<CartItem> {
        let raw = match self.store.get(CART_STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(error = %e, "Failed to read cart, treating as empty");
                return Vec::new();
            }
        };

        if raw.trim().is_empty() || raw.trim() == "null" {
            return Vec::new();
        }

        match serde_json::from_str::<Vec<CartItem>>(&raw) {
            Ok(items) => normalize(items),
            Err(e) => {
                warn!(error = %e, "Persisted cart is corrupt, treating as empty");
                Vec::new()
            }
        }
    }

    /// Overwrite the persisted cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be serialized or written.
    pub fn save_cart(&self, cart: &[CartItem]) -> Result<(), CartError> {
        let json = serde_json::to_string(cart)?;
        self.store.set(CART_STORAGE_KEY, &json)?;
        Ok(())
    }

    /// Add one unit of `product`.
    ///
    /// Increments the existing line for the product or appends a new line with
    /// quantity 1. Returns the updated line so the caller can confirm the
    /// addition to the user.
    ///
    /// # Errors
    ///
    /// Returns an error if the price is out of range, the cart cannot be
    /// persisted, or the quantity would overflow.
    pub fn add_to_cart(&self, product: Product) -> Result<CartItem, CartError> {
        validate_unit_price(product.unit_price)?;
        let mut cart = self.get_cart();

        let line = if let Some(existing) = cart.iter_mut().find(|item| item.id == product.id) {
            existing.quantity = existing
                .quantity
                .checked_add(1)
                .ok_or_else(|| CartError::QuantityOverflow(product.id.clone()))?;
            existing.clone()
        } else {
            let item = CartItem::from_product(product);
            cart.push(item.clone());
            item
        };

        self.save_cart(&cart)?;
        info!(product_id = %line.id, quantity = line.quantity, "{} added to cart", line.name);
        Ok(line)
    }

    /// Remove one unit of the product, dropping the line when it reaches zero.
    ///
    /// Returns the updated cart. Unknown IDs leave the cart unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted.
    pub fn remove_one(&self, id: &ProductId) -> Result<Vec<CartItem>, CartError> {
        let mut cart = self.get_cart();
        if let Some(item) = cart.iter_mut().find(|item| &item.id == id) {
            item.quantity = item.quantity.saturating_sub(1);
        }
        cart.retain(|item| item.quantity > 0);
        self.save_cart(&cart)?;
        Ok(cart)
    }

    /// Remove every line with the given product ID and return the updated cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted.
    pub fn delete_cart_item(&self, id: &ProductId) -> Result<Vec<CartItem>, CartError> {
        let mut cart = self.get_cart();
        cart.retain(|item| &item.id != id);
        self.save_cart(&cart)?;
        Ok(cart)
    }

    /// Remove all persisted cart state.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be written.
    pub fn clear_cart(&self) -> Result<(), CartError> {
        self.store.remove(CART_STORAGE_KEY)?;
        Ok(())
    }
}

/// Enforce the cart invariants on data read back from storage.
fn normalize(items: Vec<CartItem>) -> Vec<CartItem> {
    let mut cart: Vec<CartItem> = Vec::with_capacity(items.len());
    for item in items {
        if item.quantity == 0 {
            warn!(product_id = %item.id, "Dropping zero-quantity cart line");
            continue;
        }
        if let Err(e) = validate_unit_price(item.unit_price) {
            warn!(product_id = %item.id, error = %e, "Dropping cart line with invalid price");
            continue;
        }
        if let Some(existing) = cart.iter_mut().find(|line| line.id == item.id) {
            warn!(product_id = %item.id, "Merging duplicate cart line");
            existing.quantity = existing.quantity.saturating_add(item.quantity);
        } else {
            cart.push(item);
        }
    }
    cart
}
