//! Core types for King Burger.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod address;
pub mod cart_item;
pub mod id;
pub mod price;
pub mod status;

pub use address::{AddressError, DeliveryAddress};
pub use cart_item::{CartItem, Product};
pub use id::*;
pub use price::{
    CurrencyCode, MAX_UNIT_PRICE, Price, PriceError, round_money, validate_unit_price,
};
pub use status::*;
