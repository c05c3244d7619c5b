//! Type-safe price representation using decimal arithmetic.
//!
//! Cart math is exact (`Decimal`); rounding to two places only happens at the
//! presentation and wire boundaries via [`round_money`] or [`Price::display`].

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest unit price accepted into a cart (R1,000,000.00).
///
/// Keeps `unit_price × quantity` and cart totals far inside `Decimal`'s range.
pub const MAX_UNIT_PRICE: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// Errors that can occur when validating a unit price.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriceError {
    /// The price is below zero.
    #[error("Price cannot be negative (got {0})")]
    Negative(Decimal),
    /// The price is above [`MAX_UNIT_PRICE`].
    #[error("Price must be at most {max} (got {0})", max = MAX_UNIT_PRICE)]
    TooLarge(Decimal),
}

/// Check that a unit price is within `0..=MAX_UNIT_PRICE`.
///
/// # Errors
///
/// Returns `PriceError` if the price is negative or too large.
pub fn validate_unit_price(price: Decimal) -> Result<(), PriceError> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(PriceError::Negative(price));
    }
    if price > MAX_UNIT_PRICE {
        return Err(PriceError::TooLarge(price));
    }
    Ok(())
}

/// Round an amount to two decimal places for display or transmission.
///
/// Midpoints round away from zero, so `10.005` becomes `10.01`.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., rand, not cents).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Format for display (e.g., "R129.90").
    #[must_use]
    pub fn display(&self) -> String {
        format!("{}{}", self.currency_code.symbol(), round_money(self.amount))
    }
}

/// ISO 4217 currency codes the store trades in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    ZAR,
}

impl CurrencyCode {
    /// Display symbol for the currency.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::ZAR => "R",
        }
    }
}
