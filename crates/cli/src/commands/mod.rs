//! Subcommand implementations.
//!
//! Output meant for the shopper goes to stdout; diagnostics go through
//! `tracing` to stderr.

pub mod cart;
pub mod checkout;
pub mod orders;
pub mod session;

use kingburger_core::{CurrencyCode, Price};
use rust_decimal::Decimal;

/// Format an amount in the store currency, e.g. `R150.00`.
pub fn format_price(amount: Decimal) -> String {
    Price::new(amount, CurrencyCode::default()).display()
}
