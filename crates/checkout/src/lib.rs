//! King Burger checkout library.
//!
//! Owns the client-side cart and the checkout conversation with the backend:
//!
//! 1. [`cart::CartStore`] keeps the persisted cart (product → quantity)
//! 2. [`order::compose_order`] snapshots the cart into an order submission
//! 3. [`order::OrderGateway`] creates the order and returns its merchant reference
//! 4. [`payment::PaymentInitiator`] asks for a payment session and recovers a redirect URL
//! 5. [`checkout::Checkout`] sequences the above and only clears the cart once a
//!    payment URL is in hand
//!
//! Persistence goes through the [`storage::KeyValueStore`] port so the same code
//! runs against an in-memory map in tests and a directory of files in the CLI.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod checkout;
pub mod config;
pub mod error;
mod http;
pub mod order;
pub mod payment;
pub mod session;
pub mod storage;

pub use cart::{CartError, CartStore, item_count, recalc_total};
pub use checkout::{
    CartClearPolicy, Checkout, CheckoutAttempt, CheckoutFailure, CheckoutReceipt,
    CheckoutRequest, CheckoutState,
};
pub use config::{ApiConfig, CheckoutConfig, ConfigError};
pub use error::CheckoutError;
pub use order::{
    DeliveryPolicy, OrderCreated, OrderGateway, OrderHistoryPage, OrderHistoryQuery, OrderLine,
    OrderRequest, OrderSummary, OrderSummaryLine, compose_order,
};
pub use payment::{PaymentInitiator, PaymentSessionResult, extract_embedded_url};
pub use session::SessionStore;
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
