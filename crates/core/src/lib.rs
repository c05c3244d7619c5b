//! King Burger Core - Shared domain types.
//!
//! This crate provides the types shared by the checkout library and the CLI:
//! - `checkout` - Cart store, order and payment clients, checkout orchestration
//! - `cli` - Command-line front end (`kb-cli`)
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no storage
//! access, no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Identifiers, prices, payment/order statuses, addresses and cart items

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
