//! Integration tests for the King Burger checkout.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p kingburger-integration-tests
//! ```
//!
//! Every test starts its own [`MockServer`] standing in for the backend, so
//! nothing outside the process is needed.
//!
//! # Test Categories
//!
//! - `checkout_flow` - Full checkout attempts: success, failure and cart handling
//! - `order_history` - Order history paging and filters

use std::sync::Arc;
use std::time::Duration;

use kingburger_checkout::{
    ApiConfig, Checkout, KeyValueStore, MemoryStore, OrderGateway, PaymentInitiator,
};
use kingburger_core::{Product, ProductId};
use rust_decimal::Decimal;
use secrecy::SecretString;
use url::Url;
use wiremock::MockServer;

/// Token stored by [`TestContext::logged_in`].
pub const TEST_TOKEN: &str = "test-token";

/// Backend mock plus an orchestrator pointed at it.
pub struct TestContext<S> {
    pub server: MockServer,
    pub checkout: Checkout<S>,
}

impl TestContext<Arc<MemoryStore>> {
    /// Fresh mock backend and empty in-memory storage.
    pub async fn new() -> Self {
        Self::with_store(Arc::new(MemoryStore::new()), Duration::from_secs(5)).await
    }
}

impl<S: KeyValueStore + Clone> TestContext<S> {
    /// Fresh mock backend over the given storage and request timeout.
    ///
    /// # Panics
    ///
    /// Panics if the mock server URI cannot be used as an API base.
    #[allow(clippy::unwrap_used)]
    pub async fn with_store(store: S, timeout: Duration) -> Self {
        let server = MockServer::start().await;
        let api = ApiConfig::new(Url::parse(&server.uri()).unwrap(), timeout).unwrap();
        let checkout = Checkout::new(
            store,
            OrderGateway::new(&api).unwrap(),
            PaymentInitiator::new(&api).unwrap(),
        );
        Self { server, checkout }
    }

    /// Store [`TEST_TOKEN`] as the session token.
    ///
    /// # Panics
    ///
    /// Panics if storage cannot be written.
    #[allow(clippy::unwrap_used)]
    #[must_use]
    pub fn logged_in(self) -> Self {
        self.checkout
            .session()
            .set_auth_token(&SecretString::from(TEST_TOKEN))
            .unwrap();
        self
    }

    /// Add `quantity` units of a product priced in cents.
    ///
    /// # Panics
    ///
    /// Panics if the cart cannot be written.
    #[allow(clippy::unwrap_used)]
    pub fn add(&self, id: &str, name: &str, cents: i64, quantity: u32) {
        for _ in 0..quantity {
            self.checkout
                .cart()
                .add_to_cart(Product {
                    id: ProductId::parse(id).unwrap(),
                    name: name.to_string(),
                    unit_price: Decimal::new(cents, 2),
                    image_url: None,
                })
                .unwrap();
        }
    }
}
