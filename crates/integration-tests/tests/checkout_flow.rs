//! Integration tests for the checkout flow.
//!
//! Each test runs a full checkout attempt against a mock backend and checks
//! both the outcome and what happened to the persisted cart.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use kingburger_checkout::{
    CartClearPolicy, CartStore, CheckoutError, CheckoutRequest, CheckoutState, DeliveryPolicy,
    FileStore,
};
use kingburger_core::{DeliveryAddress, PaymentType};
use kingburger_integration_tests::{TEST_TOKEN, TestContext};
use rust_decimal::Decimal;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mock_order_created(server: &MockServer, reference: &str) {
    Mock::given(method("POST"))
        .and(path("/api/orders"))
        .and(header("authorization", format!("Bearer {TEST_TOKEN}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Order created successfully",
            "merchant_reference": reference,
            "total": 175.0,
            "status": "pending"
        })))
        .expect(1)
        .mount(server)
        .await;
}

async fn mock_payment(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/api/create-payment"))
        .respond_with(response)
        .expect(1)
        .mount(server)
        .await;
}

async fn mock_slow_payment(server: &MockServer) {
    mock_payment(
        server,
        ResponseTemplate::new(200)
            .set_body_json(json!({"url": "https://pay.example/sess/late"}))
            .set_delay(Duration::from_secs(3)),
    )
    .await;
}

// ============================================================================
// Successful checkout
// ============================================================================

#[tokio::test]
async fn test_checkout_success_clears_cart() {
    let ctx = TestContext::new().await.logged_in();
    ctx.add("burger-1", "Classic", 7500, 2);
    ctx.add("fries", "Fries", 2500, 1);

    Mock::given(method("POST"))
        .and(path("/api/orders"))
        .and(body_json(json!({
            "payment_type": "card",
            "items": [
                {"id": "burger-1", "name": "Classic", "price": 75.0, "quantity": 2},
                {"id": "fries", "name": "Fries", "price": 25.0, "quantity": 1}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "merchant_reference": "PAY-20250101120000-ABC123",
            "total": 175.0,
            "status": "pending"
        })))
        .expect(1)
        .mount(&ctx.server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/create-payment"))
        .and(body_json(json!({
            "payment_type": "card",
            "amount": 175.0,
            "merchant_reference": "PAY-20250101120000-ABC123"
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"url": "https://pay.example/sess/1"})),
        )
        .expect(1)
        .mount(&ctx.server)
        .await;

    let receipt = ctx
        .checkout
        .checkout(CheckoutRequest::default())
        .await
        .unwrap();

    assert_eq!(receipt.redirect_url.as_str(), "https://pay.example/sess/1");
    assert_eq!(
        receipt.merchant_reference.as_str(),
        "PAY-20250101120000-ABC123"
    );
    assert_eq!(receipt.amount, Decimal::new(175, 0));
    assert_eq!(
        receipt.attempt.trail(),
        &[
            CheckoutState::Idle,
            CheckoutState::Composing,
            CheckoutState::OrderPending,
            CheckoutState::PaymentPending,
            CheckoutState::Redirecting,
        ]
    );
    assert!(ctx.checkout.cart().get_cart().is_empty());
}

#[tokio::test]
async fn test_checkout_recovers_url_from_raw_text() {
    let ctx = TestContext::new().await.logged_in();
    ctx.add("burger-1", "Classic", 7500, 1);

    mock_order_created(&ctx.server, "PAY-2").await;
    mock_payment(
        &ctx.server,
        ResponseTemplate::new(200).set_body_string("Redirect to https://pay.example/sess/2 now"),
    )
    .await;

    let receipt = ctx
        .checkout
        .checkout(CheckoutRequest {
            payment_type: PaymentType::Eft,
            delivery_address: None,
        })
        .await
        .unwrap();

    assert_eq!(receipt.redirect_url.as_str(), "https://pay.example/sess/2");
    assert!(ctx.checkout.cart().get_cart().is_empty());
}

#[tokio::test]
async fn test_checkout_with_delivery_address() {
    let ctx = TestContext::new().await.logged_in();
    ctx.add("burger-1", "Classic", 7500, 1);

    Mock::given(method("POST"))
        .and(path("/api/orders"))
        .and(body_json(json!({
            "payment_type": "eft",
            "items": [{"id": "burger-1", "name": "Classic", "price": 75.0, "quantity": 1}],
            "delivery_address": {
                "street": "1 Main Road",
                "city": "Durban",
                "postal_code": "4001",
                "country": "South Africa"
            }
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"merchant_reference": "PAY-3"})),
        )
        .expect(1)
        .mount(&ctx.server)
        .await;
    mock_payment(
        &ctx.server,
        ResponseTemplate::new(200)
            .set_body_json(json!({"response": {"url": "https://pay.example/sess/3"}})),
    )
    .await;

    let checkout = ctx.checkout.with_delivery_policy(DeliveryPolicy::Required);
    let receipt = checkout
        .checkout(CheckoutRequest {
            payment_type: PaymentType::Eft,
            delivery_address: Some(DeliveryAddress {
                address_name: None,
                street: "1 Main Road".to_string(),
                suburb: None,
                city: "Durban".to_string(),
                postal_code: "4001".to_string(),
                country: "South Africa".to_string(),
            }),
        })
        .await
        .unwrap();

    assert_eq!(receipt.redirect_url.as_str(), "https://pay.example/sess/3");
}

// ============================================================================
// Failures before any request
// ============================================================================

#[tokio::test]
async fn test_empty_cart_makes_no_request() {
    let ctx = TestContext::new().await.logged_in();
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&ctx.server)
        .await;

    let failure = ctx
        .checkout
        .checkout(CheckoutRequest::default())
        .await
        .unwrap_err();

    assert!(matches!(failure.error, CheckoutError::EmptyCart));
    assert_eq!(failure.stage, CheckoutState::Composing);
    assert_eq!(failure.user_message(), "Your cart is empty.");
}

#[tokio::test]
async fn test_missing_token_makes_no_request() {
    let ctx = TestContext::new().await;
    ctx.add("burger-1", "Classic", 7500, 1);
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&ctx.server)
        .await;

    let failure = ctx
        .checkout
        .checkout(CheckoutRequest::default())
        .await
        .unwrap_err();

    assert!(matches!(failure.error, CheckoutError::NotAuthenticated));
    assert_eq!(ctx.checkout.cart().get_cart().len(), 1);
}

#[tokio::test]
async fn test_required_address_missing_makes_no_request() {
    let ctx = TestContext::new().await.logged_in();
    ctx.add("burger-1", "Classic", 7500, 1);
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&ctx.server)
        .await;

    let checkout = ctx.checkout.with_delivery_policy(DeliveryPolicy::Required);
    let failure = checkout
        .checkout(CheckoutRequest::default())
        .await
        .unwrap_err();

    assert!(matches!(failure.error, CheckoutError::InvalidAddress(_)));
    assert!(failure.cart_preserved);
}

// ============================================================================
// Order failures
// ============================================================================

#[tokio::test]
async fn test_order_without_reference_preserves_cart() {
    let ctx = TestContext::new().await.logged_in();
    ctx.add("burger-1", "Classic", 7500, 1);

    Mock::given(method("POST"))
        .and(path("/api/orders"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "ok"})))
        .expect(1)
        .mount(&ctx.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/create-payment"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&ctx.server)
        .await;

    let failure = ctx
        .checkout
        .checkout(CheckoutRequest::default())
        .await
        .unwrap_err();

    assert!(matches!(
        failure.error,
        CheckoutError::MalformedOrderResponse(_)
    ));
    assert_eq!(failure.stage, CheckoutState::OrderPending);
    assert!(failure.cart_preserved);
    assert_eq!(ctx.checkout.cart().get_cart().len(), 1);
}

#[tokio::test]
async fn test_order_server_error() {
    let ctx = TestContext::new().await.logged_in();
    ctx.add("burger-1", "Classic", 7500, 1);

    Mock::given(method("POST"))
        .and(path("/api/orders"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(json!({"detail": "Order creation failed: db down"})),
        )
        .expect(1)
        .mount(&ctx.server)
        .await;

    let failure = ctx
        .checkout
        .checkout(CheckoutRequest::default())
        .await
        .unwrap_err();

    assert!(matches!(
        failure.error,
        CheckoutError::OrderCreationFailed { status: 500, .. }
    ));
    assert_eq!(
        failure.user_message(),
        "We could not create your order. Please try again."
    );
    assert_eq!(ctx.checkout.cart().get_cart().len(), 1);
}

#[tokio::test]
async fn test_order_timeout_preserves_cart() {
    let ctx = TestContext::with_store(
        Arc::new(kingburger_checkout::MemoryStore::new()),
        Duration::from_secs(1),
    )
    .await
    .logged_in();
    ctx.add("burger-1", "Classic", 7500, 1);

    Mock::given(method("POST"))
        .and(path("/api/orders"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"merchant_reference": "PAY-late"}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&ctx.server)
        .await;

    let failure = ctx
        .checkout
        .checkout(CheckoutRequest::default())
        .await
        .unwrap_err();

    assert!(matches!(failure.error, CheckoutError::Timeout(_)));
    assert_eq!(failure.stage, CheckoutState::OrderPending);
    assert_eq!(ctx.checkout.cart().get_cart().len(), 1);
}

// ============================================================================
// Payment failures and cart clear policy
// ============================================================================

#[tokio::test]
async fn test_payment_without_url_preserves_cart() {
    let ctx = TestContext::new().await.logged_in();
    ctx.add("burger-1", "Classic", 7500, 1);

    mock_order_created(&ctx.server, "PAY-4").await;
    mock_payment(&ctx.server, ResponseTemplate::new(200).set_body_json(json!({}))).await;

    let failure = ctx
        .checkout
        .checkout(CheckoutRequest::default())
        .await
        .unwrap_err();

    assert!(matches!(
        failure.error,
        CheckoutError::PaymentInitiationFailed(_)
    ));
    assert_eq!(failure.stage, CheckoutState::PaymentPending);
    assert_eq!(failure.attempt.state(), CheckoutState::Failed);
    assert!(failure.cart_preserved);
    assert_eq!(ctx.checkout.cart().get_cart().len(), 1);
}

#[tokio::test]
async fn test_eager_policy_clears_cart_on_payment_failure() {
    let ctx = TestContext::new().await.logged_in();
    ctx.add("burger-1", "Classic", 7500, 1);

    mock_order_created(&ctx.server, "PAY-5").await;
    mock_payment(
        &ctx.server,
        ResponseTemplate::new(200).set_body_string("Payment service unavailable"),
    )
    .await;

    let checkout = ctx
        .checkout
        .with_cart_clear_policy(CartClearPolicy::OnPaymentAttempt);
    let failure = checkout
        .checkout(CheckoutRequest::default())
        .await
        .unwrap_err();

    assert!(matches!(
        failure.error,
        CheckoutError::PaymentInitiationFailed(_)
    ));
    assert!(!failure.cart_preserved);
    assert!(checkout.cart().get_cart().is_empty());
}

#[tokio::test]
async fn test_payment_error_status_with_url_still_redirects() {
    let ctx = TestContext::new().await.logged_in();
    ctx.add("burger-1", "Classic", 7500, 1);

    mock_order_created(&ctx.server, "PAY-6").await;
    mock_payment(
        &ctx.server,
        ResponseTemplate::new(502).set_body_json(
            json!({"raw_response": "<html><a href=\"https://pay.example/sess/6\">Pay</a></html>"}),
        ),
    )
    .await;

    let receipt = ctx
        .checkout
        .checkout(CheckoutRequest::default())
        .await
        .unwrap();
    assert_eq!(receipt.redirect_url.as_str(), "https://pay.example/sess/6");
}

#[tokio::test]
async fn test_payment_nested_raw_response_redirects() {
    let ctx = TestContext::new().await.logged_in();
    ctx.add("burger-1", "Classic", 7500, 1);

    mock_order_created(&ctx.server, "PAY-9").await;
    mock_payment(
        &ctx.server,
        ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "response": {
                "raw_response": "<html><a href=\"https://pay.example/sess/9\">Pay</a></html>"
            }
        })),
    )
    .await;

    let receipt = ctx
        .checkout
        .checkout(CheckoutRequest::default())
        .await
        .unwrap();
    assert_eq!(receipt.redirect_url.as_str(), "https://pay.example/sess/9");
    assert!(ctx.checkout.cart().get_cart().is_empty());
}

#[tokio::test]
async fn test_payment_timeout_preserves_cart() {
    let ctx = TestContext::with_store(
        Arc::new(kingburger_checkout::MemoryStore::new()),
        Duration::from_secs(1),
    )
    .await
    .logged_in();
    ctx.add("burger-1", "Classic", 7500, 2);

    mock_order_created(&ctx.server, "PAY-10").await;
    mock_slow_payment(&ctx.server).await;

    let failure = ctx
        .checkout
        .checkout(CheckoutRequest::default())
        .await
        .unwrap_err();

    assert!(matches!(failure.error, CheckoutError::Timeout(_)));
    assert_eq!(failure.stage, CheckoutState::PaymentPending);
    assert!(failure.cart_preserved);
    assert_eq!(
        failure.user_message(),
        "We could not reach the payment service. Please try again."
    );
    let cart = ctx.checkout.cart().get_cart();
    assert_eq!(cart.len(), 1);
    assert_eq!(cart.first().unwrap().quantity, 2);
}

#[tokio::test]
async fn test_eager_policy_keeps_cart_on_payment_timeout() {
    let ctx = TestContext::with_store(
        Arc::new(kingburger_checkout::MemoryStore::new()),
        Duration::from_secs(1),
    )
    .await
    .logged_in();
    ctx.add("burger-1", "Classic", 7500, 1);

    mock_order_created(&ctx.server, "PAY-11").await;
    mock_slow_payment(&ctx.server).await;

    let checkout = ctx
        .checkout
        .with_cart_clear_policy(CartClearPolicy::OnPaymentAttempt);
    let failure = checkout
        .checkout(CheckoutRequest::default())
        .await
        .unwrap_err();

    // No payment response arrived, so the eager clear never ran.
    assert!(matches!(failure.error, CheckoutError::Timeout(_)));
    assert_eq!(failure.stage, CheckoutState::PaymentPending);
    assert!(failure.cart_preserved);
    assert_eq!(checkout.cart().get_cart().len(), 1);
}

// ============================================================================
// File-backed storage
// ============================================================================

#[tokio::test]
async fn test_checkout_with_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileStore::new(dir.path()));
    let ctx = TestContext::with_store(store, Duration::from_secs(5))
        .await
        .logged_in();
    ctx.add("burger-1", "Classic", 7500, 3);

    // A second handle on the same directory sees the persisted cart.
    let reader = CartStore::new(FileStore::new(dir.path()));
    assert_eq!(reader.get_cart().first().unwrap().quantity, 3);

    mock_order_created(&ctx.server, "PAY-7").await;
    mock_payment(
        &ctx.server,
        ResponseTemplate::new(200).set_body_json(json!({"url": "https://pay.example/sess/7"})),
    )
    .await;

    ctx.checkout
        .checkout(CheckoutRequest::default())
        .await
        .unwrap();

    assert!(reader.get_cart().is_empty());
}
