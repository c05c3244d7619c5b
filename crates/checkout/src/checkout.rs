//! Checkout orchestration.
//!
//! A checkout attempt walks a fixed path:
//!
//! ```text
//! Idle → Composing → OrderPending → PaymentPending → Redirecting
//!            ↘            ↘               ↘
//!                        Failed
//! ```
//!
//! Each attempt gets its own id and records the states it passed through. The
//! cart is only cleared once a payment URL is in hand (unless the eager
//! [`CartClearPolicy::OnPaymentAttempt`] is configured), so a failed attempt
//! leaves the shopper's cart intact for the next one.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use tracing::{Instrument, info, info_span, warn};
use url::Url;
use uuid::Uuid;

use kingburger_core::{DeliveryAddress, MerchantReference, PaymentType, round_money};

use crate::cart::CartStore;
use crate::config::CheckoutConfig;
use crate::error::CheckoutError;
use crate::order::{
    DeliveryPolicy, OrderGateway, OrderHistoryPage, OrderHistoryQuery, compose_order,
};
use crate::payment::PaymentInitiator;
use crate::session::SessionStore;
use crate::storage::KeyValueStore;

// =============================================================================
// Policies
// =============================================================================

/// When the cart is emptied during checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CartClearPolicy {
    /// Clear only after a redirect URL has been obtained.
    #[default]
    OnRedirect,
    /// Clear as soon as the payment endpoint has answered, URL or not.
    OnPaymentAttempt,
}

impl fmt::Display for CartClearPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OnRedirect => write!(f, "on_redirect"),
            Self::OnPaymentAttempt => write!(f, "on_payment_attempt"),
        }
    }
}

impl FromStr for CartClearPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "on_redirect" => Ok(Self::OnRedirect),
            "on_payment_attempt" => Ok(Self::OnPaymentAttempt),
            other => Err(format!(
                "unknown cart clear policy {other:?} (expected on_redirect or on_payment_attempt)"
            )),
        }
    }
}

// =============================================================================
// Attempt state
// =============================================================================

/// Stage of a checkout attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckoutState {
    Idle,
    Composing,
    OrderPending,
    PaymentPending,
    Redirecting,
    Failed,
}

impl CheckoutState {
    /// Whether moving from `self` to `next` is a legal step.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Composing)
                | (Self::Composing, Self::OrderPending | Self::Failed)
                | (Self::OrderPending, Self::PaymentPending | Self::Failed)
                | (Self::PaymentPending, Self::Redirecting | Self::Failed)
        )
    }

    /// Whether the attempt is over.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Redirecting | Self::Failed)
    }
}

impl fmt::Display for CheckoutState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Composing => "composing",
            Self::OrderPending => "order_pending",
            Self::PaymentPending => "payment_pending",
            Self::Redirecting => "redirecting",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// One run through the checkout state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutAttempt {
    id: Uuid,
    trail: Vec<CheckoutState>,
}

impl CheckoutAttempt {
    /// Start a new attempt in [`CheckoutState::Idle`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            trail: vec![CheckoutState::Idle],
        }
    }

    /// Attempt id, used to correlate log lines.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> CheckoutState {
        self.trail.last().copied().unwrap_or(CheckoutState::Idle)
    }

    /// Every state the attempt has been in, oldest first.
    #[must_use]
    pub fn trail(&self) -> &[CheckoutState] {
        &self.trail
    }

    fn advance(&mut self, next: CheckoutState) {
        debug_assert!(
            self.state().can_transition_to(next),
            "illegal checkout transition {} -> {next}",
            self.state()
        );
        self.trail.push(next);
    }
}

impl Default for CheckoutAttempt {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Request / outcome
// =============================================================================

/// What the shopper chose at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CheckoutRequest {
    pub payment_type: PaymentType,
    pub delivery_address: Option<DeliveryAddress>,
}

/// A successful attempt: the shopper should now be sent to `redirect_url`.
#[derive(Debug, Clone)]
pub struct CheckoutReceipt {
    pub attempt: CheckoutAttempt,
    pub merchant_reference: MerchantReference,
    /// Amount the payment session was requested for.
    pub amount: Decimal,
    pub redirect_url: Url,
}

/// A failed attempt.
#[derive(Debug, thiserror::Error)]
#[error("Checkout failed during {stage}: {error}")]
pub struct CheckoutFailure {
    pub attempt: CheckoutAttempt,
    /// State the attempt was in when it failed.
    pub stage: CheckoutState,
    #[source]
    pub error: CheckoutError,
    /// Whether the cart still holds the items it had before the attempt.
    pub cart_preserved: bool,
}

impl CheckoutFailure {
    /// Message suitable for showing to the shopper.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        if self.error.is_transport() {
            return match self.stage {
                CheckoutState::PaymentPending => {
                    "We could not reach the payment service. Please try again."
                }
                _ => "We could not reach the order service. Please check your connection and try again.",
            };
        }
        match &self.error {
            CheckoutError::EmptyCart => "Your cart is empty.",
            CheckoutError::NotAuthenticated => "Please log in before placing an order.",
            CheckoutError::InvalidAddress(_) => {
                "Please check your delivery address and try again."
            }
            CheckoutError::OrderCreationFailed { .. } | CheckoutError::MalformedOrderResponse(_) => {
                "We could not create your order. Please try again."
            }
            CheckoutError::PaymentInitiationFailed(_) => {
                "Something went wrong starting your payment. Please try again."
            }
            CheckoutError::InvalidRequest(_)
            | CheckoutError::OrderHistoryFailed { .. }
            | CheckoutError::Network(_)
            | CheckoutError::Timeout(_) => "Something went wrong. Please try again.",
        }
    }
}

// =============================================================================
// Orchestrator
// =============================================================================

/// Sequences order creation, payment initiation and cart clearing.
#[derive(Debug, Clone)]
pub struct Checkout<S> {
    cart: CartStore<S>,
    session: SessionStore<S>,
    orders: OrderGateway,
    payments: PaymentInitiator,
    delivery: DeliveryPolicy,
    clear_policy: CartClearPolicy,
}

impl<S: KeyValueStore + Clone> Checkout<S> {
    /// Create an orchestrator reading the cart and token from `store`.
    pub fn new(store: S, orders: OrderGateway, payments: PaymentInitiator) -> Self {
        Self {
            cart: CartStore::new(store.clone()),
            session: SessionStore::new(store),
            orders,
            payments,
            delivery: DeliveryPolicy::default(),
            clear_policy: CartClearPolicy::default(),
        }
    }

    /// Create an orchestrator with clients and policies taken from `config`.
    ///
    /// # Errors
    ///
    /// Returns error if an HTTP client fails to build.
    pub fn from_config(store: S, config: &CheckoutConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::new(
            store,
            OrderGateway::new(&config.api)?,
            PaymentInitiator::new(&config.api)?,
        )
        .with_delivery_policy(config.delivery)
        .with_cart_clear_policy(config.cart_clear_policy))
    }

    #[must_use]
    pub fn with_delivery_policy(mut self, policy: DeliveryPolicy) -> Self {
        self.delivery = policy;
        self
    }

    #[must_use]
    pub fn with_cart_clear_policy(mut self, policy: CartClearPolicy) -> Self {
        self.clear_policy = policy;
        self
    }

    /// The cart this orchestrator checks out.
    pub const fn cart(&self) -> &CartStore<S> {
        &self.cart
    }

    /// The session whose token authorizes orders.
    pub const fn session(&self) -> &SessionStore<S> {
        &self.session
    }

    /// Run one checkout attempt.
    ///
    /// # Errors
    ///
    /// Returns a [`CheckoutFailure`] naming the stage that failed. Empty cart
    /// and missing token fail before any request is sent.
    pub async fn checkout(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutReceipt, CheckoutFailure> {
        let attempt = CheckoutAttempt::new();
        let span = info_span!(
            "checkout",
            attempt_id = %attempt.id(),
            payment_type = %request.payment_type,
        );
        self.run(attempt, request).instrument(span).await
    }

    async fn run(
        &self,
        mut attempt: CheckoutAttempt,
        request: CheckoutRequest,
    ) -> Result<CheckoutReceipt, CheckoutFailure> {
        attempt.advance(CheckoutState::Composing);

        let cart = self.cart.get_cart();
        let order = match compose_order(
            request.payment_type,
            &cart,
            request.delivery_address,
            self.delivery,
        ) {
            Ok(order) => order,
            Err(e) => return Err(fail(attempt, e, true)),
        };
        let Some(token) = self.session.auth_token() else {
            return Err(fail(attempt, CheckoutError::NotAuthenticated, true));
        };

        attempt.advance(CheckoutState::OrderPending);
        let created = match self.orders.submit_order(&order, &token).await {
            Ok(created) => created,
            Err(e) => return Err(fail(attempt, e, true)),
        };

        attempt.advance(CheckoutState::PaymentPending);
        let amount = round_money(order.total());
        let session = match self
            .payments
            .request_session(order.payment_type, amount, &created.merchant_reference)
            .await
        {
            Ok(session) => session,
            Err(e) => return Err(fail(attempt, e, true)),
        };

        let cart_preserved = match self.clear_policy {
            CartClearPolicy::OnPaymentAttempt => !self.clear_cart(),
            CartClearPolicy::OnRedirect => true,
        };

        let Some(redirect_url) = session.redirect_url() else {
            let error = CheckoutError::PaymentInitiationFailed(session.describe());
            return Err(fail(attempt, error, cart_preserved));
        };

        attempt.advance(CheckoutState::Redirecting);
        if self.clear_policy == CartClearPolicy::OnRedirect {
            self.clear_cart();
        }

        info!(
            merchant_reference = %created.merchant_reference,
            %amount,
            "Checkout complete, redirecting to payment"
        );

        Ok(CheckoutReceipt {
            attempt,
            merchant_reference: created.merchant_reference,
            amount,
            redirect_url,
        })
    }

    /// Fetch the shopper's order history with the stored token.
    ///
    /// # Errors
    ///
    /// Returns `NotAuthenticated` without a token, otherwise whatever the
    /// order gateway reports.
    pub async fn order_history(
        &self,
        query: &OrderHistoryQuery,
    ) -> Result<OrderHistoryPage, CheckoutError> {
        let token = self
            .session
            .auth_token()
            .ok_or(CheckoutError::NotAuthenticated)?;
        self.orders.list_orders(&token, query).await
    }

    /// Empty the cart, reporting whether it worked. Failure only logs.
    fn clear_cart(&self) -> bool {
        match self.cart.clear_cart() {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Failed to clear cart after checkout");
                false
            }
        }
    }
}

/// Close an attempt as failed at its current stage.
fn fail(mut attempt: CheckoutAttempt, error: CheckoutError, cart_preserved: bool) -> CheckoutFailure {
    let stage = attempt.state();
    warn!(%stage, error = %error, cart_preserved, "Checkout failed");
    attempt.advance(CheckoutState::Failed);
    CheckoutFailure {
        attempt,
        stage,
        error,
        cart_preserved,
    }
}
