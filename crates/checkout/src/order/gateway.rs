//! Order API client.
//!
//! Provides order creation (`POST /api/orders`) and the shopper's order history
//! (`GET /api/orders/me`). Both require the bearer token; neither retries, so a
//! failed submission never creates a duplicate order behind the shopper's back.

use std::time::Duration;

use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};
use tracing::{info, instrument, warn};
use url::Url;

use kingburger_core::{MerchantReference, OrderStatus, PaymentType};

use crate::config::ApiConfig;
use crate::error::{CheckoutError, body_preview};
use crate::http::{build_client, transport_error};

use super::OrderRequest;

/// Largest page size the history endpoint accepts.
const MAX_PAGE_SIZE: u32 = 100;

/// Acknowledgement of a created order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderCreated {
    /// Reference to pass to the payment initiation call.
    pub merchant_reference: MerchantReference,
    /// Total computed by the backend, when reported.
    pub total: Option<Decimal>,
    /// Initial order status, when reported.
    pub status: Option<OrderStatus>,
    /// Human-readable confirmation, when reported.
    pub message: Option<String>,
}

/// Order creation response as sent by the backend.
#[derive(Debug, Deserialize)]
struct OrderCreatedResponse {
    #[serde(default)]
    merchant_reference: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    total: Option<Decimal>,
    #[serde(default)]
    status: Option<OrderStatus>,
    #[serde(default)]
    message: Option<String>,
}

/// Filters and paging for the order history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderHistoryQuery {
    pub status: Option<String>,
    pub payment_type: Option<PaymentType>,
    pub merchant_reference: Option<String>,
    pub date_from: Option<NaiveDateTime>,
    pub date_to: Option<NaiveDateTime>,
    pub page: u32,
    pub page_size: u32,
}

impl Default for OrderHistoryQuery {
    fn default() -> Self {
        Self {
            status: None,
            payment_type: None,
            merchant_reference: None,
            date_from: None,
            date_to: None,
            page: 1,
            page_size: 10,
        }
    }
}

impl OrderHistoryQuery {
    fn validate(&self) -> Result<(), CheckoutError> {
        if self.page == 0 {
            return Err(CheckoutError::InvalidRequest(
                "page must be at least 1".to_string(),
            ));
        }
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(CheckoutError::InvalidRequest(format!(
                "page_size must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }
        if let (Some(from), Some(to)) = (self.date_from, self.date_to) {
            if from > to {
                return Err(CheckoutError::InvalidRequest(
                    "date_from must not be after date_to".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Append the non-empty filters to `url` as query parameters.
    fn apply(&self, url: &mut Url) {
        let mut pairs = url.query_pairs_mut();
        let non_blank = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_owned)
        };

        if let Some(status) = non_blank(&self.status) {
            pairs.append_pair("status", &status);
        }
        if let Some(payment_type) = self.payment_type {
            pairs.append_pair("payment_type", &payment_type.to_string());
        }
        if let Some(reference) = non_blank(&self.merchant_reference) {
            pairs.append_pair("merchant_reference", &reference);
        }
        if let Some(from) = self.date_from {
            pairs.append_pair("date_from", &from.format("%Y-%m-%dT%H:%M:%S").to_string());
        }
        if let Some(to) = self.date_to {
            pairs.append_pair("date_to", &to.format("%Y-%m-%dT%H:%M:%S").to_string());
        }
        pairs.append_pair("page", &self.page.to_string());
        pairs.append_pair("page_size", &self.page_size.to_string());
    }
}

/// One page of the shopper's orders.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderHistoryPage {
    pub page: u32,
    pub page_size: u32,
    pub total_records: u64,
    pub total_pages: u64,
    pub orders: Vec<OrderSummary>,
}

/// A previously placed order.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderSummary {
    pub merchant_reference: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub payment_type: String,
    pub status: OrderStatus,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub items: Vec<OrderSummaryLine>,
}

/// A line of a previously placed order.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderSummaryLine {
    pub name: String,
    #[serde(rename = "price", with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,
    pub quantity: u32,
}

/// Accept RFC 3339 timestamps and offset-less ISO timestamps (taken as UTC).
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(parsed) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(serde::de::Error::custom)
}

/// Order API client.
#[derive(Debug, Clone)]
pub struct OrderGateway {
    client: reqwest::Client,
    orders_url: Url,
    history_url: Url,
    timeout: Duration,
}

impl OrderGateway {
    /// Create a new order client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(api: &ApiConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_client(api.timeout())?,
            orders_url: api.orders_url().clone(),
            history_url: api.order_history_url().clone(),
            timeout: api.timeout(),
        })
    }

    /// Submit an order and return the backend's acknowledgement.
    ///
    /// # Errors
    ///
    /// - `NotAuthenticated` if the token is blank (no request is sent)
    /// - `OrderCreationFailed` on a non-success status
    /// - `MalformedOrderResponse` if a success response lacks `merchant_reference`
    /// - `Network` / `Timeout` on transport failure
    #[instrument(skip(self, order, token), fields(items = order.items.len(), payment_type = %order.payment_type))]
    pub async fn submit_order(
        &self,
        order: &OrderRequest,
        token: &SecretString,
    ) -> Result<OrderCreated, CheckoutError> {
        let token = require_token(token)?;

        let response = self
            .client
            .post(self.orders_url.clone())
            .bearer_auth(token)
            .json(order)
            .send()
            .await
            .map_err(|e| transport_error(e, self.timeout))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| transport_error(e, self.timeout))?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "Order creation rejected");
            return Err(CheckoutError::OrderCreationFailed {
                status: status.as_u16(),
                body: body_preview(&body),
            });
        }

        let created = parse_order_created(&body)?;
        info!(merchant_reference = %created.merchant_reference, "Order created");
        Ok(created)
    }

    /// Fetch one page of the shopper's order history.
    ///
    /// # Errors
    ///
    /// - `NotAuthenticated` if the token is blank (no request is sent)
    /// - `InvalidRequest` if paging or date filters are out of range
    /// - `OrderHistoryFailed` on a non-success status
    /// - `MalformedOrderResponse` if the body is not a history page
    /// - `Network` / `Timeout` on transport failure
    #[instrument(skip(self, token), fields(page = query.page))]
    pub async fn list_orders(
        &self,
        token: &SecretString,
        query: &OrderHistoryQuery,
    ) -> Result<OrderHistoryPage, CheckoutError> {
        let token = require_token(token)?;
        query.validate()?;

        let mut url = self.history_url.clone();
        query.apply(&mut url);

        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| transport_error(e, self.timeout))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| transport_error(e, self.timeout))?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "Order history request rejected");
            return Err(CheckoutError::OrderHistoryFailed {
                status: status.as_u16(),
                body: body_preview(&body),
            });
        }

        serde_json::from_str(&body)
            .map_err(|e| CheckoutError::MalformedOrderResponse(format!("order history: {e}")))
    }
}

/// Expose a non-blank token or fail without touching the network.
fn require_token(token: &SecretString) -> Result<&str, CheckoutError> {
    let token = token.expose_secret().trim();
    if token.is_empty() {
        return Err(CheckoutError::NotAuthenticated);
    }
    Ok(token)
}

/// Parse an order creation body, insisting on a merchant reference.
fn parse_order_created(body: &str) -> Result<OrderCreated, CheckoutError> {
    let response: OrderCreatedResponse = serde_json::from_str(body).map_err(|e| {
        CheckoutError::MalformedOrderResponse(format!("{e}: {}", body_preview(body)))
    })?;

    let merchant_reference = response
        .merchant_reference
        .as_deref()
        .map(MerchantReference::parse)
        .transpose()
        .map_err(|e| CheckoutError::MalformedOrderResponse(e.to_string()))?
        .ok_or_else(|| {
            CheckoutError::MalformedOrderResponse("missing merchant_reference".to_string())
        })?;

    Ok(OrderCreated {
        merchant_reference,
        total: response.total,
        status: response.status,
        message: response.message,
    })
}
