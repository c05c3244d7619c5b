//! Payment session initiation.
//!
//! Asks the backend to open a payment session for a created order and turns
//! whatever comes back into a URL the shopper can be redirected to.

mod response;

use std::time::Duration;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, instrument, warn};
use url::Url;

use kingburger_core::{MerchantReference, PaymentType, round_money};

use crate::config::ApiConfig;
use crate::error::CheckoutError;
use crate::http::{build_client, transport_error};

pub use response::{PaymentSessionResult, extract_embedded_url};

/// Payment initiation body.
#[derive(Debug, Serialize)]
struct PaymentRequest<'a> {
    payment_type: PaymentType,
    #[serde(with = "rust_decimal::serde::float")]
    amount: Decimal,
    merchant_reference: &'a str,
}

/// Payment initiation client.
#[derive(Debug, Clone)]
pub struct PaymentInitiator {
    client: reqwest::Client,
    payment_url: Url,
    timeout: Duration,
}

impl PaymentInitiator {
    /// Create a new payment client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(api: &ApiConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_client(api.timeout())?,
            payment_url: api.payment_url().clone(),
            timeout: api.timeout(),
        })
    }

    /// Request a payment session and return the normalized response.
    ///
    /// The amount is rounded to cents before it is sent. The HTTP status is
    /// only logged; an error response may still carry a usable redirect.
    ///
    /// # Errors
    ///
    /// Returns `Network` or `Timeout` if no response could be read.
    #[instrument(skip(self, merchant_reference), fields(merchant_reference = %merchant_reference))]
    pub async fn request_session(
        &self,
        payment_type: PaymentType,
        amount: Decimal,
        merchant_reference: &MerchantReference,
    ) -> Result<PaymentSessionResult, CheckoutError> {
        let body = PaymentRequest {
            payment_type,
            amount: round_money(amount),
            merchant_reference: merchant_reference.as_str(),
        };

        let response = self
            .client
            .post(self.payment_url.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(e, self.timeout))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| transport_error(e, self.timeout))?;

        if status.is_success() {
            info!(status = status.as_u16(), "Payment session response received");
        } else {
            warn!(status = status.as_u16(), "Payment endpoint returned an error status");
        }

        Ok(PaymentSessionResult::from_body(&text))
    }

    /// Request a payment session and resolve the redirect URL.
    ///
    /// # Errors
    ///
    /// - `PaymentInitiationFailed` if no http(s) URL can be recovered
    /// - `Network` / `Timeout` on transport failure
    pub async fn initiate_payment(
        &self,
        payment_type: PaymentType,
        amount: Decimal,
        merchant_reference: &MerchantReference,
    ) -> Result<Url, CheckoutError> {
        let result = self
            .request_session(payment_type, amount, merchant_reference)
            .await?;

        result
            .redirect_url()
            .ok_or_else(|| CheckoutError::PaymentInitiationFailed(result.describe()))
    }
}
