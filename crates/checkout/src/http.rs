//! Shared HTTP client setup for the backend API clients.

use std::time::Duration;

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};

use crate::error::CheckoutError;

/// User agent sent with every backend request.
const USER_AGENT: &str = concat!("kingburger-checkout/", env!("CARGO_PKG_VERSION"));

/// Build a `reqwest` client with the request timeout applied to every call.
pub(crate) fn build_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("application/json, text/plain;q=0.9, */*;q=0.8"),
    );

    reqwest::Client::builder()
        .default_headers(headers)
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
}

/// Map a transport failure to the checkout taxonomy.
pub(crate) fn transport_error(err: reqwest::Error, timeout: Duration) -> CheckoutError {
    if err.is_timeout() {
        CheckoutError::Timeout(timeout)
    } else {
        CheckoutError::Network(err)
    }
}
