//! Checkout configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `KINGBURGER_API_BASE_URL` - Backend base URL (default: <https://api.kingburger.site>)
//! - `KINGBURGER_DATA_DIR` - Directory for the file-backed cart and session (default: `.kingburger`)
//! - `KINGBURGER_HTTP_TIMEOUT_SECS` - Per-request timeout, 1-120 (default: 20)
//! - `KINGBURGER_DELIVERY_REQUIRED` - Require a delivery address at checkout (default: false)
//! - `KINGBURGER_CART_CLEAR_POLICY` - `on_redirect` or `on_payment_attempt` (default: `on_redirect`)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::checkout::CartClearPolicy;
use crate::order::DeliveryPolicy;

const DEFAULT_API_BASE_URL: &str = "https://api.kingburger.site";
const DEFAULT_DATA_DIR: &str = ".kingburger";
const DEFAULT_TIMEOUT_SECS: u64 = 20;
const MAX_TIMEOUT_SECS: u64 = 120;

const ORDERS_PATH: &str = "api/orders";
const ORDER_HISTORY_PATH: &str = "api/orders/me";
const PAYMENT_PATH: &str = "api/create-payment";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Invalid API base URL {0}: {1}")]
    InvalidBaseUrl(String, String),
}

/// Backend endpoints and request timeout.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    base_url: Url,
    orders_url: Url,
    order_history_url: Url,
    payment_url: Url,
    timeout: Duration,
}

impl ApiConfig {
    /// Resolve the backend endpoints against `base_url`.
    ///
    /// A base URL with a path prefix (`https://host/shop`) keeps that prefix.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidBaseUrl` if the URL cannot serve as a base
    /// (e.g. `mailto:`) or is not http(s).
    pub fn new(mut base_url: Url, timeout: Duration) -> Result<Self, ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidBaseUrl(base_url.to_string(), reason.to_string());

        if base_url.cannot_be_a_base() || !matches!(base_url.scheme(), "http" | "https") {
            return Err(invalid("must be an http(s) URL"));
        }

        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let join = |path: &str| {
            base_url
                .join(path)
                .map_err(|e| ConfigError::InvalidBaseUrl(base_url.to_string(), e.to_string()))
        };

        Ok(Self {
            orders_url: join(ORDERS_PATH)?,
            order_history_url: join(ORDER_HISTORY_PATH)?,
            payment_url: join(PAYMENT_PATH)?,
            base_url,
            timeout,
        })
    }

    /// Base URL all endpoints are resolved against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Order submission endpoint.
    #[must_use]
    pub const fn orders_url(&self) -> &Url {
        &self.orders_url
    }

    /// Order history endpoint.
    #[must_use]
    pub const fn order_history_url(&self) -> &Url {
        &self.order_history_url
    }

    /// Payment initiation endpoint.
    #[must_use]
    pub const fn payment_url(&self) -> &Url {
        &self.payment_url
    }

    /// Per-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Checkout application configuration.
#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    /// Backend endpoints and timeout
    pub api: ApiConfig,
    /// Directory for the file-backed store
    pub data_dir: PathBuf,
    /// Whether a delivery address is mandatory
    pub delivery: DeliveryPolicy,
    /// When the cart is cleared during checkout
    pub cart_clear_policy: CartClearPolicy,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

impl CheckoutConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get_or_default =
            |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let base_url_raw = get_or_default("KINGBURGER_API_BASE_URL", DEFAULT_API_BASE_URL);
        let base_url = Url::parse(base_url_raw.trim())
            .map_err(|e| ConfigError::InvalidBaseUrl(base_url_raw.clone(), e.to_string()))?;

        let timeout = parse_timeout(&get_or_default(
            "KINGBURGER_HTTP_TIMEOUT_SECS",
            &DEFAULT_TIMEOUT_SECS.to_string(),
        ))?;

        let delivery = if parse_bool(
            "KINGBURGER_DELIVERY_REQUIRED",
            &get_or_default("KINGBURGER_DELIVERY_REQUIRED", "false"),
        )? {
            DeliveryPolicy::Required
        } else {
            DeliveryPolicy::Optional
        };

        let cart_clear_policy = get_or_default("KINGBURGER_CART_CLEAR_POLICY", "on_redirect")
            .parse::<CartClearPolicy>()
            .map_err(|e| ConfigError::InvalidEnvVar("KINGBURGER_CART_CLEAR_POLICY".to_string(), e))?;

        Ok(Self {
            api: ApiConfig::new(base_url, timeout)?,
            data_dir: PathBuf::from(get_or_default("KINGBURGER_DATA_DIR", DEFAULT_DATA_DIR)),
            delivery,
            cart_clear_policy,
            sentry_dsn: lookup("SENTRY_DSN").filter(|dsn| !dsn.trim().is_empty()),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse the request timeout in whole seconds.
fn parse_timeout(value: &str) -> Result<Duration, ConfigError> {
    let invalid = |reason: String| {
        ConfigError::InvalidEnvVar("KINGBURGER_HTTP_TIMEOUT_SECS".to_string(), reason)
    };

    let secs = value.trim().parse::<u64>().map_err(|e| invalid(e.to_string()))?;
    if secs == 0 || secs > MAX_TIMEOUT_SECS {
        return Err(invalid(format!(
            "must be between 1 and {MAX_TIMEOUT_SECS} (got {secs})"
        )));
    }
    Ok(Duration::from_secs(secs))
}

/// Parse a boolean flag (`true`/`false`/`1`/`0`/`yes`/`no`).
fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" | "" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("expected a boolean, got {other:?}"),
        )),
    }
}
