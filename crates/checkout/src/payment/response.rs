//! Payment session response normalization.
//!
//! The payment endpoint relays whatever the payment provider returned. Most of
//! the time that is JSON with a `url` field, sometimes nested under `response`.
//! When the provider answer could not be decoded the backend wraps it as
//! `{"response": {"raw_response": "..."}}` (older deployments put
//! `raw_response` at the top level), and a misbehaving proxy may hand back plain text
//! or HTML. [`PaymentSessionResult`] captures both shapes so the redirect URL
//! can be resolved the same way in either case.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use url::Url;

use crate::error::body_preview;

/// Absolute http(s) URL inside free text. Stops at whitespace, quotes and angle brackets.
#[allow(clippy::expect_used)] // Static regex pattern, validated at compile time
static EMBEDDED_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s"'<>]+"#).expect("valid regex"));

/// Normalized payment session response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentSessionResult {
    /// A JSON object; `url` is the redirect URL field if one was present.
    Structured {
        /// `url` or `response.url`.
        url: Option<String>,
    },
    /// Anything that was not a JSON object, or a relayed `raw_response`
    /// (top level or under `response`).
    RawText {
        /// Text to scan for an embedded URL.
        text: String,
    },
}

impl PaymentSessionResult {
    /// Classify a response body.
    #[must_use]
    pub fn from_body(body: &str) -> Self {
        match serde_json::from_str::<Value>(body) {
            Ok(value) => Self::from_json(value),
            Err(_) => Self::RawText {
                text: body.to_string(),
            },
        }
    }

    fn from_json(value: Value) -> Self {
        match value {
            Value::Object(map) => {
                let url = map
                    .get("url")
                    .and_then(Value::as_str)
                    .or_else(|| {
                        map.get("response")
                            .and_then(|response| response.get("url"))
                            .and_then(Value::as_str)
                    })
                    .map(str::to_owned);

                if url.is_none() {
                    let raw = map
                        .get("raw_response")
                        .or_else(|| {
                            map.get("response")
                                .and_then(|response| response.get("raw_response"))
                        })
                        .and_then(Value::as_str);
                    if let Some(raw) = raw {
                        return Self::RawText {
                            text: raw.to_string(),
                        };
                    }
                }

                Self::Structured { url }
            }
            // A JSON-encoded string is text that happened to be quoted.
            Value::String(text) => Self::from_body(&text),
            _ => Self::Structured { url: None },
        }
    }

    /// Resolve the URL the shopper should be sent to.
    ///
    /// A structured `url` is used when it parses; a structured `url` that does
    /// not parse and raw text are scanned for an embedded http(s) URL. A
    /// structured body without any `url` yields `None`.
    #[must_use]
    pub fn redirect_url(&self) -> Option<Url> {
        match self {
            Self::Structured { url: Some(url) } => {
                let url = url.trim();
                match Url::parse(url) {
                    Ok(parsed) if is_http(&parsed) => Some(parsed),
                    _ => extract_embedded_url(url),
                }
            }
            Self::Structured { url: None } => None,
            Self::RawText { text } => extract_embedded_url(text),
        }
    }

    /// Short description for error messages and logs.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Structured { url: Some(url) } => {
                format!("unusable redirect url: {}", body_preview(url))
            }
            Self::Structured { url: None } => "response did not include a redirect url".to_string(),
            Self::RawText { text } if text.trim().is_empty() => "empty response".to_string(),
            Self::RawText { text } => {
                format!("no redirect url in response: {}", body_preview(text))
            }
        }
    }
}

/// Find the first valid absolute http(s) URL in free text.
///
/// ```
/// use kingburger_checkout::payment::extract_embedded_url;
///
/// let url = extract_embedded_url("Redirect to https://pay.example/sess/2 now").unwrap();
/// assert_eq!(url.as_str(), "https://pay.example/sess/2");
///
/// assert!(extract_embedded_url("no link here").is_none());
/// ```
#[must_use]
pub fn extract_embedded_url(text: &str) -> Option<Url> {
    EMBEDDED_URL_RE
        .find_iter(text)
        .filter_map(|m| Url::parse(trim_trailing_punctuation(m.as_str())).ok())
        .find(is_http)
}

/// Drop sentence punctuation glued to the end of a URL.
fn trim_trailing_punctuation(candidate: &str) -> &str {
    candidate.trim_end_matches(['.', ',', ';', ':', '!', '?', ')', ']', '}'])
}

fn is_http(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https") && url.host().is_some()
}
