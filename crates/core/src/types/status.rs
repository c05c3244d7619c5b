//! Status enums for orders and payments.

use serde::{Deserialize, Serialize};

/// Payment method chosen at checkout.
///
/// Serialized lowercase, as the order and payment endpoints expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    /// Credit or debit card.
    #[default]
    Card,
    /// Instant electronic funds transfer.
    Eft,
}

impl std::fmt::Display for PaymentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Card => f.pad("card"),
            Self::Eft => f.pad("eft"),
        }
    }
}

impl std::str::FromStr for PaymentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "card" => Ok(Self::Card),
            "eft" => Ok(Self::Eft),
            _ => Err(format!("invalid payment type: {s}")),
        }
    }
}

/// Order lifecycle status reported by the backend.
///
/// New orders start as `pending`; the payment webhook moves them on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Paid,
    Failed,
    Cancelled,
    /// Any status this client does not know about.
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => f.pad("pending"),
            Self::Paid => f.pad("paid"),
            Self::Failed => f.pad("failed"),
            Self::Cancelled => f.pad("cancelled"),
            Self::Unknown => f.pad("unknown"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_type_from_str() {
        assert_eq!("card".parse::<PaymentType>().unwrap(), PaymentType::Card);
        assert_eq!(" EFT ".parse::<PaymentType>().unwrap(), PaymentType::Eft);
        assert!("cash".parse::<PaymentType>().is_err());
    }

    #[test]
    fn test_payment_type_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&PaymentType::Eft).unwrap(),
            r#""eft""#
        );
    }

    #[test]
    fn test_order_status_unknown_fallback() {
        let status: OrderStatus = serde_json::from_str(r#""refunded""#).unwrap();
        assert_eq!(status, OrderStatus::Unknown);

        let status: OrderStatus = serde_json::from_str(r#""pending""#).unwrap();
        assert_eq!(status, OrderStatus::Pending);
    }
}
