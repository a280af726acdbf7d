//! Persisted order shapes and the order reference format.
//!
//! An order is created once by the storefront's submission service and then
//! only ever changes status. Its items are frozen copies of the cart lines
//! at submission time; nothing links back to the mutable cart.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::checkout::DeliveryMethod;
use crate::{Email, OrderId, OrderItemId, OrderStatus, PaymentMethod, ProductId};

/// Characters an order reference code may use: no 0/O, 1/I/L ambiguity.
pub const ORDER_NUMBER_ALPHABET: &[u8] = b"23456789ABCDEFGHJKMNPQRSTUVWXYZ";

/// Prefix on every order reference.
pub const ORDER_NUMBER_PREFIX: &str = "DD-";

/// Length of the random code after the prefix.
pub const ORDER_NUMBER_CODE_LEN: usize = 8;

/// A malformed order reference.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid order number: {0}")]
pub struct OrderNumberError(pub String);

/// The short human-facing reference of an order, e.g. `DD-7GKQ2MXF`.
///
/// Distinct from the internal [`OrderId`]: this is what appears on the
/// confirmation page, in lookups, and on the delivery slip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderNumber(String);

impl OrderNumber {
    /// Parse and validate an order reference.
    ///
    /// # Errors
    ///
    /// Returns [`OrderNumberError`] when the prefix, length, or alphabet
    /// does not match the reference format.
    pub fn parse(input: &str) -> Result<Self, OrderNumberError> {
        let input = input.trim();
        let Some(code) = input.strip_prefix(ORDER_NUMBER_PREFIX) else {
            return Err(OrderNumberError(input.to_owned()));
        };
        if code.len() != ORDER_NUMBER_CODE_LEN
            || !code.bytes().all(|b| ORDER_NUMBER_ALPHABET.contains(&b))
        {
            return Err(OrderNumberError(input.to_owned()));
        }
        Ok(Self(input.to_owned()))
    }

    /// Build a reference from an already-generated code.
    ///
    /// # Errors
    ///
    /// Returns [`OrderNumberError`] when the code has the wrong length or
    /// characters outside the reference alphabet.
    pub fn from_code(code: &str) -> Result<Self, OrderNumberError> {
        Self::parse(&format!("{ORDER_NUMBER_PREFIX}{code}"))
    }

    /// Get the reference as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where an order ships to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub wilaya: String,
    pub commune: String,
    pub address: String,
}

/// A persisted order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub order_number: OrderNumber,
    pub customer_name: String,
    pub customer_email: Email,
    pub customer_phone: String,
    pub shipping: ShippingAddress,
    pub delivery_method: DeliveryMethod,
    pub items: Vec<OrderItem>,
    pub total: Decimal,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One line of a persisted order: a frozen copy of a cart line item.
///
/// `price` and the variant labels are copied verbatim at submission time;
/// later catalog changes never touch them. `product_name` is snapshotted too
/// so the back office can render lines for products since renamed or removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: u32,
    pub price: Decimal,
    pub size: String,
    pub frame: String,
    pub finish: Option<String>,
}

impl OrderItem {
    /// Price of this line: unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_reference_format() {
        let number = OrderNumber::parse("DD-7GKQ2MXF").expect("valid reference");
        assert_eq!(number.as_str(), "DD-7GKQ2MXF");
    }

    #[test]
    fn test_parse_rejects_wrong_prefix() {
        assert!(OrderNumber::parse("XX-7GKQ2MXF").is_err());
        assert!(OrderNumber::parse("7GKQ2MXF").is_err());
    }

    #[test]
    fn test_parse_rejects_wrong_length() {
        assert!(OrderNumber::parse("DD-7GKQ2MX").is_err());
        assert!(OrderNumber::parse("DD-7GKQ2MXF9").is_err());
    }

    #[test]
    fn test_parse_rejects_ambiguous_characters() {
        // 0, O, 1, I and L are excluded from the alphabet.
        assert!(OrderNumber::parse("DD-0GKQ2MXF").is_err());
        assert!(OrderNumber::parse("DD-OGKQ2MXF").is_err());
        assert!(OrderNumber::parse("DD-1GKQ2MXF").is_err());
        assert!(OrderNumber::parse("DD-lGKQ2MXF").is_err());
    }

    #[test]
    fn test_from_code() {
        let number = OrderNumber::from_code("ABCDEFGH").expect("valid code");
        assert_eq!(number.as_str(), "DD-ABCDEFGH");
        assert!(OrderNumber::from_code("ABC").is_err());
    }
}
