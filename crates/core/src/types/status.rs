//! Order status lifecycle and payment method.

use serde::{Deserialize, Serialize};

/// Status of a persisted order.
///
/// The happy path is `Pending → Processing → Shipped → Delivered`;
/// `Cancelled` is reachable from any non-terminal status. `Delivered` and
/// `Cancelled` are terminal. Transitions outside this graph are rejected by
/// [`OrderStatus::transition_to`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Just submitted, not yet picked up by the back office.
    #[default]
    Pending,
    /// Being prepared for shipment.
    Processing,
    /// Handed over to the carrier.
    Shipped,
    /// Received by the customer. Terminal.
    Delivered,
    /// Abandoned before delivery. Terminal.
    Cancelled,
}

/// A status change that is not an edge of the lifecycle graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("cannot change order status from {from} to {to}")]
pub struct InvalidTransition {
    /// Status the order currently holds.
    pub from: OrderStatus,
    /// Status that was requested.
    pub to: OrderStatus,
}

impl OrderStatus {
    /// All statuses, in lifecycle order. Used by admin filters.
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::Processing,
        Self::Shipped,
        Self::Delivered,
        Self::Cancelled,
    ];

    /// Whether no further transitions are allowed out of this status.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Statuses directly reachable from this one.
    #[must_use]
    pub const fn next_statuses(self) -> &'static [Self] {
        match self {
            Self::Pending => &[Self::Processing, Self::Cancelled],
            Self::Processing => &[Self::Shipped, Self::Cancelled],
            Self::Shipped => &[Self::Delivered, Self::Cancelled],
            Self::Delivered | Self::Cancelled => &[],
        }
    }

    /// Whether `to` is directly reachable from this status.
    #[must_use]
    pub fn can_transition_to(self, to: Self) -> bool {
        self.next_statuses().contains(&to)
    }

    /// Validate a transition, returning the new status on success.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidTransition`] when `to` is not directly reachable,
    /// including any transition out of a terminal status.
    pub fn transition_to(self, to: Self) -> Result<Self, InvalidTransition> {
        if self.can_transition_to(to) {
            Ok(to)
        } else {
            Err(InvalidTransition { from: self, to })
        }
    }

    /// Human-readable label for templates.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Processing => "Processing",
            Self::Shipped => "Shipped",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Processing => write!(f, "processing"),
            Self::Shipped => write!(f, "shipped"),
            Self::Delivered => write!(f, "delivered"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

/// How an order is paid.
///
/// Cash on delivery is the only supported method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash on delivery.
    #[default]
    Cash,
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cash => write!(f, "cash"),
        }
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cash" => Ok(Self::Cash),
            _ => Err(format!("invalid payment method: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_walk() {
        let mut status = OrderStatus::Pending;
        for next in [
            OrderStatus::Processing,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
        ] {
            status = status.transition_to(next).expect("valid step");
        }
        assert_eq!(status, OrderStatus::Delivered);
        assert!(status.is_terminal());
    }

    #[test]
    fn test_skipping_ahead_is_rejected() {
        let err = OrderStatus::Pending
            .transition_to(OrderStatus::Delivered)
            .expect_err("pending cannot jump to delivered");
        assert_eq!(err.from, OrderStatus::Pending);
        assert_eq!(err.to, OrderStatus::Delivered);
    }

    #[test]
    fn test_terminal_statuses_allow_nothing() {
        for terminal in [OrderStatus::Delivered, OrderStatus::Cancelled] {
            for to in OrderStatus::ALL {
                assert!(terminal.transition_to(to).is_err());
            }
        }
    }

    #[test]
    fn test_cancel_from_any_non_terminal() {
        for from in [
            OrderStatus::Pending,
            OrderStatus::Processing,
            OrderStatus::Shipped,
        ] {
            assert!(from.can_transition_to(OrderStatus::Cancelled));
        }
    }

    #[test]
    fn test_backwards_moves_are_rejected() {
        assert!(!OrderStatus::Shipped.can_transition_to(OrderStatus::Processing));
        assert!(!OrderStatus::Processing.can_transition_to(OrderStatus::Pending));
    }

    #[test]
    fn test_status_string_roundtrip() {
        for status in OrderStatus::ALL {
            let parsed: OrderStatus = status.to_string().parse().expect("roundtrip");
            assert_eq!(parsed, status);
        }
        assert!("paid".parse::<OrderStatus>().is_err());
    }
}
