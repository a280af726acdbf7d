//! Order submission service.
//!
//! Turns a validated cart snapshot plus checkout details into a persisted
//! order, and hands back the human-facing reference. The repository makes
//! the write atomic; this layer owns the preconditions, the reference
//! generation, and the retry/idempotency policy around it.

use rand::seq::IndexedRandom;
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use dar_decor_core::cart::Cart;
use dar_decor_core::checkout::CheckoutDraft;
use dar_decor_core::order::{
    ORDER_NUMBER_ALPHABET, ORDER_NUMBER_CODE_LEN, OrderNumber, ShippingAddress,
};
use dar_decor_core::{Email, PaymentMethod};

use crate::db::{NewOrder, NewOrderItem, OrderRepository, RepositoryError};

/// Attempts at a fresh order number before giving up.
///
/// A collision over 31^8 codes is already vanishingly rare; two in a row
/// means something is wrong with the random source, not the table.
const MAX_NUMBER_ATTEMPTS: u32 = 5;

/// Why an order submission was refused or failed.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    /// Nothing to order.
    #[error("cannot submit an order with no items")]
    EmptyCart,
    /// A line item carries a zero quantity or negative price.
    #[error("order items are invalid")]
    InvalidItems,
    /// The contact details on the draft do not validate.
    #[error("checkout details are invalid")]
    InvalidDraft,
    /// Could not find a free order number.
    #[error("could not allocate an order number")]
    NumberExhausted,
    /// The database write failed; nothing was persisted.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Service for converting cart snapshots into persisted orders.
pub struct OrderService<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderService<'a> {
    /// Create a new order service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Submit an order from the current cart and checkout draft.
    ///
    /// Items, prices and variant labels are copied verbatim from the cart -
    /// no re-pricing happens here. On success the returned reference
    /// resolves, immediately, to an order whose lines mirror the submitted
    /// snapshot.
    ///
    /// `idempotency_key` makes retries safe: a second call with the same key
    /// (say, after a timeout the client never saw the response to) returns
    /// the already-created order instead of a duplicate.
    ///
    /// # Errors
    ///
    /// Returns a [`SubmitError`]; on any error no order was newly persisted.
    #[instrument(skip(self, draft, cart), fields(items = cart.len()))]
    pub async fn submit(
        &self,
        draft: &CheckoutDraft,
        cart: &Cart,
        idempotency_key: Uuid,
    ) -> Result<OrderNumber, SubmitError> {
        if cart.is_empty() {
            return Err(SubmitError::EmptyCart);
        }
        if cart
            .items()
            .iter()
            .any(|line| line.quantity == 0 || line.unit_price < Decimal::ZERO)
        {
            return Err(SubmitError::InvalidItems);
        }
        let total = cart.total_price();
        if total < Decimal::ZERO {
            return Err(SubmitError::InvalidItems);
        }
        if !draft.validate().is_empty() {
            return Err(SubmitError::InvalidDraft);
        }
        let customer_email = Email::parse(&draft.email).map_err(|_| SubmitError::InvalidDraft)?;

        let repo = OrderRepository::new(self.pool);

        // A retried submission of the same checkout resolves to its order.
        if let Some(existing) = repo.find_by_idempotency_key(idempotency_key).await? {
            tracing::info!(order_number = %existing.order_number, "Submission replayed, returning existing order");
            return Ok(existing.order_number);
        }

        let items: Vec<NewOrderItem> = cart
            .items()
            .iter()
            .map(|line| NewOrderItem {
                product_id: line.product_id,
                product_name: line.name.clone(),
                quantity: line.quantity,
                price: line.unit_price,
                size: line.size.clone(),
                frame: line.frame.clone(),
                finish: line.finish.clone(),
            })
            .collect();

        for attempt in 1..=MAX_NUMBER_ATTEMPTS {
            let new = NewOrder {
                order_number: generate_order_number(),
                idempotency_key,
                customer_name: draft.name.trim().to_string(),
                customer_email: customer_email.clone(),
                customer_phone: draft.phone.trim().to_string(),
                shipping: ShippingAddress {
                    wilaya: draft.wilaya.trim().to_string(),
                    commune: draft.commune.trim().to_string(),
                    address: draft.address.trim().to_string(),
                },
                delivery_method: draft.delivery_method,
                total,
                payment_method: PaymentMethod::Cash,
                notes: some_if_not_blank(&draft.note),
                items: items.clone(),
            };

            match repo.create(&new).await {
                Ok(order) => {
                    tracing::info!(
                        order_number = %order.order_number,
                        total = %order.total,
                        "Order created"
                    );
                    return Ok(order.order_number);
                }
                Err(RepositoryError::Conflict(constraint))
                    if constraint.contains("idempotency") =>
                {
                    // Lost a race against a concurrent retry of the same
                    // submission; the winner's order is ours.
                    if let Some(existing) =
                        repo.find_by_idempotency_key(idempotency_key).await?
                    {
                        return Ok(existing.order_number);
                    }
                    return Err(RepositoryError::Conflict(constraint).into());
                }
                Err(RepositoryError::Conflict(constraint))
                    if attempt < MAX_NUMBER_ATTEMPTS =>
                {
                    tracing::warn!(attempt, constraint = %constraint, "Order number collision, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(SubmitError::NumberExhausted)
    }
}

/// Generate a random order reference, e.g. `DD-7GKQ2MXF`.
fn generate_order_number() -> OrderNumber {
    let mut rng = rand::rng();
    let code: String = (0..ORDER_NUMBER_CODE_LEN)
        .map(|_| {
            let b = *ORDER_NUMBER_ALPHABET.choose(&mut rng).unwrap_or(&b'X');
            char::from(b)
        })
        .collect();
    // The code is drawn from the reference alphabet with the fixed length,
    // so parsing cannot fail.
    OrderNumber::from_code(&code).expect("generated code is always in the reference alphabet")
}

/// Trimmed note, or `None` when blank.
fn some_if_not_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_number_is_well_formed() {
        for _ in 0..100 {
            let number = generate_order_number();
            assert!(OrderNumber::parse(number.as_str()).is_ok());
        }
    }

    #[test]
    fn test_generated_numbers_vary() {
        let a = generate_order_number();
        let b = generate_order_number();
        // 31^8 codes; two equal draws in a row means the RNG is broken.
        assert_ne!(a, b);
    }

    #[test]
    fn test_some_if_not_blank() {
        assert_eq!(some_if_not_blank("  "), None);
        assert_eq!(some_if_not_blank(""), None);
        assert_eq!(
            some_if_not_blank(" fragile "),
            Some("fragile".to_string())
        );
    }
}
