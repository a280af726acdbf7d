//! Order repository for the back office: listing, detail, and the status
//! lifecycle write.
//!
//! `set_status` is the only mutation the admin performs. It locks the row,
//! checks the requested change against the lifecycle graph, and rejects
//! anything that is not a declared edge - including any change out of a
//! terminal status. Applying the same terminal walk twice therefore fails
//! loudly instead of silently re-updating.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use dar_decor_core::checkout::DeliveryMethod;
use dar_decor_core::order::{Order, OrderItem, OrderNumber, ShippingAddress};
use dar_decor_core::{Email, OrderId, OrderItemId, OrderStatus, PaymentMethod, ProductId};

use super::RepositoryError;

/// One row of the order list.
#[derive(Debug, Clone)]
pub struct OrderSummary {
    pub id: OrderId,
    pub order_number: OrderNumber,
    pub customer_name: String,
    pub wilaya: String,
    pub total: Decimal,
    pub status: OrderStatus,
    pub item_count: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct SummaryRow {
    id: OrderId,
    order_number: String,
    customer_name: String,
    wilaya: String,
    total: Decimal,
    status: String,
    item_count: i64,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    order_number: String,
    customer_name: String,
    customer_email: String,
    customer_phone: String,
    wilaya: String,
    commune: String,
    address: String,
    delivery_method: String,
    total: Decimal,
    payment_method: String,
    status: String,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct OrderItemRow {
    id: OrderItemId,
    order_id: OrderId,
    product_id: ProductId,
    product_name: String,
    quantity: i32,
    price: Decimal,
    size: String,
    frame: String,
    finish: Option<String>,
}

/// Repository for back-office order operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List orders, newest first, optionally filtered by status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::DataCorruption` for unparseable stored values.
    pub async fn list(
        &self,
        status: Option<OrderStatus>,
    ) -> Result<Vec<OrderSummary>, RepositoryError> {
        let rows = sqlx::query_as::<_, SummaryRow>(
            r"
            SELECT o.id, o.order_number, o.customer_name, o.wilaya,
                   o.total, o.status, o.created_at,
                   COUNT(i.id) AS item_count
            FROM orders o
            LEFT JOIN order_items i ON i.order_id = o.id
            WHERE $1::TEXT IS NULL OR o.status = $1
            GROUP BY o.id
            ORDER BY o.created_at DESC
            ",
        )
        .bind(status.map(|s| s.to_string()))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(into_summary).collect()
    }

    /// Count orders per lifecycle status, for the dashboard.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_by_status(&self) -> Result<Vec<(OrderStatus, i64)>, RepositoryError> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            r"
            SELECT status, COUNT(*) FROM orders GROUP BY status
            ",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter()
            .map(|(status, count)| {
                let status: OrderStatus = status.parse().map_err(|e| {
                    RepositoryError::DataCorruption(format!("invalid status in database: {e}"))
                })?;
                Ok((status, count))
            })
            .collect()
    }

    /// Get an order with its items by internal ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::DataCorruption` if the stored row is invalid.
    pub async fn get_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, order_number, customer_name, customer_email,
                   customer_phone, wilaya, commune, address,
                   delivery_method, total, payment_method, status, notes,
                   created_at, updated_at
            FROM orders
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, OrderItemRow>(
            r"
            SELECT id, order_id, product_id, product_name,
                   quantity, price, size, frame, finish
            FROM order_items
            WHERE order_id = $1
            ORDER BY id
            ",
        )
        .bind(row.id)
        .fetch_all(self.pool)
        .await?;

        into_order(row, items).map(Some)
    }

    /// Apply a lifecycle transition to an order.
    ///
    /// Locks the row, validates `(current, new)` against the lifecycle
    /// graph, then updates status and `updated_at` in the same transaction.
    /// Returns the new status on success.
    ///
    /// # Errors
    ///
    /// - `RepositoryError::NotFound` - no such order
    /// - `RepositoryError::InvalidTransition` - the change is not a declared
    ///   edge (it is rejected, never silently applied)
    /// - `RepositoryError::Database` / `DataCorruption` - storage failures
    pub async fn set_status(
        &self,
        id: OrderId,
        new_status: OrderStatus,
    ) -> Result<OrderStatus, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, (String,)>(
            r"
            SELECT status FROM orders WHERE id = $1 FOR UPDATE
            ",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((current,)) = row else {
            return Err(RepositoryError::NotFound);
        };
        let current: OrderStatus = current.parse().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid status in database: {e}"))
        })?;

        let applied = current.transition_to(new_status)?;

        sqlx::query(
            r"
            UPDATE orders SET status = $1, updated_at = now() WHERE id = $2
            ",
        )
        .bind(applied.to_string())
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(order_id = %id, from = %current, to = %applied, "Order status changed");
        Ok(applied)
    }
}

fn into_summary(row: SummaryRow) -> Result<OrderSummary, RepositoryError> {
    let order_number = OrderNumber::parse(&row.order_number).map_err(|e| {
        RepositoryError::DataCorruption(format!("invalid order number in database: {e}"))
    })?;
    let status: OrderStatus = row.status.parse().map_err(|e| {
        RepositoryError::DataCorruption(format!("invalid status in database: {e}"))
    })?;

    Ok(OrderSummary {
        id: row.id,
        order_number,
        customer_name: row.customer_name,
        wilaya: row.wilaya,
        total: row.total,
        status,
        item_count: row.item_count,
        created_at: row.created_at,
    })
}

/// Convert database rows into the domain order, validating stored values.
fn into_order(row: OrderRow, items: Vec<OrderItemRow>) -> Result<Order, RepositoryError> {
    let order_number = OrderNumber::parse(&row.order_number).map_err(|e| {
        RepositoryError::DataCorruption(format!("invalid order number in database: {e}"))
    })?;
    let customer_email = Email::parse(&row.customer_email).map_err(|e| {
        RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
    })?;
    let status: OrderStatus = row.status.parse().map_err(|e| {
        RepositoryError::DataCorruption(format!("invalid status in database: {e}"))
    })?;
    let payment_method: PaymentMethod = row.payment_method.parse().map_err(|e| {
        RepositoryError::DataCorruption(format!("invalid payment method in database: {e}"))
    })?;
    let delivery_method: DeliveryMethod = row.delivery_method.parse().map_err(|e| {
        RepositoryError::DataCorruption(format!("invalid delivery method in database: {e}"))
    })?;

    let items = items
        .into_iter()
        .map(|item| {
            let quantity = u32::try_from(item.quantity).map_err(|_| {
                RepositoryError::DataCorruption(format!(
                    "negative quantity in order item {}",
                    item.id
                ))
            })?;
            Ok(OrderItem {
                id: item.id,
                order_id: item.order_id,
                product_id: item.product_id,
                product_name: item.product_name,
                quantity,
                price: item.price,
                size: item.size,
                frame: item.frame,
                finish: item.finish,
            })
        })
        .collect::<Result<Vec<_>, RepositoryError>>()?;

    Ok(Order {
        id: row.id,
        order_number,
        customer_name: row.customer_name,
        customer_email,
        customer_phone: row.customer_phone,
        shipping: ShippingAddress {
            wilaya: row.wilaya,
            commune: row.commune,
            address: row.address,
        },
        delivery_method,
        items,
        total: row.total,
        payment_method,
        status,
        notes: row.notes,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}
