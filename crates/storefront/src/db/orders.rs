//! Order repository: the order write path and lookup boundary.
//!
//! Submission inserts the header and every item inside one transaction, so
//! readers never observe an order with fewer items than were submitted. All
//! lookups go straight to Postgres; an order is readable the moment its
//! transaction commits.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use dar_decor_core::checkout::DeliveryMethod;
use dar_decor_core::order::{Order, OrderItem, OrderNumber, ShippingAddress};
use dar_decor_core::{Email, OrderId, OrderItemId, OrderStatus, PaymentMethod, ProductId};

use super::RepositoryError;

/// Input for persisting a new order header.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_number: OrderNumber,
    pub idempotency_key: Uuid,
    pub customer_name: String,
    pub customer_email: Email,
    pub customer_phone: String,
    pub shipping: ShippingAddress,
    pub delivery_method: DeliveryMethod,
    pub total: Decimal,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
    pub items: Vec<NewOrderItem>,
}

/// Input for persisting one order line. Copied verbatim from a cart line.
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: u32,
    pub price: Decimal,
    pub size: String,
    pub frame: String,
    pub finish: Option<String>,
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

/// Repository for order persistence and lookup.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Persist an order and all of its items atomically.
    ///
    /// The header and every line are written in one transaction; any failure
    /// rolls the whole order back. The status starts at the lifecycle's
    /// initial state.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` with the constraint name when the
    /// order number or idempotency key already exists, and
    /// `RepositoryError::Database` for other failures.
    pub async fn create(&self, new: &NewOrder) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let header = sqlx::query_as::<_, OrderRow>(
            r"
            INSERT INTO orders (
                order_number, idempotency_key,
                customer_name, customer_email, customer_phone,
                wilaya, commune, address, delivery_method,
                total, payment_method, status, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING id, order_number, customer_name, customer_email,
                      customer_phone, wilaya, commune, address,
                      delivery_method, total, payment_method, status, notes,
                      created_at, updated_at
            ",
        )
        .bind(new.order_number.as_str())
        .bind(new.idempotency_key)
        .bind(&new.customer_name)
        .bind(new.customer_email.as_str())
        .bind(&new.customer_phone)
        .bind(&new.shipping.wilaya)
        .bind(&new.shipping.commune)
        .bind(&new.shipping.address)
        .bind(new.delivery_method.to_string())
        .bind(new.total)
        .bind(new.payment_method.to_string())
        .bind(OrderStatus::default().to_string())
        .bind(&new.notes)
        .fetch_one(&mut *tx)
        .await
        .map_err(RepositoryError::from_sqlx)?;

        let order_id = header.id;
        let mut items = Vec::with_capacity(new.items.len());
        for item in &new.items {
            let row = sqlx::query_as::<_, OrderItemRow>(
                r"
                INSERT INTO order_items (
                    order_id, product_id, product_name,
                    quantity, price, size, frame, finish
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING id, order_id, product_id, product_name,
                          quantity, price, size, frame, finish
                ",
            )
            .bind(order_id)
            .bind(item.product_id)
            .bind(&item.product_name)
            .bind(i64::from(item.quantity))
            .bind(item.price)
            .bind(&item.size)
            .bind(&item.frame)
            .bind(&item.finish)
            .fetch_one(&mut *tx)
            .await?;
            items.push(row);
        }

        tx.commit().await?;

        into_order(header, items)
    }

    /// Find the order previously created with this idempotency key, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::DataCorruption` if the stored row is invalid.
    pub async fn find_by_idempotency_key(
        &self,
        key: Uuid,
    ) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, order_number, customer_name, customer_email,
                   customer_phone, wilaya, commune, address,
                   delivery_method, total, payment_method, status, notes,
                   created_at, updated_at
            FROM orders
            WHERE idempotency_key = $1
            ",
        )
        .bind(key)
        .fetch_optional(self.pool)
        .await?;

        self.hydrate(row).await
    }

    /// Get an order by its human-facing reference.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::DataCorruption` if the stored row is invalid.
    pub async fn get_by_number(
        &self,
        number: &OrderNumber,
    ) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, order_number, customer_name, customer_email,
                   customer_phone, wilaya, commune, address,
                   delivery_method, total, payment_method, status, notes,
                   created_at, updated_at
            FROM orders
            WHERE order_number = $1
            ",
        )
        .bind(number.as_str())
        .fetch_optional(self.pool)
        .await?;

        self.hydrate(row).await
    }

    /// Get an order by its internal ID.
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

        self.hydrate(row).await
    }

    /// Load items for a header row and assemble the domain order.
    async fn hydrate(&self, row: Option<OrderRow>) -> Result<Option<Order>, RepositoryError> {
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
