//! Order confirmation lookup.
//!
//! Shoppers land here from the success stage (or from the reference on the
//! delivery slip). Read-only: nothing on this page can mutate an order.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, State};
use tracing::instrument;

use dar_decor_core::order::{Order, OrderItem, OrderNumber};
use dar_decor_core::types::money::format_da;

use crate::db::OrderRepository;
use crate::error::{AppError, Result};
use crate::filters;
use crate::state::AppState;

/// One order line for display.
#[derive(Clone)]
pub struct OrderLineView {
    pub product_name: String,
    pub size: String,
    pub frame: String,
    pub finish: Option<String>,
    pub quantity: u32,
    pub price: String,
    pub line_total: String,
}

impl From<&OrderItem> for OrderLineView {
    fn from(item: &OrderItem) -> Self {
        Self {
            product_name: item.product_name.clone(),
            size: item.size.clone(),
            frame: item.frame.clone(),
            finish: item.finish.clone(),
            quantity: item.quantity,
            price: format_da(item.price),
            line_total: format_da(item.line_total()),
        }
    }
}

/// Order confirmation display data.
#[derive(Clone)]
pub struct OrderView {
    pub order_number: String,
    pub status: &'static str,
    /// Lowercase status for CSS class names.
    pub status_class: String,
    pub customer_name: String,
    pub destination: String,
    pub lines: Vec<OrderLineView>,
    pub total: String,
    pub placed_at: String,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        Self {
            order_number: order.order_number.to_string(),
            status: order.status.label(),
            status_class: order.status.to_string(),
            customer_name: order.customer_name.clone(),
            destination: format!(
                "{}, {}, {}",
                order.shipping.address, order.shipping.commune, order.shipping.wilaya
            ),
            lines: order.items.iter().map(OrderLineView::from).collect(),
            total: format_da(order.total),
            placed_at: order.created_at.format("%d %b %Y, %H:%M").to_string(),
        }
    }
}

/// Order confirmation page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/show.html")]
pub struct OrderShowTemplate {
    pub order: OrderView,
}

/// Display an order by its human-facing reference.
///
/// A malformed or unknown reference is a terminal not-found view, never a
/// retry.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(number): Path<String>,
) -> Result<OrderShowTemplate> {
    let number =
        OrderNumber::parse(&number).map_err(|_| AppError::NotFound(number.clone()))?;

    let order = OrderRepository::new(state.pool())
        .get_by_number(&number)
        .await?
        .ok_or_else(|| AppError::NotFound(number.to_string()))?;

    Ok(OrderShowTemplate {
        order: OrderView::from(&order),
    })
}
