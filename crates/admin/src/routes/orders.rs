//! Order management handlers: list, detail, and the status lifecycle.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::Redirect,
};
use serde::Deserialize;
use tracing::instrument;

use dar_decor_core::order::{Order, OrderItem};
use dar_decor_core::types::money::format_da;
use dar_decor_core::{OrderId, OrderStatus};

use crate::db::{OrderRepository, OrderSummary};
use crate::error::{AppError, Result};
use crate::filters;
use crate::state::AppState;

// =============================================================================
// View Types
// =============================================================================

/// One row of the order list.
#[derive(Clone)]
pub struct OrderRowView {
    pub id: i32,
    pub order_number: String,
    pub customer_name: String,
    pub wilaya: String,
    pub item_count: i64,
    pub total: String,
    pub status: &'static str,
    pub status_class: String,
    pub placed_at: String,
}

impl From<&OrderSummary> for OrderRowView {
    fn from(summary: &OrderSummary) -> Self {
        Self {
            id: summary.id.as_i32(),
            order_number: summary.order_number.to_string(),
            customer_name: summary.customer_name.clone(),
            wilaya: summary.wilaya.clone(),
            item_count: summary.item_count,
            total: format_da(summary.total),
            status: summary.status.label(),
            status_class: summary.status.to_string(),
            placed_at: summary.created_at.format("%d %b %Y, %H:%M").to_string(),
        }
    }
}

/// Status filter tab.
#[derive(Clone)]
pub struct StatusTabView {
    pub value: String,
    pub label: &'static str,
    pub active: bool,
}

/// One line of the order detail.
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

/// A status the order can move to next.
#[derive(Clone)]
pub struct NextStatusView {
    pub value: String,
    pub label: &'static str,
}

/// Order detail display data.
#[derive(Clone)]
pub struct OrderDetailView {
    pub id: i32,
    pub order_number: String,
    pub status: &'static str,
    pub status_class: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub destination: String,
    pub delivery_method: String,
    pub payment_method: String,
    pub notes: Option<String>,
    pub lines: Vec<OrderLineView>,
    pub total: String,
    pub placed_at: String,
    pub updated_at: String,
    pub next_statuses: Vec<NextStatusView>,
}

impl From<&Order> for OrderDetailView {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.as_i32(),
            order_number: order.order_number.to_string(),
            status: order.status.label(),
            status_class: order.status.to_string(),
            customer_name: order.customer_name.clone(),
            customer_email: order.customer_email.to_string(),
            customer_phone: order.customer_phone.clone(),
            destination: format!(
                "{}, {}, {}",
                order.shipping.address, order.shipping.commune, order.shipping.wilaya
            ),
            delivery_method: order.delivery_method.to_string(),
            payment_method: order.payment_method.to_string(),
            notes: order.notes.clone(),
            lines: order.items.iter().map(OrderLineView::from).collect(),
            total: format_da(order.total),
            placed_at: order.created_at.format("%d %b %Y, %H:%M").to_string(),
            updated_at: order.updated_at.format("%d %b %Y, %H:%M").to_string(),
            next_statuses: order
                .status
                .next_statuses()
                .iter()
                .map(|s| NextStatusView {
                    value: s.to_string(),
                    label: s.label(),
                })
                .collect(),
        }
    }
}

// =============================================================================
// Input Types
// =============================================================================

/// Order list query parameters.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
}

/// Status transition form data.
#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Order list page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/list.html")]
pub struct OrdersListTemplate {
    pub orders: Vec<OrderRowView>,
    pub tabs: Vec<StatusTabView>,
}

/// Order detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/detail.html")]
pub struct OrderDetailTemplate {
    pub order: OrderDetailView,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the order list, optionally filtered by status.
#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<OrdersListTemplate> {
    let filter = match query.status.as_deref() {
        None | Some("") | Some("all") => None,
        Some(raw) => Some(
            raw.parse::<OrderStatus>()
                .map_err(AppError::BadRequest)?,
        ),
    };

    let orders = state.order_list(filter).await?;

    let mut tabs = vec![StatusTabView {
        value: "all".to_string(),
        label: "All",
        active: filter.is_none(),
    }];
    tabs.extend(OrderStatus::ALL.iter().map(|status| StatusTabView {
        value: status.to_string(),
        label: status.label(),
        active: filter == Some(*status),
    }));

    Ok(OrdersListTemplate {
        orders: orders.iter().map(OrderRowView::from).collect(),
        tabs,
    })
}

/// Display one order.
#[instrument(skip(state))]
pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<OrderDetailTemplate> {
    let order = OrderRepository::new(state.pool())
        .get_by_id(OrderId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;

    Ok(OrderDetailTemplate {
        order: OrderDetailView::from(&order),
    })
}

/// Apply a lifecycle transition to an order.
///
/// Invalid jumps (skipping a stage, leaving a terminal status) come back as
/// 422 from the repository; valid ones invalidate the cached list views and
/// redirect to the detail page.
#[instrument(skip(state, form))]
pub async fn set_status(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Form(form): Form<StatusForm>,
) -> Result<Redirect> {
    let new_status: OrderStatus = form.status.parse().map_err(AppError::BadRequest)?;

    OrderRepository::new(state.pool())
        .set_status(OrderId::new(id), new_status)
        .await?;

    // Cached list views must reflect the transition immediately.
    state.invalidate_order_lists();

    Ok(Redirect::to(&format!("/orders/{id}")))
}
