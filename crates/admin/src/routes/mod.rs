//! HTTP route handlers for the back office.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                    - Dashboard (order counts per status)
//! GET  /health              - Health check
//!
//! # Orders
//! GET  /orders              - Order list (?status= filter, cached)
//! GET  /orders/{id}         - Order detail
//! POST /orders/{id}/status  - Lifecycle transition (422 on invalid jumps)
//! ```

pub mod dashboard;
pub mod orders;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::list))
        .route("/{id}", get(orders::detail))
        .route("/{id}/status", post(orders::set_status))
}

/// Create all routes for the admin panel.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::show))
        .nest("/orders", order_routes())
}
