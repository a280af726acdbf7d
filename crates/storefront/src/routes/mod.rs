//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page
//! GET  /health                 - Health check
//!
//! # Products
//! GET  /products               - Product listing
//! GET  /products/{slug}        - Product detail with variant pickers
//! GET  /products/{slug}/price  - Resolved price fragment (HTMX)
//!
//! # Cart (HTMX fragments)
//! GET  /cart                   - Cart page
//! POST /cart/add               - Add to cart (merges by variant key)
//! POST /cart/update            - Update quantity (0 removes the line)
//! POST /cart/remove            - Remove one exact variant
//! POST /cart/remove-product    - Remove every variant of a product
//! GET  /cart/count             - Cart count badge (fragment)
//!
//! # Checkout wizard
//! GET  /checkout               - Wizard page (reopens at the cart step)
//! POST /checkout/begin         - Cart -> details (needs a non-empty cart)
//! POST /checkout/field         - Live per-field edit + error clearing
//! POST /checkout/details       - Details -> payment (full validation)
//! POST /checkout/back          - One step back
//! POST /checkout/confirm       - Payment -> success via order submission
//!
//! # Orders
//! GET  /orders/{number}        - Order confirmation lookup
//! ```

pub mod cart;
pub mod checkout;
pub mod home;
pub mod orders;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{slug}", get(products::show))
        .route("/{slug}/price", get(products::price))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/remove-product", post(cart::remove_product))
        .route("/count", get(cart::count))
}

/// Create the checkout wizard routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(checkout::show))
        .route("/begin", post(checkout::begin))
        .route("/field", post(checkout::field))
        .route("/details", post(checkout::details))
        .route("/back", post(checkout::back))
        .route("/confirm", post(checkout::confirm))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Home page
        .route("/", get(home::home))
        // Product routes
        .nest("/products", product_routes())
        // Cart routes
        .nest("/cart", cart_routes())
        // Checkout wizard
        .nest("/checkout", checkout_routes())
        // Order confirmation lookup
        .route("/orders/{number}", get(orders::show))
}
