//! Integration tests for Dar Décor.
//!
//! # Running Tests
//!
//! ```bash
//! # Start PostgreSQL and run migrations + seed
//! cargo run -p dar-decor-cli -- migrate run
//! cargo run -p dar-decor-cli -- seed catalog
//!
//! # Start both servers
//! cargo run -p dar-decor-storefront &
//! cargo run -p dar-decor-admin &
//!
//! # Run the ignored end-to-end tests
//! cargo test -p dar-decor-integration-tests -- --ignored
//! ```
//!
//! # Environment
//!
//! - `STOREFRONT_BASE_URL` (default `http://localhost:3000`)
//! - `ADMIN_BASE_URL` (default `http://localhost:3001`)
//! - `DATABASE_URL` for tests that go straight to the repositories

/// Base URL for the storefront (configurable via environment).
#[must_use]
pub fn storefront_base_url() -> String {
    std::env::var("STOREFRONT_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Base URL for the admin panel (configurable via environment).
#[must_use]
pub fn admin_base_url() -> String {
    std::env::var("ADMIN_BASE_URL").unwrap_or_else(|_| "http://localhost:3001".to_string())
}

/// A client with a cookie store, so the cart session sticks across requests.
///
/// # Panics
///
/// Panics if the client cannot be constructed (test-only code).
#[must_use]
pub fn session_client() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}
