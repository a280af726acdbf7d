//! Storefront services.

pub mod orders;

pub use orders::{OrderService, SubmitError};
