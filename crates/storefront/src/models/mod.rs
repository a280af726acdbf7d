//! Storefront data models.

pub mod session;

pub use session::{
    SessionCart, checkout_token, clear_checkout_token, load_checkout, save_checkout, session_keys,
};
