//! Primitive shared types.
//!
//! Newtype wrappers and small enums used by every component. These are the
//! building blocks of the domain modules ([`crate::cart`], [`crate::order`],
//! ...) and carry their own parsing and validation.

pub mod email;
pub mod id;
pub mod money;
pub mod status;

pub use email::{Email, EmailError};
pub use id::{OrderId, OrderItemId, ProductId};
pub use status::{InvalidTransition, OrderStatus, PaymentMethod};
