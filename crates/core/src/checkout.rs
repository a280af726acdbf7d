//! Checkout flow state machine and draft validation.
//!
//! The flow walks `Cart → Details → Payment → Success`. Forward transitions
//! are guarded (non-empty cart, valid draft, successful submission); `Details`
//! and `Payment` can step back one stage; `Success` is terminal. The whole
//! flow is a plain value the storefront keeps in the session, so every rule
//! here is testable without HTTP or a database.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::Email;
use crate::cart::Cart;

/// The stage the checkout flow is currently on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStep {
    /// Reviewing the cart contents.
    #[default]
    Cart,
    /// Capturing contact and shipping details.
    Details,
    /// Confirming the cash-on-delivery order.
    Payment,
    /// Order submitted. Terminal.
    Success,
}

impl CheckoutStep {
    /// The stage one step back, when going back is allowed.
    #[must_use]
    pub const fn back(self) -> Option<Self> {
        match self {
            Self::Details => Some(Self::Cart),
            Self::Payment => Some(Self::Details),
            Self::Cart | Self::Success => None,
        }
    }

    /// Whether the flow can never leave this stage.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Success)
    }
}

/// How the order reaches the customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMethod {
    /// Courier to the customer's address.
    #[default]
    Home,
    /// Pickup at the carrier's desk in the destination wilaya.
    Desk,
}

impl std::fmt::Display for DeliveryMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Home => write!(f, "home"),
            Self::Desk => write!(f, "desk"),
        }
    }
}

impl std::str::FromStr for DeliveryMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "home" => Ok(Self::Home),
            "desk" => Ok(Self::Desk),
            _ => Err(format!("invalid delivery method: {s}")),
        }
    }
}

/// A field of the checkout draft, used to key validation errors.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum DraftField {
    Name,
    Phone,
    Email,
    Wilaya,
    Commune,
    Address,
    Note,
    DeliveryMethod,
}

impl DraftField {
    /// Form/input name of this field.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Phone => "phone",
            Self::Email => "email",
            Self::Wilaya => "wilaya",
            Self::Commune => "commune",
            Self::Address => "address",
            Self::Note => "note",
            Self::DeliveryMethod => "delivery_method",
        }
    }
}

impl std::str::FromStr for DraftField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(Self::Name),
            "phone" => Ok(Self::Phone),
            "email" => Ok(Self::Email),
            "wilaya" => Ok(Self::Wilaya),
            "commune" => Ok(Self::Commune),
            "address" => Ok(Self::Address),
            "note" => Ok(Self::Note),
            "delivery_method" => Ok(Self::DeliveryMethod),
            _ => Err(format!("unknown checkout field: {s}")),
        }
    }
}

/// The in-progress contact and shipping form for one checkout session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutDraft {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub wilaya: String,
    pub commune: String,
    pub address: String,
    pub note: String,
    pub delivery_method: DeliveryMethod,
}

impl CheckoutDraft {
    /// Validate the draft, returning an error per offending field.
    ///
    /// Name, phone, email, wilaya, commune and address are required; email
    /// must additionally have a plausible shape. Note and delivery method
    /// are never invalid.
    #[must_use]
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::default();

        let required = [
            (DraftField::Name, &self.name, "Name is required"),
            (DraftField::Phone, &self.phone, "Phone number is required"),
            (DraftField::Email, &self.email, "Email is required"),
            (DraftField::Wilaya, &self.wilaya, "Wilaya is required"),
            (DraftField::Commune, &self.commune, "Commune is required"),
            (DraftField::Address, &self.address, "Address is required"),
        ];
        for (field, value, message) in required {
            if value.trim().is_empty() {
                errors.set(field, message);
            }
        }

        if !self.email.trim().is_empty() && Email::parse(&self.email).is_err() {
            errors.set(DraftField::Email, "Enter a valid email address");
        }

        errors
    }

    /// Set one field from its form value.
    pub fn set_field(&mut self, field: DraftField, value: &str) {
        match field {
            DraftField::Name => self.name = value.to_string(),
            DraftField::Phone => self.phone = value.to_string(),
            DraftField::Email => self.email = value.to_string(),
            DraftField::Wilaya => self.wilaya = value.to_string(),
            DraftField::Commune => self.commune = value.to_string(),
            DraftField::Address => self.address = value.to_string(),
            DraftField::Note => self.note = value.to_string(),
            DraftField::DeliveryMethod => {
                self.delivery_method = value.parse().unwrap_or_default();
            }
        }
    }
}

/// Validation errors keyed by draft field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors {
    errors: BTreeMap<DraftField, String>,
}

impl FieldErrors {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// The error for one field, if any.
    #[must_use]
    pub fn get(&self, field: DraftField) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    /// Record an error for a field.
    pub fn set(&mut self, field: DraftField, message: &str) {
        self.errors.insert(field, message.to_string());
    }

    /// Drop the error for one field, leaving the others untouched.
    pub fn clear(&mut self, field: DraftField) {
        self.errors.remove(&field);
    }
}

/// Why a checkout transition was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CheckoutError {
    /// Leaving the cart stage requires something in the cart.
    #[error("the cart is empty")]
    EmptyCart,
    /// The draft failed validation; the field errors say where.
    #[error("the checkout details are incomplete")]
    InvalidDraft,
    /// The requested transition does not exist from the current stage.
    #[error("not available from the {from:?} step")]
    WrongStep {
        /// Stage the flow was on when the transition was attempted.
        from: CheckoutStep,
    },
}

/// The checkout flow: current stage, draft, and field errors.
///
/// Lives in the session between requests. Closing the shop window keeps the
/// value around; [`CheckoutFlow::reopen`] is what the storefront calls when
/// the flow is displayed again.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutFlow {
    pub step: CheckoutStep,
    pub draft: CheckoutDraft,
    pub errors: FieldErrors,
}

impl CheckoutFlow {
    /// A fresh flow at the cart stage with an empty draft.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `Cart → Details`. Refused while the cart is empty.
    ///
    /// # Errors
    ///
    /// [`CheckoutError::EmptyCart`] when there is nothing to check out;
    /// [`CheckoutError::WrongStep`] when not on the cart stage.
    pub fn begin(&mut self, cart: &Cart) -> Result<(), CheckoutError> {
        if self.step != CheckoutStep::Cart {
            return Err(CheckoutError::WrongStep { from: self.step });
        }
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        self.step = CheckoutStep::Details;
        Ok(())
    }

    /// Update one draft field and clear that field's error.
    ///
    /// The rest of the error set is left alone: each field recovers
    /// individually as the user edits it, without re-validating the form.
    pub fn edit_field(&mut self, field: DraftField, value: &str) {
        self.draft.set_field(field, value);
        self.errors.clear(field);
    }

    /// `Details → Payment`. Validates the whole draft.
    ///
    /// # Errors
    ///
    /// [`CheckoutError::InvalidDraft`] when validation fails (the field
    /// errors are stored on the flow); [`CheckoutError::WrongStep`] when not
    /// on the details stage.
    pub fn submit_details(&mut self) -> Result<(), CheckoutError> {
        if self.step != CheckoutStep::Details {
            return Err(CheckoutError::WrongStep { from: self.step });
        }
        let errors = self.draft.validate();
        if errors.is_empty() {
            self.errors = FieldErrors::default();
            self.step = CheckoutStep::Payment;
            Ok(())
        } else {
            self.errors = errors;
            Err(CheckoutError::InvalidDraft)
        }
    }

    /// Step back one stage (`Details → Cart` or `Payment → Details`).
    ///
    /// # Errors
    ///
    /// [`CheckoutError::WrongStep`] from the cart or success stages.
    pub fn step_back(&mut self) -> Result<(), CheckoutError> {
        match self.step.back() {
            Some(previous) => {
                self.step = previous;
                Ok(())
            }
            None => Err(CheckoutError::WrongStep { from: self.step }),
        }
    }

    /// `Payment → Success`. Only the order submission path calls this, after
    /// the order has actually been persisted.
    ///
    /// # Errors
    ///
    /// [`CheckoutError::WrongStep`] when not on the payment stage.
    pub fn complete(&mut self) -> Result<(), CheckoutError> {
        if self.step != CheckoutStep::Payment {
            return Err(CheckoutError::WrongStep { from: self.step });
        }
        self.step = CheckoutStep::Success;
        Ok(())
    }

    /// Called when the checkout UI is opened.
    ///
    /// A flow abandoned mid-way resumes at the cart stage with the draft
    /// intact; a completed flow starts over from scratch.
    pub fn reopen(&mut self) {
        if self.step.is_terminal() {
            *self = Self::new();
        } else {
            self.step = CheckoutStep::Cart;
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::ProductId;
    use crate::cart::LineItem;

    fn cart_with_one_item() -> Cart {
        let mut cart = Cart::new();
        cart.add(LineItem {
            product_id: ProductId::new(1),
            name: "Print".to_string(),
            unit_price: Decimal::from(1000),
            quantity: 1,
            size: "M".to_string(),
            frame: "NONE".to_string(),
            finish: None,
            image: String::new(),
        });
        cart
    }

    fn valid_draft() -> CheckoutDraft {
        CheckoutDraft {
            name: "Amel B.".to_string(),
            phone: "0550 12 34 56".to_string(),
            email: "amel@example.dz".to_string(),
            wilaya: "Alger".to_string(),
            commune: "Hydra".to_string(),
            address: "12 rue des Frères".to_string(),
            note: String::new(),
            delivery_method: DeliveryMethod::Home,
        }
    }

    #[test]
    fn test_begin_refused_with_empty_cart() {
        let mut flow = CheckoutFlow::new();
        assert_eq!(flow.begin(&Cart::new()), Err(CheckoutError::EmptyCart));
        assert_eq!(flow.step, CheckoutStep::Cart);
    }

    #[test]
    fn test_begin_advances_with_items() {
        let mut flow = CheckoutFlow::new();
        flow.begin(&cart_with_one_item()).expect("cart has an item");
        assert_eq!(flow.step, CheckoutStep::Details);
    }

    #[test]
    fn test_invalid_email_blocks_details_with_one_field_error() {
        let mut flow = CheckoutFlow::new();
        flow.begin(&cart_with_one_item()).expect("begin");
        flow.draft = valid_draft();
        flow.draft.email = "not-an-email".to_string();

        assert_eq!(flow.submit_details(), Err(CheckoutError::InvalidDraft));
        assert_eq!(flow.step, CheckoutStep::Details);
        assert_eq!(flow.errors.len(), 1);
        assert!(flow.errors.get(DraftField::Email).is_some());
        assert!(flow.errors.get(DraftField::Name).is_none());
    }

    #[test]
    fn test_editing_a_field_clears_only_its_error() {
        let mut flow = CheckoutFlow::new();
        flow.begin(&cart_with_one_item()).expect("begin");
        // Empty draft: every required field errors.
        assert!(flow.submit_details().is_err());
        assert_eq!(flow.errors.len(), 6);

        flow.edit_field(DraftField::Name, "Amel B.");
        assert!(flow.errors.get(DraftField::Name).is_none());
        assert_eq!(flow.errors.len(), 5);
    }

    #[test]
    fn test_valid_draft_reaches_payment() {
        let mut flow = CheckoutFlow::new();
        flow.begin(&cart_with_one_item()).expect("begin");
        flow.draft = valid_draft();
        flow.submit_details().expect("draft is valid");
        assert_eq!(flow.step, CheckoutStep::Payment);
        assert!(flow.errors.is_empty());
    }

    #[test]
    fn test_back_steps_one_stage() {
        let mut flow = CheckoutFlow::new();
        flow.begin(&cart_with_one_item()).expect("begin");
        flow.draft = valid_draft();
        flow.submit_details().expect("details");

        flow.step_back().expect("payment -> details");
        assert_eq!(flow.step, CheckoutStep::Details);
        flow.step_back().expect("details -> cart");
        assert_eq!(flow.step, CheckoutStep::Cart);
        assert!(flow.step_back().is_err());
    }

    #[test]
    fn test_complete_only_from_payment() {
        let mut flow = CheckoutFlow::new();
        assert!(matches!(
            flow.complete(),
            Err(CheckoutError::WrongStep { .. })
        ));

        flow.begin(&cart_with_one_item()).expect("begin");
        flow.draft = valid_draft();
        flow.submit_details().expect("details");
        flow.complete().expect("payment -> success");
        assert_eq!(flow.step, CheckoutStep::Success);
    }

    #[test]
    fn test_success_is_terminal() {
        let mut flow = CheckoutFlow::new();
        flow.begin(&cart_with_one_item()).expect("begin");
        flow.draft = valid_draft();
        flow.submit_details().expect("details");
        flow.complete().expect("complete");

        assert!(flow.step_back().is_err());
        assert!(flow.begin(&cart_with_one_item()).is_err());
        assert!(flow.complete().is_err());
    }

    #[test]
    fn test_reopen_preserves_abandoned_draft() {
        let mut flow = CheckoutFlow::new();
        flow.begin(&cart_with_one_item()).expect("begin");
        flow.draft = valid_draft();

        flow.reopen();
        assert_eq!(flow.step, CheckoutStep::Cart);
        assert_eq!(flow.draft, valid_draft());
    }

    #[test]
    fn test_reopen_after_success_starts_fresh() {
        let mut flow = CheckoutFlow::new();
        flow.begin(&cart_with_one_item()).expect("begin");
        flow.draft = valid_draft();
        flow.submit_details().expect("details");
        flow.complete().expect("complete");

        flow.reopen();
        assert_eq!(flow, CheckoutFlow::new());
    }

    #[test]
    fn test_failed_submission_keeps_payment_stage() {
        // The route only calls complete() on service success; a failure
        // leaves the flow where it was. Model that here: no mutation happens.
        let mut flow = CheckoutFlow::new();
        flow.begin(&cart_with_one_item()).expect("begin");
        flow.draft = valid_draft();
        flow.submit_details().expect("details");
        let before = flow.clone();
        // (service failed; nothing is called on the flow)
        assert_eq!(flow, before);
        assert_eq!(flow.step, CheckoutStep::Payment);
    }
}
