//! Checkout wizard route handlers.
//!
//! The wizard walks cart review -> details -> payment -> success as HTMX
//! fragment swaps inside one page. The flow itself (step, draft, field
//! errors) is a core [`CheckoutFlow`] stored in the session; handlers load
//! it, drive one transition, save it back, and render the fragment for
//! whatever stage the flow ends up on.
//!
//! Failure stays where it is: a validation error re-renders the details form
//! with its field errors, a failed submission re-renders the payment stage
//! with a message - cart and draft untouched in both cases.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use dar_decor_core::checkout::{CheckoutError, CheckoutFlow, CheckoutStep, DraftField};
use dar_decor_core::types::money::format_da;

use crate::error::{AppError, Result};
use crate::filters;
use crate::models::{
    SessionCart, checkout_token, clear_checkout_token, load_checkout, save_checkout,
};
use crate::routes::cart::CartView;
use crate::services::OrderService;
use crate::state::AppState;

// =============================================================================
// View Types
// =============================================================================

/// One field of the details form: its current value and error, if any.
#[derive(Clone, Default)]
pub struct FieldView {
    pub value: String,
    pub error: Option<String>,
}

/// Details form display data.
#[derive(Clone)]
pub struct DetailsView {
    pub name: FieldView,
    pub phone: FieldView,
    pub email: FieldView,
    pub wilaya: FieldView,
    pub commune: FieldView,
    pub address: FieldView,
    pub note: String,
    pub home_delivery: bool,
}

impl From<&CheckoutFlow> for DetailsView {
    fn from(flow: &CheckoutFlow) -> Self {
        let field = |field: DraftField, value: &str| FieldView {
            value: value.to_owned(),
            error: flow.errors.get(field).map(str::to_owned),
        };
        Self {
            name: field(DraftField::Name, &flow.draft.name),
            phone: field(DraftField::Phone, &flow.draft.phone),
            email: field(DraftField::Email, &flow.draft.email),
            wilaya: field(DraftField::Wilaya, &flow.draft.wilaya),
            commune: field(DraftField::Commune, &flow.draft.commune),
            address: field(DraftField::Address, &flow.draft.address),
            note: flow.draft.note.clone(),
            home_delivery: flow.draft.delivery_method
                == dar_decor_core::checkout::DeliveryMethod::Home,
        }
    }
}

/// Payment stage display data: what will be ordered, and for whom.
#[derive(Clone)]
pub struct PaymentView {
    pub cart: CartView,
    pub total: String,
    pub name: String,
    pub phone: String,
    pub destination: String,
    /// Failure message from a previous submission attempt, if any.
    pub failure: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Full checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/show.html")]
pub struct CheckoutPageTemplate {
    pub cart: CartView,
}

/// Cart review stage fragment.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/step_cart.html")]
pub struct StepCartTemplate {
    pub cart: CartView,
    pub message: Option<String>,
}

/// Details stage fragment.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/step_details.html")]
pub struct StepDetailsTemplate {
    pub form: DetailsView,
}

/// Payment stage fragment.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/step_payment.html")]
pub struct StepPaymentTemplate {
    pub payment: PaymentView,
}

/// Success stage fragment.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/step_success.html")]
pub struct StepSuccessTemplate {
    pub order_number: String,
}

// =============================================================================
// Form Types
// =============================================================================

/// One live field edit: the input posts its own name/value pair.
pub type FieldForm = std::collections::BTreeMap<String, String>;

/// The full details form, posted on "continue".
#[derive(Debug, Deserialize)]
pub struct DetailsForm {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub wilaya: String,
    pub commune: String,
    pub address: String,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub delivery_method: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the checkout page.
///
/// Opening the wizard always lands on the cart review stage: an abandoned
/// flow keeps its draft but restarts from the cart; a completed flow starts
/// over entirely.
#[instrument(skip(session))]
pub async fn show(session: Session) -> Result<CheckoutPageTemplate> {
    let mut flow = load_checkout(&session).await?;
    flow.reopen();
    save_checkout(&session, &flow).await?;

    let cart = SessionCart::load(&session).await?;
    Ok(CheckoutPageTemplate {
        cart: CartView::from(cart.cart()),
    })
}

/// Cart review -> details. Refused while the cart is empty (HTMX).
#[instrument(skip(session))]
pub async fn begin(session: Session) -> Result<Response> {
    let cart = SessionCart::load(&session).await?;
    let mut flow = load_checkout(&session).await?;

    match flow.begin(cart.cart()) {
        Ok(()) => {
            save_checkout(&session, &flow).await?;
            Ok(StepDetailsTemplate {
                form: DetailsView::from(&flow),
            }
            .into_response())
        }
        Err(CheckoutError::EmptyCart) => Ok(StepCartTemplate {
            cart: CartView::from(cart.cart()),
            message: Some("Your cart is empty - add something first.".to_string()),
        }
        .into_response()),
        Err(e) => Err(AppError::BadRequest(e.to_string())),
    }
}

/// Live per-field edit (HTMX).
///
/// Stores the value and clears that field's error without re-validating the
/// rest of the form; the response swaps just the field's error slot.
#[instrument(skip(session, form))]
pub async fn field(session: Session, Form(form): Form<FieldForm>) -> Result<Response> {
    let mut flow = load_checkout(&session).await?;

    let mut edited = false;
    for (name, value) in &form {
        if let Ok(field) = name.parse::<DraftField>() {
            flow.edit_field(field, value);
            edited = true;
        }
    }
    if !edited {
        return Err(AppError::BadRequest("unknown checkout field".to_string()));
    }
    save_checkout(&session, &flow).await?;

    // The edited field never keeps its error; swap in an empty slot.
    Ok(axum::response::Html(String::new()).into_response())
}

/// Details -> payment. Validates the whole draft (HTMX).
#[instrument(skip(state, session, form))]
pub async fn details(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<DetailsForm>,
) -> Result<Response> {
    let mut flow = load_checkout(&session).await?;

    flow.edit_field(DraftField::Name, &form.name);
    flow.edit_field(DraftField::Phone, &form.phone);
    flow.edit_field(DraftField::Email, &form.email);
    flow.edit_field(DraftField::Wilaya, &form.wilaya);
    flow.edit_field(DraftField::Commune, &form.commune);
    flow.edit_field(DraftField::Address, &form.address);
    flow.edit_field(DraftField::Note, &form.note);
    flow.edit_field(DraftField::DeliveryMethod, &form.delivery_method);

    let result = flow.submit_details();
    save_checkout(&session, &flow).await?;

    match result {
        Ok(()) => {
            // Entering payment fixes the idempotency key for this checkout.
            checkout_token(&session).await?;
            let cart = SessionCart::load(&session).await?;
            Ok(payment_fragment(&state, &flow, &cart, None).into_response())
        }
        Err(CheckoutError::InvalidDraft) => Ok(StepDetailsTemplate {
            form: DetailsView::from(&flow),
        }
        .into_response()),
        Err(e) => Err(AppError::BadRequest(e.to_string())),
    }
}

/// One step back (HTMX).
#[instrument(skip(state, session))]
pub async fn back(State(state): State<AppState>, session: Session) -> Result<Response> {
    let mut flow = load_checkout(&session).await?;
    if flow.step_back().is_err() {
        // Nothing before the cart stage; just re-render it.
        flow.reopen();
    }
    save_checkout(&session, &flow).await?;

    let cart = SessionCart::load(&session).await?;
    Ok(render_step(&state, &flow, &cart))
}

/// Payment -> success, via the order submission service (HTMX).
///
/// On success the flow completes, the cart is cleared exactly once, and the
/// idempotency key is dropped. On failure the flow stays on the payment
/// stage with cart and draft intact, and the fragment carries the failure
/// message so the shopper can retry.
#[instrument(skip(state, session))]
pub async fn confirm(State(state): State<AppState>, session: Session) -> Result<Response> {
    let mut flow = load_checkout(&session).await?;
    if flow.step != CheckoutStep::Payment {
        return Err(AppError::BadRequest(
            "confirmation is only available from the payment step".to_string(),
        ));
    }

    let mut cart = SessionCart::load(&session).await?;
    let token = checkout_token(&session).await?;

    let service = OrderService::new(state.pool());
    match service.submit(&flow.draft, cart.cart(), token).await {
        Ok(order_number) => {
            flow.complete()
                .map_err(|e| AppError::Internal(e.to_string()))?;
            cart.clear(&session).await?;
            clear_checkout_token(&session).await?;
            save_checkout(&session, &flow).await?;

            tracing::info!(order_number = %order_number, "Checkout completed");
            Ok(StepSuccessTemplate {
                order_number: order_number.to_string(),
            }
            .into_response())
        }
        Err(e) => {
            tracing::error!(error = %e, "Order submission failed");
            Ok(payment_fragment(
                &state,
                &flow,
                &cart,
                Some("We could not place your order. Nothing was charged - please try again.".to_string()),
            )
            .into_response())
        }
    }
}

// =============================================================================
// Fragment Helpers
// =============================================================================

/// Render the fragment for the flow's current stage.
fn render_step(state: &AppState, flow: &CheckoutFlow, cart: &SessionCart) -> Response {
    match flow.step {
        CheckoutStep::Cart => StepCartTemplate {
            cart: CartView::from(cart.cart()),
            message: None,
        }
        .into_response(),
        CheckoutStep::Details => StepDetailsTemplate {
            form: DetailsView::from(flow),
        }
        .into_response(),
        CheckoutStep::Payment => payment_fragment(state, flow, cart, None).into_response(),
        CheckoutStep::Success => StepSuccessTemplate {
            order_number: String::new(),
        }
        .into_response(),
    }
}

/// Build the payment stage fragment.
fn payment_fragment(
    _state: &AppState,
    flow: &CheckoutFlow,
    cart: &SessionCart,
    failure: Option<String>,
) -> StepPaymentTemplate {
    StepPaymentTemplate {
        payment: PaymentView {
            cart: CartView::from(cart.cart()),
            total: format_da(cart.cart().total_price()),
            name: flow.draft.name.clone(),
            phone: flow.draft.phone.clone(),
            destination: format!(
                "{}, {}, {}",
                flow.draft.address, flow.draft.commune, flow.draft.wilaya
            ),
            failure,
        },
    }
}
