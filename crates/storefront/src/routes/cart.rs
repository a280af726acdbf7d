//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! The cart itself lives in the session (see [`SessionCart`]): every handler
//! hydrates first, mutates in memory, then persists, so the in-memory and
//! stored cart can never diverge within a request.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{AppendHeaders, IntoResponse, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use dar_decor_core::ProductId;
use dar_decor_core::cart::{Cart, LineItem, VariantKey};
use dar_decor_core::types::money::format_da;

use crate::error::{AppError, Result};
use crate::filters;
use crate::models::SessionCart;
use crate::state::AppState;

/// Cart line display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub product_id: i32,
    pub name: String,
    pub size: String,
    pub frame: String,
    pub finish: Option<String>,
    pub quantity: u32,
    pub unit_price: String,
    pub line_total: String,
    pub image: String,
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub total_items: u32,
    pub total_price: String,
}

impl CartView {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.items().iter().map(CartItemView::from).collect(),
            total_items: cart.total_items(),
            total_price: format_da(cart.total_price()),
        }
    }
}

impl From<&LineItem> for CartItemView {
    fn from(line: &LineItem) -> Self {
        Self {
            product_id: line.product_id.as_i32(),
            name: line.name.clone(),
            size: line.size.clone(),
            frame: line.frame.clone(),
            finish: line.finish.clone(),
            quantity: line.quantity,
            unit_price: format_da(line.unit_price),
            line_total: format_da(line.line_total()),
            image: line.image.clone(),
        }
    }
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub slug: String,
    pub size: Option<String>,
    pub frame: Option<String>,
    pub finish: Option<String>,
    pub quantity: Option<u32>,
}

/// Identity of one cart line, as posted by the cart page.
#[derive(Debug, Deserialize)]
pub struct LineKeyForm {
    pub product_id: i32,
    pub size: String,
    pub frame: String,
    pub finish: Option<String>,
}

impl LineKeyForm {
    fn into_key(self) -> VariantKey {
        VariantKey {
            product_id: ProductId::new(self.product_id),
            size: self.size,
            frame: self.frame,
            finish: self.finish.filter(|f| !f.is_empty()),
        }
    }
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: i32,
    pub size: String,
    pub frame: String,
    pub finish: Option<String>,
    pub quantity: u32,
}

impl UpdateCartForm {
    fn into_parts(self) -> (VariantKey, u32) {
        let key = VariantKey {
            product_id: ProductId::new(self.product_id),
            size: self.size,
            frame: self.frame,
            finish: self.finish.filter(|f| !f.is_empty()),
        };
        (key, self.quantity)
    }
}

/// Remove whole product form data.
#[derive(Debug, Deserialize)]
pub struct RemoveProductForm {
    pub product_id: i32,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub cart: CartView,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

/// Display the cart page.
#[instrument(skip(session))]
pub async fn show(session: Session) -> Result<CartShowTemplate> {
    let cart = SessionCart::load(&session).await?;
    Ok(CartShowTemplate {
        cart: CartView::from(cart.cart()),
    })
}

/// Add an item to the cart (HTMX).
///
/// The unit price is resolved here, server-side, from the catalog and the
/// selected variant - and captured onto the line item. Later catalog price
/// changes never touch it. Returns the count badge with an HTMX trigger so
/// other fragments refresh.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let product = state
        .product_by_slug(&form.slug)
        .await?
        .ok_or_else(|| AppError::NotFound(form.slug.clone()))?;

    let size = form
        .size
        .unwrap_or_else(|| product.initial_size().to_owned());
    let frame = form
        .frame
        .unwrap_or_else(|| product.initial_frame().to_owned());
    let finish = form.finish.filter(|f| !f.is_empty());
    let quantity = form.quantity.unwrap_or(1).max(1);

    let unit_price = product.resolve_price(&size, &frame, finish.as_deref());

    let mut cart = SessionCart::load(&session).await?;
    cart.add(
        &session,
        LineItem {
            product_id: product.id,
            name: product.name.clone(),
            unit_price,
            quantity,
            size,
            frame,
            finish,
            image: product.image.clone(),
        },
    )
    .await?;

    tracing::debug!(slug = %form.slug, quantity, "Added to cart");

    let count = cart.cart().total_items();
    Ok((
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartCountTemplate { count },
    )
        .into_response())
}

/// Update a line's quantity (HTMX). A quantity of zero removes the line.
#[instrument(skip(session))]
pub async fn update(session: Session, Form(form): Form<UpdateCartForm>) -> Result<Response> {
    let (key, quantity) = form.into_parts();
    let mut cart = SessionCart::load(&session).await?;
    cart.update_quantity(&session, &key, quantity).await?;

    Ok((
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartItemsTemplate {
            cart: CartView::from(cart.cart()),
        },
    )
        .into_response())
}

/// Remove one exact variant from the cart (HTMX).
#[instrument(skip(session))]
pub async fn remove(session: Session, Form(form): Form<LineKeyForm>) -> Result<Response> {
    let mut cart = SessionCart::load(&session).await?;
    cart.remove(&session, &form.into_key()).await?;

    Ok((
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartItemsTemplate {
            cart: CartView::from(cart.cart()),
        },
    )
        .into_response())
}

/// Remove every variant of a product from the cart (HTMX).
///
/// Used when a shopper drops a product wholesale; lines differing only in
/// size, frame or finish all go together.
#[instrument(skip(session))]
pub async fn remove_product(
    session: Session,
    Form(form): Form<RemoveProductForm>,
) -> Result<Response> {
    let mut cart = SessionCart::load(&session).await?;
    cart.remove_product(&session, ProductId::new(form.product_id))
        .await?;

    Ok((
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartItemsTemplate {
            cart: CartView::from(cart.cart()),
        },
    )
        .into_response())
}

/// Get the cart count badge (HTMX).
#[instrument(skip(session))]
pub async fn count(session: Session) -> Result<CartCountTemplate> {
    let cart = SessionCart::load(&session).await?;
    Ok(CartCountTemplate {
        count: cart.cart().total_items(),
    })
}
