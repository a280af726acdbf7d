//! Product route handlers.
//!
//! The product page renders the variant pickers (size, frame, finish) and an
//! HTMX-refreshed price fragment: every toggle re-resolves the price from
//! the base price plus the selected deltas, without a full page load.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;

use dar_decor_core::catalog::Product;
use dar_decor_core::types::money::format_da;

use crate::db::ProductRepository;
use crate::error::{AppError, Result};
use crate::filters;
use crate::state::AppState;

/// Product card data for listing pages.
#[derive(Clone)]
pub struct ProductCardView {
    pub slug: String,
    pub name: String,
    pub price: String,
    pub image: String,
}

impl From<&Product> for ProductCardView {
    fn from(product: &Product) -> Self {
        Self {
            slug: product.slug.clone(),
            name: product.name.clone(),
            price: format_da(product.price),
            image: product.image.clone(),
        }
    }
}

/// Variant choice display data (one radio option).
#[derive(Clone)]
pub struct ChoiceView {
    pub label: String,
    /// Extra cost of this choice, empty when free.
    pub delta: String,
    pub selected: bool,
}

/// Frame display data, with its finishes.
#[derive(Clone)]
pub struct FrameChoiceView {
    pub label: String,
    pub delta: String,
    pub selected: bool,
    pub finishes: Vec<ChoiceView>,
}

/// Product detail display data.
#[derive(Clone)]
pub struct ProductView {
    pub slug: String,
    pub name: String,
    pub description: String,
    pub price: String,
    pub image: String,
    pub in_stock: bool,
    pub sizes: Vec<ChoiceView>,
    pub frames: Vec<FrameChoiceView>,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        let initial_size = product.initial_size().to_owned();
        let initial_frame = product.initial_frame().to_owned();

        Self {
            slug: product.slug.clone(),
            name: product.name.clone(),
            description: product.description.clone(),
            price: format_da(product.resolve_price(&initial_size, &initial_frame, None)),
            image: product.image.clone(),
            in_stock: product.stock > 0,
            sizes: product
                .sizes
                .iter()
                .map(|s| ChoiceView {
                    label: s.label.clone(),
                    delta: delta_label(s.price_delta),
                    selected: s.label == initial_size,
                })
                .collect(),
            frames: product
                .frames
                .iter()
                .map(|f| FrameChoiceView {
                    label: f.label.clone(),
                    delta: delta_label(f.price_delta),
                    selected: f.label == initial_frame,
                    finishes: f
                        .finishes
                        .iter()
                        .enumerate()
                        .map(|(i, o)| ChoiceView {
                            label: o.label.clone(),
                            delta: delta_label(o.price_delta),
                            selected: i == 0,
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

/// "+500 DA" for a positive delta, empty for zero.
fn delta_label(delta: rust_decimal::Decimal) -> String {
    if delta.is_zero() {
        String::new()
    } else {
        format!("+{}", format_da(delta))
    }
}

/// Selected variant, as sent by the price fragment and the add form.
#[derive(Debug, Deserialize)]
pub struct VariantQuery {
    pub size: Option<String>,
    pub frame: Option<String>,
    pub finish: Option<String>,
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub products: Vec<ProductCardView>,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub product: ProductView,
}

/// Resolved price fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/price.html")]
pub struct PriceTemplate {
    pub price: String,
}

/// Display the product listing page.
pub async fn index(State(state): State<AppState>) -> Result<ProductsIndexTemplate> {
    let products = ProductRepository::new(state.pool()).list().await?;
    Ok(ProductsIndexTemplate {
        products: products.iter().map(ProductCardView::from).collect(),
    })
}

/// Display a product detail page.
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<ProductShowTemplate> {
    let product = state
        .product_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(slug.clone()))?;

    Ok(ProductShowTemplate {
        product: ProductView::from(product.as_ref()),
    })
}

/// Resolve the price for a variant selection (HTMX fragment).
///
/// Called on every radio toggle on the product page. Unknown labels fall
/// back to a zero delta, so a stale page never breaks the fragment.
pub async fn price(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(variant): Query<VariantQuery>,
) -> Result<impl IntoResponse> {
    let product = state
        .product_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(slug.clone()))?;

    let size = variant
        .size
        .unwrap_or_else(|| product.initial_size().to_owned());
    let frame = variant
        .frame
        .unwrap_or_else(|| product.initial_frame().to_owned());
    let finish = variant.finish.filter(|f| !f.is_empty());

    let price = product.resolve_price(&size, &frame, finish.as_deref());
    Ok(PriceTemplate {
        price: format_da(price),
    })
}
