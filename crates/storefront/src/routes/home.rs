//! Home page handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;

use crate::db::ProductRepository;
use crate::error::Result;
use crate::filters;
use crate::routes::products::ProductCardView;
use crate::state::AppState;

/// Number of products featured on the home page.
const FEATURED_COUNT: usize = 4;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub featured: Vec<ProductCardView>,
}

/// Display the home page with a few featured products.
pub async fn home(State(state): State<AppState>) -> Result<HomeTemplate> {
    let products = ProductRepository::new(state.pool()).list().await?;
    let featured = products
        .iter()
        .take(FEATURED_COUNT)
        .map(ProductCardView::from)
        .collect();

    Ok(HomeTemplate { featured })
}
