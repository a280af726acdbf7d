//! Dashboard: order counts per lifecycle status.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tracing::instrument;

use dar_decor_core::OrderStatus;

use crate::db::OrderRepository;
use crate::error::Result;
use crate::filters;
use crate::state::AppState;

/// One dashboard tile.
#[derive(Clone)]
pub struct StatusCountView {
    pub status: &'static str,
    pub status_class: String,
    pub count: i64,
}

/// Dashboard page template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub counts: Vec<StatusCountView>,
    pub total: i64,
}

/// Display the dashboard.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>) -> Result<DashboardTemplate> {
    let by_status = OrderRepository::new(state.pool()).count_by_status().await?;

    // Render every lifecycle status, zero-filled, in lifecycle order.
    let counts: Vec<StatusCountView> = OrderStatus::ALL
        .iter()
        .map(|status| {
            let count = by_status
                .iter()
                .find(|(s, _)| s == status)
                .map_or(0, |(_, c)| *c);
            StatusCountView {
                status: status.label(),
                status_class: status.to_string(),
                count,
            }
        })
        .collect();
    let total = counts.iter().map(|c| c.count).sum();

    Ok(DashboardTemplate { counts, total })
}
