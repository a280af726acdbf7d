//! Application state shared across admin handlers.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;

use dar_decor_core::OrderStatus;

use crate::config::AdminConfig;
use crate::db::{OrderRepository, OrderSummary, RepositoryError};

/// How long a cached order list may be served before refetching.
const ORDER_LIST_TTL: Duration = Duration::from_secs(30);

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Holds the order-list cache: list views are
/// cached per status filter and invalidated wholesale on every lifecycle
/// transition, so a status change is visible in the very next list render.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    pool: PgPool,
    order_lists: Cache<String, Arc<Vec<OrderSummary>>>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: AdminConfig, pool: PgPool) -> Self {
        let order_lists = Cache::builder().time_to_live(ORDER_LIST_TTL).build();

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                order_lists,
            }),
        }
    }

    /// Get a reference to the admin configuration.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Order list for a status filter, through the cache.
    ///
    /// # Errors
    ///
    /// Returns the repository error of the underlying fetch on a cache miss.
    pub async fn order_list(
        &self,
        status: Option<OrderStatus>,
    ) -> Result<Arc<Vec<OrderSummary>>, RepositoryError> {
        let key = status.map_or_else(|| "all".to_string(), |s| s.to_string());

        if let Some(cached) = self.inner.order_lists.get(&key).await {
            return Ok(cached);
        }

        let list = Arc::new(OrderRepository::new(self.pool()).list(status).await?);
        self.inner
            .order_lists
            .insert(key, Arc::clone(&list))
            .await;
        Ok(list)
    }

    /// Drop every cached order list. Called after each status transition.
    pub fn invalidate_order_lists(&self) {
        self.inner.order_lists.invalidate_all();
    }
}
