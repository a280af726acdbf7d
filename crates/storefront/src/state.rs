//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;

use dar_decor_core::catalog::Product;

use crate::config::StorefrontConfig;
use crate::db::{ProductRepository, RepositoryError};

/// How long a product page may serve a cached catalog read.
const PRODUCT_CACHE_TTL: Duration = Duration::from_secs(60);

/// Upper bound on cached products.
const PRODUCT_CACHE_CAPACITY: u64 = 1_024;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    product_cache: Cache<String, Arc<Product>>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `pool` - `PostgreSQL` connection pool
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Self {
        let product_cache = Cache::builder()
            .max_capacity(PRODUCT_CACHE_CAPACITY)
            .time_to_live(PRODUCT_CACHE_TTL)
            .build();

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                product_cache,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a product by slug, through the short-lived catalog cache.
    ///
    /// Product pages and the cart add path both come through here; a cached
    /// read only affects which price a *new* add captures, never a price
    /// already stored in someone's cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the underlying lookup fails.
    pub async fn product_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<Arc<Product>>, RepositoryError> {
        if let Some(product) = self.inner.product_cache.get(slug).await {
            return Ok(Some(product));
        }

        let repo = ProductRepository::new(self.pool());
        match repo.get_by_slug(slug).await? {
            Some(product) => {
                let product = Arc::new(product);
                self.inner
                    .product_cache
                    .insert(slug.to_owned(), Arc::clone(&product))
                    .await;
                Ok(Some(product))
            }
            None => Ok(None),
        }
    }
}
