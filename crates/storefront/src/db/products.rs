//! Product repository: the catalog read boundary.
//!
//! The storefront never writes to these tables; products are managed out of
//! band (seed data today). Variant dimension rows are kept in declared order
//! via a `position` column.

use rust_decimal::Decimal;
use sqlx::PgPool;

use dar_decor_core::ProductId;
use dar_decor_core::catalog::{FrameFinish, FrameOption, Product, SizeOption};

use super::RepositoryError;

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    slug: String,
    name: String,
    description: String,
    price: Decimal,
    image: String,
    stock: i32,
}

#[derive(sqlx::FromRow)]
struct SizeRow {
    label: String,
    price_delta: Decimal,
}

#[derive(sqlx::FromRow)]
struct FrameRow {
    id: i32,
    label: String,
    price_delta: Decimal,
}

#[derive(sqlx::FromRow)]
struct FinishRow {
    frame_id: i32,
    label: String,
    price_delta: Decimal,
}

/// Repository for catalog reads.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a product by its URL slug, with all variant dimensions.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, slug, name, description, price, image, stock
            FROM products
            WHERE slug = $1
            ",
        )
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(self.load_variants(row).await?)),
            None => Ok(None),
        }
    }

    /// List the whole catalog in display order.
    ///
    /// Variant dimensions are not loaded; listing pages only need the base
    /// price and image.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, slug, name, description, price, image, stock
            FROM products
            ORDER BY name
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(into_product_shell).collect())
    }

    /// Attach sizes, frames and finishes to a product row.
    async fn load_variants(&self, row: ProductRow) -> Result<Product, RepositoryError> {
        let product_id = row.id;

        let sizes = sqlx::query_as::<_, SizeRow>(
            r"
            SELECT label, price_delta
            FROM product_sizes
            WHERE product_id = $1
            ORDER BY position
            ",
        )
        .bind(product_id)
        .fetch_all(self.pool)
        .await?;

        let frames = sqlx::query_as::<_, FrameRow>(
            r"
            SELECT id, label, price_delta
            FROM product_frames
            WHERE product_id = $1
            ORDER BY position
            ",
        )
        .bind(product_id)
        .fetch_all(self.pool)
        .await?;

        let finishes = sqlx::query_as::<_, FinishRow>(
            r"
            SELECT f.frame_id, f.label, f.price_delta
            FROM product_finishes f
            JOIN product_frames pf ON pf.id = f.frame_id
            WHERE pf.product_id = $1
            ORDER BY f.frame_id, f.position
            ",
        )
        .bind(product_id)
        .fetch_all(self.pool)
        .await?;

        let mut product = into_product_shell(row);
        product.sizes = sizes
            .into_iter()
            .map(|s| SizeOption {
                label: s.label,
                price_delta: s.price_delta,
            })
            .collect();
        product.frames = frames
            .into_iter()
            .map(|f| FrameOption {
                label: f.label,
                price_delta: f.price_delta,
                finishes: finishes
                    .iter()
                    .filter(|o| o.frame_id == f.id)
                    .map(|o| FrameFinish {
                        label: o.label.clone(),
                        price_delta: o.price_delta,
                    })
                    .collect(),
            })
            .collect();

        Ok(product)
    }
}

/// Convert a bare product row into a [`Product`] with empty dimensions.
fn into_product_shell(row: ProductRow) -> Product {
    Product {
        id: row.id,
        slug: row.slug,
        name: row.name,
        description: row.description,
        price: row.price,
        image: row.image,
        stock: row.stock,
        sizes: Vec::new(),
        frames: Vec::new(),
    }
}
