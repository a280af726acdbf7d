//! Seed the catalog with sample products.
//!
//! Inserts a handful of décor prints with realistic size/frame/finish
//! dimensions. Idempotent: products whose slug already exists are skipped,
//! so re-running after a partial seed is safe.

use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::info;

/// One seed product definition.
struct SeedProduct {
    slug: &'static str,
    name: &'static str,
    description: &'static str,
    price: i64,
    image: &'static str,
    stock: i32,
    sizes: &'static [(&'static str, i64)],
    frames: &'static [(&'static str, i64, &'static [(&'static str, i64)])],
}

const WOOD_FINISHES: &[(&str, i64)] = &[("Natural oak", 0), ("Walnut", 200), ("Matte black", 150)];
const ALU_FINISHES: &[(&str, i64)] = &[("Silver", 0), ("Gold", 300)];

const CATALOG: &[SeedProduct] = &[
    SeedProduct {
        slug: "sahara-dunes",
        name: "Sahara Dunes",
        description: "Panoramic canvas print of the Grand Erg Oriental at dusk.",
        price: 3000,
        image: "/static/products/sahara-dunes.jpg",
        stock: 14,
        sizes: &[("30x40", 0), ("50x70", 900), ("60x90", 1500)],
        frames: &[
            ("NONE", 0, &[]),
            ("Wood", 800, WOOD_FINISHES),
            ("Aluminium", 1100, ALU_FINISHES),
        ],
    },
    SeedProduct {
        slug: "casbah-doors",
        name: "Casbah Doors",
        description: "Triptych of painted doors from the Casbah of Algiers.",
        price: 4500,
        image: "/static/products/casbah-doors.jpg",
        stock: 8,
        sizes: &[("40x60", 0), ("60x90", 1200)],
        frames: &[("NONE", 0, &[]), ("Wood", 800, WOOD_FINISHES)],
    },
    SeedProduct {
        slug: "olive-branch",
        name: "Olive Branch",
        description: "Minimal line drawing on textured paper. One size.",
        price: 1800,
        image: "/static/products/olive-branch.jpg",
        stock: 30,
        sizes: &[],
        frames: &[("NONE", 0, &[]), ("Aluminium", 1100, ALU_FINISHES)],
    },
    SeedProduct {
        slug: "tassili-night",
        name: "Tassili Night",
        description: "Star trails over the Tassili n'Ajjer plateau.",
        price: 3600,
        image: "/static/products/tassili-night.jpg",
        stock: 0,
        sizes: &[("30x40", 0), ("50x70", 900)],
        frames: &[],
    },
];

/// Errors that can occur while seeding.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Insert the sample catalog.
///
/// # Errors
///
/// Returns `SeedError` if the connection or an insert fails.
pub async fn catalog() -> Result<(), SeedError> {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").map_err(|_| SeedError::MissingEnvVar("DATABASE_URL"))?;
    let pool = PgPool::connect(&database_url).await?;

    let mut inserted = 0u32;
    for product in CATALOG {
        if insert_product(&pool, product).await? {
            inserted += 1;
            info!(slug = product.slug, "Seeded product");
        } else {
            info!(slug = product.slug, "Already present, skipped");
        }
    }

    info!(inserted, total = CATALOG.len(), "Catalog seed complete");
    Ok(())
}

/// Insert one product with its dimensions. Returns false when the slug exists.
async fn insert_product(pool: &PgPool, product: &SeedProduct) -> Result<bool, SeedError> {
    let mut tx = pool.begin().await?;

    let row: Option<(i32,)> = sqlx::query_as(
        r"
        INSERT INTO products (slug, name, description, price, image, stock)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (slug) DO NOTHING
        RETURNING id
        ",
    )
    .bind(product.slug)
    .bind(product.name)
    .bind(product.description)
    .bind(Decimal::from(product.price))
    .bind(product.image)
    .bind(product.stock)
    .fetch_optional(&mut *tx)
    .await?;

    let Some((product_id,)) = row else {
        return Ok(false);
    };

    for (position, (label, delta)) in product.sizes.iter().enumerate() {
        sqlx::query(
            r"
            INSERT INTO product_sizes (product_id, label, price_delta, position)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(product_id)
        .bind(label)
        .bind(Decimal::from(*delta))
        .bind(i64::try_from(position).unwrap_or(0))
        .execute(&mut *tx)
        .await?;
    }

    for (position, (label, delta, finishes)) in product.frames.iter().enumerate() {
        let (frame_id,): (i32,) = sqlx::query_as(
            r"
            INSERT INTO product_frames (product_id, label, price_delta, position)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            ",
        )
        .bind(product_id)
        .bind(label)
        .bind(Decimal::from(*delta))
        .bind(i64::try_from(position).unwrap_or(0))
        .fetch_one(&mut *tx)
        .await?;

        for (finish_position, (finish_label, finish_delta)) in finishes.iter().enumerate() {
            sqlx::query(
                r"
                INSERT INTO product_finishes (frame_id, label, price_delta, position)
                VALUES ($1, $2, $3, $4)
                ",
            )
            .bind(frame_id)
            .bind(finish_label)
            .bind(Decimal::from(*finish_delta))
            .bind(i64::try_from(finish_position).unwrap_or(0))
            .execute(&mut *tx)
            .await?;
        }
    }

    tx.commit().await?;
    Ok(true)
}
