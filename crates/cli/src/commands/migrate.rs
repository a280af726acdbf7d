//! Database migration commands.
//!
//! Migrations live in `crates/storefront/migrations/` (one set for the whole
//! shop; the admin binary uses the same database) and are embedded into this
//! binary at compile time.
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - `PostgreSQL` connection string

use sqlx::PgPool;
use sqlx::migrate::Migrator;
use tracing::info;

/// Migrations embedded from the storefront crate.
static MIGRATOR: Migrator = sqlx::migrate!("../storefront/migrations");

/// Errors that can occur while migrating.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Connect to the database named by `DATABASE_URL`.
async fn connect() -> Result<PgPool, MigrationError> {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").map_err(|_| MigrationError::MissingEnvVar("DATABASE_URL"))?;

    info!("Connecting to database...");
    Ok(PgPool::connect(&database_url).await?)
}

/// Apply all pending migrations.
///
/// # Errors
///
/// Returns `MigrationError` if the connection or a migration fails.
pub async fn run() -> Result<(), MigrationError> {
    let pool = connect().await?;

    info!("Running migrations...");
    MIGRATOR.run(&pool).await?;

    info!("Migrations complete");
    Ok(())
}

/// Show which migrations have been applied.
///
/// # Errors
///
/// Returns `MigrationError` if the connection or the status query fails.
pub async fn status() -> Result<(), MigrationError> {
    let pool = connect().await?;

    let applied: Vec<(i64,)> =
        sqlx::query_as("SELECT version FROM _sqlx_migrations ORDER BY version")
            .fetch_all(&pool)
            .await
            .unwrap_or_default();
    let applied: std::collections::HashSet<i64> = applied.into_iter().map(|(v,)| v).collect();

    for migration in MIGRATOR.migrations.iter() {
        let state = if applied.contains(&migration.version) {
            "applied"
        } else {
            "pending"
        };
        info!(
            version = migration.version,
            description = %migration.description,
            "{state}"
        );
    }

    Ok(())
}
