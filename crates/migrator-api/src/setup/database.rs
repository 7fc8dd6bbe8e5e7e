//! Database setup and initialization

use anyhow::{Context, Result};
use migrator_core::{Config, RecordStoreBackend};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::path::Path;
use std::time::Duration;

/// Setup database connection pool and run migrations.
///
/// Returns `None` when the record store is not PostgreSQL.
pub async fn setup_database(config: &Config) -> Result<Option<PgPool>> {
    if config.record_store_backend() != RecordStoreBackend::Postgres {
        tracing::info!(backend = %config.record_store_backend(), "Skipping database setup");
        return Ok(None);
    }

    let url = config
        .database_url()
        .context("DATABASE_URL must be set when using the postgres record store")?;

    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections())
        .acquire_timeout(Duration::from_secs(config.db_timeout_seconds()))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .connect(url)
        .await
        .context("Failed to connect to database")?;

    tracing::info!(
        max_connections = config.db_max_connections(),
        "Database connected successfully"
    );

    // Run pending migrations on startup (path: workspace migrations/ from crate root)
    let migrations_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../migrations");
    let migrator = sqlx::migrate::Migrator::new(migrations_dir)
        .await
        .context("Failed to load migrations")?;
    migrator
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations applied");

    Ok(Some(pool))
}
