//! Application setup and initialization

pub mod database;
pub mod routes;
pub mod server;
pub mod storage;

use crate::state::AppState;
use anyhow::{Context, Result};
use migrator_core::Config;
use migrator_db::create_record_store;
use migrator_pipeline::MigrationService;
use migrator_processing::RasterCodec;
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    crate::telemetry::init_telemetry(config.log_format())
        .context("Failed to initialize telemetry")?;

    tracing::info!(
        environment = %config.environment(),
        source_bucket = %config.source_bucket(),
        destination_bucket = %config.destination_bucket(),
        watched_bucket = %config.watched_bucket(),
        "Configuration loaded and validated successfully"
    );

    // Setup database (only for the postgres record store)
    let pool = database::setup_database(&config).await?;

    // Storage client is built on first use
    let storage = storage::setup_storage(&config);

    let records = create_record_store(&config, pool.clone())
        .context("Failed to create migration record store")?;

    let service = Arc::new(MigrationService::new(
        &config,
        storage.clone(),
        records,
        Arc::new(RasterCodec::new()),
    ));

    let state = Arc::new(AppState::new(service, storage, pool));
    let router = routes::setup_routes(state.clone());

    Ok((state, router))
}
