//! Migration record repositories
//!
//! `MigrationRecordStore` is the seam the pipeline talks to. Records are
//! created by the upstream system, so the trait only reads and applies
//! field-level partial updates.

pub mod memory;
pub mod migration;

pub use memory::InMemoryRecordStore;
pub use migration::PgMigrationRecordStore;

use async_trait::async_trait;
use migrator_core::{AppError, Config, MigrationRecord, RecordStoreBackend, RecordUpdate};
use sqlx::PgPool;
use std::sync::Arc;

#[async_trait]
pub trait MigrationRecordStore: Send + Sync {
    /// Fetch a record, `None` when it does not exist.
    async fn read(&self, id: &str) -> Result<Option<MigrationRecord>, AppError>;

    /// Merge `update` into the stored record. No transaction spans calls.
    ///
    /// Fails with `AppError::NotFound` when the record does not exist.
    async fn update(&self, id: &str, update: &RecordUpdate) -> Result<(), AppError>;
}

/// Build the record store the configuration selects.
pub fn create_record_store(
    config: &Config,
    pool: Option<PgPool>,
) -> Result<Arc<dyn MigrationRecordStore>, AppError> {
    match config.record_store_backend() {
        RecordStoreBackend::Postgres => {
            let pool = pool.ok_or_else(|| {
                AppError::Config("postgres record store requires a database pool".to_string())
            })?;
            tracing::info!("Initializing PostgreSQL migration record store");
            Ok(Arc::new(PgMigrationRecordStore::new(pool)))
        }
        RecordStoreBackend::Memory => {
            tracing::warn!("Using in-memory migration record store; records are not persisted");
            Ok(Arc::new(InMemoryRecordStore::new()))
        }
    }
}
