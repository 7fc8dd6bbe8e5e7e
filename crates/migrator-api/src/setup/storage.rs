//! Storage setup and initialization

use migrator_core::Config;
use migrator_storage::{LazyStorage, ObjectStorage};
use std::sync::Arc;

/// Shared storage handle. The underlying client is constructed by the first
/// request that touches a bucket, not at startup.
pub fn setup_storage(config: &Config) -> Arc<dyn ObjectStorage> {
    tracing::info!(
        backend = %config.storage_backend(),
        buckets = ?config.buckets(),
        "Storage handle registered; client is built on first use"
    );
    Arc::new(LazyStorage::new(config.clone()))
}
