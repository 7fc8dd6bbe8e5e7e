//! Application state shared by every handler.

use migrator_pipeline::MigrationService;
use migrator_storage::ObjectStorage;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<MigrationService>,
    pub storage: Arc<dyn ObjectStorage>,
    /// Present when records live in PostgreSQL.
    pub db_pool: Option<PgPool>,
}

impl AppState {
    pub fn new(
        service: Arc<MigrationService>,
        storage: Arc<dyn ObjectStorage>,
        db_pool: Option<PgPool>,
    ) -> Self {
        Self {
            service,
            storage,
            db_pool,
        }
    }
}
