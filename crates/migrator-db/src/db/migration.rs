//! PostgreSQL repository for the image_migrations table.

use super::MigrationRecordStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use migrator_core::{AppError, MigrationRecord, MigrationStatus, PhotoType, RecordUpdate};
use sqlx::{PgPool, Postgres, QueryBuilder};

const RECORD_COLUMNS: &str = "id, cid, photo_type, source_path, destination_path, owning_user, \
     original_file_name, converted_file_name, compressed_file_name, ready_to_migrate, migrated, \
     status, error, transform_error, created_at, updated_at";

/// Row type for image_migrations table (for FromRow).
#[derive(Debug, sqlx::FromRow)]
pub struct MigrationRecordRow {
    pub id: String,
    pub cid: String,
    pub photo_type: String,
    pub source_path: String,
    pub destination_path: Option<String>,
    pub owning_user: String,
    pub original_file_name: Option<String>,
    pub converted_file_name: Option<String>,
    pub compressed_file_name: Option<String>,
    pub ready_to_migrate: bool,
    pub migrated: bool,
    pub status: String,
    pub error: Option<String>,
    pub transform_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MigrationRecordRow {
    pub fn into_record(self) -> Result<MigrationRecord, AppError> {
        let photo_type = self
            .photo_type
            .parse::<PhotoType>()
            .map_err(|e| AppError::InvalidData(format!("record {}: {}", self.id, e)))?;
        let status = self
            .status
            .parse::<MigrationStatus>()
            .map_err(|e| AppError::InvalidData(format!("record {}: {}", self.id, e)))?;

        Ok(MigrationRecord {
            id: self.id,
            cid: self.cid,
            photo_type,
            source_path: self.source_path,
            destination_path: self.destination_path,
            owning_user: self.owning_user,
            original_file_name: self.original_file_name,
            converted_file_name: self.converted_file_name,
            compressed_file_name: self.compressed_file_name,
            ready_to_migrate: self.ready_to_migrate,
            migrated: self.migrated,
            status,
            error: self.error,
            transform_error: self.transform_error,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Repository for migration records.
#[derive(Clone)]
pub struct PgMigrationRecordStore {
    pool: PgPool,
}

impl PgMigrationRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a record. Used when seeding; the pipeline itself never creates records.
    #[tracing::instrument(skip(self, record), fields(db.table = "image_migrations", db.operation = "insert", db.record_id = %record.id))]
    pub async fn insert(&self, record: &MigrationRecord) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO image_migrations (
                id, cid, photo_type, source_path, destination_path, owning_user,
                original_file_name, converted_file_name, compressed_file_name,
                ready_to_migrate, migrated, status, error, transform_error,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            "#,
        )
        .bind(&record.id)
        .bind(&record.cid)
        .bind(record.photo_type.as_str())
        .bind(&record.source_path)
        .bind(&record.destination_path)
        .bind(&record.owning_user)
        .bind(&record.original_file_name)
        .bind(&record.converted_file_name)
        .bind(&record.compressed_file_name)
        .bind(record.ready_to_migrate)
        .bind(record.migrated)
        .bind(record.status.as_str())
        .bind(&record.error)
        .bind(&record.transform_error)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

/// Append `SET` assignments for every field the update touches.
/// Returns the number of assignments pushed.
fn push_assignments(qb: &mut QueryBuilder<'_, Postgres>, update: &RecordUpdate) -> usize {
    let mut count = 0;
    let mut set = qb.separated(", ");

    if let Some(status) = update.status {
        set.push("status = ").push_bind_unseparated(status.as_str());
        count += 1;
    }
    if let Some(ref destination_path) = update.destination_path {
        set.push("destination_path = ")
            .push_bind_unseparated(destination_path.clone());
        count += 1;
    }
    if let Some(ref error) = update.error {
        set.push("error = ").push_bind_unseparated(error.clone());
        count += 1;
    }
    if let Some(ref transform_error) = update.transform_error {
        set.push("transform_error = ")
            .push_bind_unseparated(transform_error.clone());
        count += 1;
    }
    if let Some(ref name) = update.converted_file_name {
        set.push("converted_file_name = ")
            .push_bind_unseparated(name.clone());
        count += 1;
    }
    if let Some(ref name) = update.compressed_file_name {
        set.push("compressed_file_name = ")
            .push_bind_unseparated(name.clone());
        count += 1;
    }
    if let Some(migrated) = update.migrated {
        set.push("migrated = ").push_bind_unseparated(migrated);
        count += 1;
    }
    if let Some(updated_at) = update.updated_at {
        set.push("updated_at = ").push_bind_unseparated(updated_at);
        count += 1;
    }

    count
}

#[async_trait]
impl MigrationRecordStore for PgMigrationRecordStore {
    #[tracing::instrument(skip(self), fields(db.table = "image_migrations", db.operation = "select", db.record_id = %id))]
    async fn read(&self, id: &str) -> Result<Option<MigrationRecord>, AppError> {
        let row = sqlx::query_as::<Postgres, MigrationRecordRow>(&format!(
            "SELECT {} FROM image_migrations WHERE id = $1",
            RECORD_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(MigrationRecordRow::into_record).transpose()
    }

    #[tracing::instrument(skip(self, update), fields(db.table = "image_migrations", db.operation = "update", db.record_id = %id))]
    async fn update(&self, id: &str, update: &RecordUpdate) -> Result<(), AppError> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE image_migrations SET ");
        if push_assignments(&mut qb, update) == 0 {
            let exists = sqlx::query_scalar::<Postgres, bool>(
                "SELECT EXISTS(SELECT 1 FROM image_migrations WHERE id = $1)",
            )
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
            return if exists {
                Ok(())
            } else {
                Err(AppError::NotFound(id.to_string()))
            };
        }
        qb.push(" WHERE id = ").push_bind(id.to_string());

        let result = qb.build().execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(id.to_string()));
        }
        Ok(())
    }
}
