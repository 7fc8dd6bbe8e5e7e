//! Derivative production for uploads the gate let through.

use crate::error::MigrationError;
use crate::gate::ProceedJob;
use bytes::Bytes;
use chrono::Utc;
use migrator_core::RecordUpdate;
use migrator_db::MigrationRecordStore;
use migrator_processing::{
    ImageCodec, ProcessingError, RecipeTable, VariantRecipe, OUTPUT_CONTENT_TYPE,
};
use migrator_storage::{keys, ObjectStorage};
use std::sync::Arc;
use std::time::Instant;

/// Keys written by one successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformReport {
    pub normalized_path: String,
    pub variant_path: String,
}

pub struct TransformPipeline {
    storage: Arc<dyn ObjectStorage>,
    records: Arc<dyn MigrationRecordStore>,
    codec: Arc<dyn ImageCodec>,
    recipes: Arc<RecipeTable>,
    temp_convert_dir: String,
}

impl TransformPipeline {
    pub fn new(
        storage: Arc<dyn ObjectStorage>,
        records: Arc<dyn MigrationRecordStore>,
        codec: Arc<dyn ImageCodec>,
        recipes: Arc<RecipeTable>,
        temp_convert_dir: impl Into<String>,
    ) -> Self {
        Self {
            storage,
            records,
            codec,
            recipes,
            temp_convert_dir: temp_convert_dir.into(),
        }
    }

    /// Normalize the upload, render its photo type's variant, delete the upload.
    ///
    /// Every object written carries the job's identifying metadata plus
    /// `processed=true`, so its own finalize event comes back as a Redirect or
    /// a Skip and never as another Proceed.
    #[tracing::instrument(
        skip(self, job),
        fields(record_id = %job.identity.id, bucket = %job.bucket, key = %job.key)
    )]
    pub async fn run(&self, job: &ProceedJob) -> Result<TransformReport, MigrationError> {
        let start = Instant::now();
        let recipe = self
            .recipes
            .recipe_for(job.identity.photo_type)
            .cloned()
            .ok_or(MigrationError::NoRecipe(job.identity.photo_type))?;
        let file_name = job.file_name().to_string();
        let metadata = job.identity.derivative();
        let user_file = format!("{}/{}", job.identity.owning_user, file_name);

        let original = self
            .storage
            .read(&job.bucket, &job.key)
            .await
            .map_err(MigrationError::Storage)?;

        let codec = self.codec.clone();
        let normalized = blocking(move || codec.normalize(&original)).await?;
        let normalized_path = keys::join(&self.temp_convert_dir, &user_file);
        self.storage
            .write_with_metadata(
                &job.bucket,
                &normalized_path,
                normalized.clone(),
                OUTPUT_CONTENT_TYPE,
                &metadata,
            )
            .await
            .map_err(MigrationError::Storage)?;

        let variant_path = keys::join(&recipe.directory, &user_file);
        let kind = recipe.kind;
        let rendered = self.render(normalized, recipe).await?;
        self.storage
            .write_with_metadata(
                &job.bucket,
                &variant_path,
                rendered,
                OUTPUT_CONTENT_TYPE,
                &metadata,
            )
            .await
            .map_err(MigrationError::Storage)?;

        self.storage
            .delete_if_exists(&job.bucket, &job.key)
            .await
            .map_err(MigrationError::Storage)?;

        tracing::info!(
            variant = ?kind,
            variant_path = %variant_path,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Derivative produced"
        );

        Ok(TransformReport {
            normalized_path,
            variant_path,
        })
    }

    async fn render(&self, normalized: Bytes, recipe: VariantRecipe) -> Result<Bytes, MigrationError> {
        let codec = self.codec.clone();
        blocking(move || codec.render(&normalized, &recipe)).await
    }

    /// Persist a transform failure on the job's record. Best effort: a failed
    /// write is logged and dropped.
    pub async fn record_failure(&self, job: &ProceedJob, error: &MigrationError) {
        let update = RecordUpdate::transform_failed(error.to_string(), Utc::now());
        if let Err(err) = self.records.update(&job.identity.id, &update).await {
            MigrationError::from(err).log("Failed to record transform error");
        }
    }
}

/// Run CPU-bound codec work on the blocking pool.
async fn blocking<F>(work: F) -> Result<Bytes, MigrationError>
where
    F: FnOnce() -> Result<Bytes, ProcessingError> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| MigrationError::Task(e.to_string()))?
        .map_err(MigrationError::from)
}
