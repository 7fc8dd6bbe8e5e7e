//! Classification of object-finalize events.
//!
//! Order matters: bucket, then metadata validity, then Redirect (processed
//! derivatives), then Proceed (unprocessed uploads). A processed object never
//! reaches the transform pipeline, which is what stops the pipeline from
//! re-triggering itself on its own output.

use crate::error::MigrationError;
use crate::events::ObjectFinalizeEvent;
use chrono::Utc;
use migrator_core::{
    DirectoryLayout, IdentifyingMetadata, MetadataError, RecordPathField, RecordUpdate,
};
use migrator_db::MigrationRecordStore;
use migrator_processing::RecipeTable;
use migrator_storage::keys;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    ForeignBucket(String),
    InvalidMetadata(MetadataError),
    /// Processed object outside every derivative directory, e.g. a temp copy.
    ProcessedElsewhere,
    OutsideUploadDir,
}

/// A derivative landed; its path belongs on the record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub record_id: String,
    pub field: RecordPathField,
    pub path: String,
}

/// An unprocessed upload to transform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProceedJob {
    pub bucket: String,
    pub key: String,
    pub identity: IdentifyingMetadata,
}

impl ProceedJob {
    /// `originalName` metadata, else the object's base name.
    pub fn file_name(&self) -> &str {
        self.identity
            .original_name
            .as_deref()
            .unwrap_or_else(|| keys::base_name(&self.key))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    Skip(SkipReason),
    Redirect(Redirect),
    Proceed(ProceedJob),
}

#[derive(Debug, Clone)]
pub struct IngestGate {
    watched_bucket: String,
    upload_dir: String,
    derivative_dirs: Vec<(String, RecordPathField)>,
}

impl IngestGate {
    pub fn new(watched_bucket: impl Into<String>, layout: &DirectoryLayout, recipes: &RecipeTable) -> Self {
        Self {
            watched_bucket: watched_bucket.into(),
            upload_dir: layout.upload_dir.clone(),
            derivative_dirs: recipes
                .derivative_dirs()
                .into_iter()
                .map(|(dir, field)| (dir.to_string(), field))
                .collect(),
        }
    }

    /// Classify an event without any I/O.
    pub fn classify(&self, event: &ObjectFinalizeEvent) -> GateOutcome {
        if event.bucket != self.watched_bucket {
            return GateOutcome::Skip(SkipReason::ForeignBucket(event.bucket.clone()));
        }

        let identity = match IdentifyingMetadata::from_object(&event.metadata) {
            Ok(identity) => identity,
            Err(err) => return GateOutcome::Skip(SkipReason::InvalidMetadata(err)),
        };

        if event.metadata.is_processed() {
            return match self.derivative_field(&event.name) {
                Some(field) => GateOutcome::Redirect(Redirect {
                    record_id: identity.id,
                    field,
                    path: event.name.clone(),
                }),
                None => GateOutcome::Skip(SkipReason::ProcessedElsewhere),
            };
        }

        if keys::is_under_dir(&event.name, &self.upload_dir) {
            GateOutcome::Proceed(ProceedJob {
                bucket: event.bucket.clone(),
                key: event.name.clone(),
                identity,
            })
        } else {
            GateOutcome::Skip(SkipReason::OutsideUploadDir)
        }
    }

    fn derivative_field(&self, key: &str) -> Option<RecordPathField> {
        self.derivative_dirs
            .iter()
            .find(|(dir, _)| keys::is_under_dir(key, dir))
            .map(|(_, field)| *field)
    }
}

/// Write a landed derivative's path onto its record.
#[tracing::instrument(skip(records, redirect), fields(record_id = %redirect.record_id, field = redirect.field.as_str()))]
pub async fn apply_redirect(
    records: &dyn MigrationRecordStore,
    redirect: &Redirect,
) -> Result<(), MigrationError> {
    let update = RecordUpdate::derivative_ready(redirect.field, redirect.path.clone(), Utc::now());
    records.update(&redirect.record_id, &update).await?;
    tracing::info!(path = %redirect.path, "Derivative path recorded");
    Ok(())
}
