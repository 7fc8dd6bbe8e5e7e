//! Record-triggered cross-bucket copy.
//!
//! One eligible record change yields at most one copy and one record update,
//! either the Copied branch or the CopyError branch. A record already stored
//! as Copied is never moved back to CopyError.

use crate::error::MigrationError;
use crate::events::RecordChangeEvent;
use chrono::Utc;
use migrator_core::{IdentifyingMetadata, MigrationRecord, MigrationStatus, RecordUpdate};
use migrator_db::MigrationRecordStore;
use migrator_storage::{ObjectStorage, Precondition, StorageError};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::sync::Arc;
use std::time::Instant;

/// Why a record change did not enter the copy protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    Deleted,
    NotReady,
    AlreadyCopied,
    /// Only fields the copy does not read changed, e.g. our own status write.
    NoInputChange,
}

impl Display for IgnoreReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let reason = match self {
            IgnoreReason::Deleted => "record deleted",
            IgnoreReason::NotReady => "record not ready to migrate",
            IgnoreReason::AlreadyCopied => "record already copied",
            IgnoreReason::NoInputChange => "no migration input changed",
        };
        write!(f, "{}", reason)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyOutcome {
    Ignored(IgnoreReason),
    Copied { destination_path: String },
    /// The destination already held this record's object.
    AlreadyMigrated { destination_path: String },
    Failed { error: String, error_code: &'static str },
}

/// Result of one record-change invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyReport {
    pub record_id: String,
    pub outcome: CopyOutcome,
    /// Set when the status update itself failed.
    pub record_update_error: Option<String>,
}

/// Decide whether a record change should be copied, returning the record to copy.
pub fn check_eligibility(event: &RecordChangeEvent) -> Result<MigrationRecord, IgnoreReason> {
    let after = event.current().ok_or(IgnoreReason::Deleted)?;
    if !after.ready_to_migrate {
        return Err(IgnoreReason::NotReady);
    }
    if after.status == MigrationStatus::Copied {
        return Err(IgnoreReason::AlreadyCopied);
    }

    match &event.before {
        None => Ok(after),
        Some(before)
            if before.status != MigrationStatus::Pending
                && after.status == MigrationStatus::Pending =>
        {
            Ok(after)
        }
        Some(before) if after.copy_inputs_differ(before) => Ok(after),
        Some(_) => Err(IgnoreReason::NoInputChange),
    }
}

pub struct CopyOrchestrator {
    storage: Arc<dyn ObjectStorage>,
    records: Arc<dyn MigrationRecordStore>,
    source_bucket: String,
    destination_bucket: String,
    destination_dir: String,
}

impl CopyOrchestrator {
    pub fn new(
        storage: Arc<dyn ObjectStorage>,
        records: Arc<dyn MigrationRecordStore>,
        source_bucket: impl Into<String>,
        destination_bucket: impl Into<String>,
        destination_dir: impl Into<String>,
    ) -> Self {
        Self {
            storage,
            records,
            source_bucket: source_bucket.into(),
            destination_bucket: destination_bucket.into(),
            destination_dir: destination_dir.into(),
        }
    }

    /// Run the copy protocol for one record change.
    ///
    /// Copy failures are recorded on the record and reported, never returned.
    #[tracing::instrument(skip(self, event), fields(record_id = %event.record_id))]
    pub async fn handle(&self, event: &RecordChangeEvent) -> CopyReport {
        let record = match check_eligibility(event) {
            Ok(record) => record,
            Err(reason) => {
                tracing::debug!(reason = %reason, "Record change ignored");
                return CopyReport {
                    record_id: event.record_id.clone(),
                    outcome: CopyOutcome::Ignored(reason),
                    record_update_error: None,
                };
            }
        };

        let start = Instant::now();
        let (outcome, update) = match self.copy_record(&record).await {
            Ok((destination_path, already_present)) => {
                tracing::info!(
                    destination_path = %destination_path,
                    already_present,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Record image copied"
                );
                let update = RecordUpdate::copied(destination_path.clone(), Utc::now());
                let outcome = if already_present {
                    CopyOutcome::AlreadyMigrated { destination_path }
                } else {
                    CopyOutcome::Copied { destination_path }
                };
                (outcome, Some(update))
            }
            Err(err) => {
                err.log("Record image copy failed");
                match self.stored_destination(&record.id).await {
                    // A concurrent or earlier delivery already copied it
                    Some(destination_path) => {
                        tracing::warn!(
                            destination_path = %destination_path,
                            error_code = err.error_code(),
                            "Record already copied; keeping status Copied"
                        );
                        (CopyOutcome::AlreadyMigrated { destination_path }, None)
                    }
                    None => (
                        CopyOutcome::Failed {
                            error: err.to_string(),
                            error_code: err.error_code(),
                        },
                        Some(RecordUpdate::copy_failed(err.to_string(), Utc::now())),
                    ),
                }
            }
        };

        let record_update_error = match update {
            Some(update) => match self.records.update(&record.id, &update).await {
                Ok(()) => None,
                Err(err) => {
                    MigrationError::from(err).log("Failed to record copy outcome");
                    Some(update_error_text(&update))
                }
            },
            None => None,
        };

        CopyReport {
            record_id: record.id,
            outcome,
            record_update_error,
        }
    }

    /// Destination of the stored record when it is already Copied.
    ///
    /// A failed read counts as not copied, so the failure is still recorded.
    async fn stored_destination(&self, record_id: &str) -> Option<String> {
        match self.records.read(record_id).await {
            Ok(Some(stored)) if stored.status == MigrationStatus::Copied => stored.destination_path,
            Ok(_) => None,
            Err(err) => {
                MigrationError::from(err).log("Failed to read record before recording copy error");
                None
            }
        }
    }

    /// Stamp identifying metadata on the source and copy it to its destination.
    ///
    /// Returns the destination path and whether it already held this record's object.
    async fn copy_record(&self, record: &MigrationRecord) -> Result<(String, bool), MigrationError> {
        let destination_path = record.destination_path_in(&self.destination_dir);
        let identifying = IdentifyingMetadata::from_record(record).to_metadata();

        let source = self
            .storage
            .get_metadata(&self.source_bucket, &record.source_path)
            .await
            .map_err(MigrationError::Copy)?;
        if source.metadata.contains_all(&identifying) {
            tracing::debug!(key = %record.source_path, "Source already carries identifying metadata");
        } else {
            self.storage
                .set_metadata(
                    &self.source_bucket,
                    &record.source_path,
                    &identifying,
                    Precondition::GenerationMatch(source.generation),
                )
                .await
                .map_err(MigrationError::Copy)?;
        }

        let copied = self
            .storage
            .copy(
                &self.source_bucket,
                &record.source_path,
                &self.destination_bucket,
                &destination_path,
                Precondition::DoesNotExist,
            )
            .await;

        match copied {
            Ok(()) => Ok((destination_path, false)),
            Err(StorageError::AlreadyExists(_)) => {
                let existing = self
                    .storage
                    .get_metadata(&self.destination_bucket, &destination_path)
                    .await
                    .map_err(MigrationError::Copy)?;
                if existing.metadata.id() == Some(record.id.as_str()) {
                    tracing::warn!(
                        destination_path = %destination_path,
                        "Destination already holds this record's image; treating as migrated"
                    );
                    Ok((destination_path, true))
                } else {
                    Err(MigrationError::DestinationConflict(destination_path))
                }
            }
            Err(err) => Err(MigrationError::Copy(err)),
        }
    }
}

fn update_error_text(update: &RecordUpdate) -> String {
    match update.status {
        Some(status) => format!("failed to set status {}", status),
        None => "failed to update record".to_string(),
    }
}
