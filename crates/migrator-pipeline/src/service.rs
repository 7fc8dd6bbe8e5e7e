//! Invocation entry points.
//!
//! Each delivery runs independently under its own time budget. A timed-out
//! invocation is dropped mid-flight; redelivery resumes idempotently.

use crate::copy::{CopyOrchestrator, CopyReport};
use crate::error::MigrationError;
use crate::events::{ObjectFinalizeEvent, RecordChangeEvent};
use crate::gate::{apply_redirect, GateOutcome, IngestGate, Redirect, SkipReason};
use crate::transform::{TransformPipeline, TransformReport};
use migrator_core::Config;
use migrator_db::MigrationRecordStore;
use migrator_processing::{ImageCodec, RecipeTable};
use migrator_storage::ObjectStorage;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// What an object-finalize invocation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinalizeReport {
    Skipped(SkipReason),
    Redirected(Redirect),
    RedirectFailed { redirect: Redirect, error: String },
    Transformed(TransformReport),
    TransformFailed { record_id: String, error: String },
}

pub struct MigrationService {
    copy: CopyOrchestrator,
    gate: IngestGate,
    transform: TransformPipeline,
    records: Arc<dyn MigrationRecordStore>,
    copy_timeout: Duration,
    transform_timeout: Duration,
}

impl MigrationService {
    pub fn new(
        config: &Config,
        storage: Arc<dyn ObjectStorage>,
        records: Arc<dyn MigrationRecordStore>,
        codec: Arc<dyn ImageCodec>,
    ) -> Self {
        let layout = config.layout();
        let recipes = Arc::new(RecipeTable::new(layout, config.sizes()));

        Self {
            copy: CopyOrchestrator::new(
                storage.clone(),
                records.clone(),
                config.source_bucket(),
                config.destination_bucket(),
                layout.destination_dir.clone(),
            ),
            gate: IngestGate::new(config.watched_bucket(), layout, &recipes),
            transform: TransformPipeline::new(
                storage,
                records.clone(),
                codec,
                recipes,
                layout.temp_convert_dir.clone(),
            ),
            records,
            copy_timeout: config.copy_timeout(),
            transform_timeout: config.transform_timeout(),
        }
    }

    /// Handle a migration record write.
    #[tracing::instrument(skip(self, event), fields(record_id = %event.record_id))]
    pub async fn on_record_change(
        &self,
        event: &RecordChangeEvent,
    ) -> Result<CopyReport, MigrationError> {
        within(self.copy_timeout, self.copy.handle(event)).await
    }

    /// Handle an object finalize in the watched bucket.
    #[tracing::instrument(skip(self, event), fields(bucket = %event.bucket, key = %event.name))]
    pub async fn on_object_finalize(
        &self,
        event: &ObjectFinalizeEvent,
    ) -> Result<FinalizeReport, MigrationError> {
        within(self.transform_timeout, self.finalize(event)).await
    }

    async fn finalize(&self, event: &ObjectFinalizeEvent) -> FinalizeReport {
        match self.gate.classify(event) {
            GateOutcome::Skip(reason) => {
                match &reason {
                    SkipReason::InvalidMetadata(err) => {
                        MigrationError::Validation(err.clone()).log("Object metadata validation failed")
                    }
                    other => tracing::debug!(reason = ?other, outcome = "skip", "Object skipped"),
                }
                FinalizeReport::Skipped(reason)
            }
            GateOutcome::Redirect(redirect) => {
                tracing::debug!(outcome = "redirect", field = redirect.field.as_str(), "Derivative landed");
                match apply_redirect(self.records.as_ref(), &redirect).await {
                    Ok(()) => FinalizeReport::Redirected(redirect),
                    Err(err) => {
                        err.log("Failed to record derivative path");
                        FinalizeReport::RedirectFailed {
                            redirect,
                            error: err.to_string(),
                        }
                    }
                }
            }
            GateOutcome::Proceed(job) => {
                tracing::debug!(outcome = "proceed", record_id = %job.identity.id, "Transforming upload");
                match self.transform.run(&job).await {
                    Ok(report) => FinalizeReport::Transformed(report),
                    Err(err) => {
                        err.log("Image transform failed");
                        self.transform.record_failure(&job, &err).await;
                        FinalizeReport::TransformFailed {
                            record_id: job.identity.id,
                            error: err.to_string(),
                        }
                    }
                }
            }
        }
    }
}

async fn within<T>(budget: Duration, work: impl Future<Output = T>) -> Result<T, MigrationError> {
    match tokio::time::timeout(budget, work).await {
        Ok(result) => Ok(result),
        Err(_) => {
            let err = MigrationError::Timeout(budget);
            err.log("Invocation exceeded its time budget");
            Err(err)
        }
    }
}
