//! Push-delivered trigger events.
//!
//! Both endpoints acknowledge with 204 once the body parses. Processing
//! failures are recorded on the record or in the logs and never surface to the
//! sender, so a delivery is not retried because of them.

use crate::error::{HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{extract::State, http::StatusCode};
use migrator_pipeline::{ObjectFinalizeEvent, RecordChangeEvent};
use std::sync::Arc;

#[tracing::instrument(skip(state, event), fields(record_id = %event.record_id))]
pub async fn record_change(
    State(state): State<Arc<AppState>>,
    ValidatedJson(event): ValidatedJson<RecordChangeEvent>,
) -> Result<StatusCode, HttpAppError> {
    match state.service.on_record_change(&event).await {
        Ok(report) => tracing::debug!(outcome = ?report.outcome, "Record change handled"),
        Err(err) => tracing::debug!(error_code = err.error_code(), "Record change abandoned"),
    }
    Ok(StatusCode::NO_CONTENT)
}

#[tracing::instrument(skip(state, event), fields(bucket = %event.bucket, key = %event.name))]
pub async fn object_finalize(
    State(state): State<Arc<AppState>>,
    ValidatedJson(event): ValidatedJson<ObjectFinalizeEvent>,
) -> Result<StatusCode, HttpAppError> {
    match state.service.on_object_finalize(&event).await {
        Ok(report) => tracing::debug!(outcome = ?report, "Object finalize handled"),
        Err(err) => tracing::debug!(error_code = err.error_code(), "Object finalize abandoned"),
    }
    Ok(StatusCode::NO_CONTENT)
}
