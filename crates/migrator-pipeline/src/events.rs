//! Trigger payloads.

use migrator_core::{MigrationRecord, ObjectMetadata};
use serde::{Deserialize, Serialize};

/// A write to a migration record, with the document before and after it.
///
/// `before` is absent for creates and `after` for deletes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordChangeEvent {
    pub record_id: String,
    #[serde(default)]
    pub before: Option<MigrationRecord>,
    #[serde(default)]
    pub after: Option<MigrationRecord>,
}

impl RecordChangeEvent {
    pub fn created(record: MigrationRecord) -> Self {
        Self {
            record_id: record.id.clone(),
            before: None,
            after: Some(record),
        }
    }

    pub fn updated(before: MigrationRecord, after: MigrationRecord) -> Self {
        Self {
            record_id: after.id.clone(),
            before: Some(before),
            after: Some(after),
        }
    }

    /// The post-write document, carrying the event's record id.
    pub fn current(&self) -> Option<MigrationRecord> {
        self.after.clone().map(|mut record| {
            if record.id.is_empty() {
                record.id = self.record_id.clone();
            }
            record
        })
    }
}

/// A finalized (created or overwritten) object, in the storage notification
/// resource shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectFinalizeEvent {
    pub bucket: String,
    pub name: String,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub generation: Option<String>,
    #[serde(default)]
    pub metadata: ObjectMetadata,
}

impl ObjectFinalizeEvent {
    pub fn new(bucket: impl Into<String>, name: impl Into<String>, metadata: ObjectMetadata) -> Self {
        Self {
            bucket: bucket.into(),
            name: name.into(),
            content_type: None,
            generation: None,
            metadata,
        }
    }
}
