use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::Path;
use std::str::FromStr;

use super::photo_type::PhotoType;

/// Copy status of a migration record.
///
/// Moves forward only: `Pending -> Copied` or `Pending -> CopyError`; a later
/// successful retry may move `CopyError -> Copied`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MigrationStatus {
    #[default]
    Pending,
    Copied,
    CopyError,
}

impl MigrationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MigrationStatus::Pending => "pending",
            MigrationStatus::Copied => "copied",
            MigrationStatus::CopyError => "copy_error",
        }
    }
}

impl Display for MigrationStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MigrationStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(MigrationStatus::Pending),
            "copied" => Ok(MigrationStatus::Copied),
            "copy_error" => Ok(MigrationStatus::CopyError),
            _ => Err(anyhow::anyhow!("Invalid migration status: {}", s)),
        }
    }
}

/// Record field that receives the final path of a derivative image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RecordPathField {
    ConvertedFileName,
    CompressedFileName,
}

impl RecordPathField {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordPathField::ConvertedFileName => "convertedFileName",
            RecordPathField::CompressedFileName => "compressedFileName",
        }
    }
}

/// One image to migrate. Document fields are camelCase on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationRecord {
    /// Document id. Trigger payloads carry it next to the document, so it may be
    /// absent from the body itself.
    #[serde(default)]
    pub id: String,
    pub cid: String,
    pub photo_type: PhotoType,
    pub source_path: String,
    #[serde(default)]
    pub destination_path: Option<String>,
    pub owning_user: String,
    #[serde(default)]
    pub original_file_name: Option<String>,
    #[serde(default)]
    pub converted_file_name: Option<String>,
    #[serde(default)]
    pub compressed_file_name: Option<String>,
    #[serde(default)]
    pub ready_to_migrate: bool,
    #[serde(default)]
    pub migrated: bool,
    #[serde(default)]
    pub status: MigrationStatus,
    /// Present only when `status` is `CopyError`.
    #[serde(default)]
    pub error: Option<String>,
    /// Last derivative-processing failure, cleared once a derivative lands.
    #[serde(default)]
    pub transform_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MigrationRecord {
    /// A freshly created record, ready to migrate.
    pub fn new(
        id: impl Into<String>,
        cid: impl Into<String>,
        photo_type: PhotoType,
        source_path: impl Into<String>,
        owning_user: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            cid: cid.into(),
            photo_type,
            source_path: source_path.into(),
            destination_path: None,
            owning_user: owning_user.into(),
            original_file_name: None,
            converted_file_name: None,
            compressed_file_name: None,
            ready_to_migrate: true,
            migrated: false,
            status: MigrationStatus::Pending,
            error: None,
            transform_error: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_original_file_name(mut self, name: impl Into<String>) -> Self {
        self.original_file_name = Some(name.into());
        self
    }

    /// Extension of the source path including the leading dot, or empty when the
    /// file name has none.
    pub fn source_extension(&self) -> String {
        Path::new(&self.source_path)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{}", ext))
            .unwrap_or_default()
    }

    /// `{destination_dir}/{cid}{extension-of(source_path)}`
    pub fn destination_path_in(&self, destination_dir: &str) -> String {
        format!(
            "{}/{}{}",
            destination_dir.trim_end_matches('/'),
            self.cid,
            self.source_extension()
        )
    }

    /// Whether any field the copy step consumes differs between two snapshots.
    pub fn copy_inputs_differ(&self, other: &MigrationRecord) -> bool {
        self.cid != other.cid
            || self.photo_type != other.photo_type
            || self.source_path != other.source_path
            || self.owning_user != other.owning_user
            || self.original_file_name != other.original_file_name
            || self.ready_to_migrate != other.ready_to_migrate
    }

    pub fn path_field(&self, field: RecordPathField) -> Option<&str> {
        match field {
            RecordPathField::ConvertedFileName => self.converted_file_name.as_deref(),
            RecordPathField::CompressedFileName => self.compressed_file_name.as_deref(),
        }
    }
}

/// Field-level partial update of a migration record.
///
/// `None` leaves a field untouched. For optional fields `Some(None)` clears the
/// stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordUpdate {
    pub status: Option<MigrationStatus>,
    pub destination_path: Option<Option<String>>,
    pub error: Option<Option<String>>,
    pub transform_error: Option<Option<String>>,
    pub converted_file_name: Option<String>,
    pub compressed_file_name: Option<String>,
    pub migrated: Option<bool>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl RecordUpdate {
    /// Successful copy: status=Copied, destination set, error cleared.
    pub fn copied(destination_path: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            status: Some(MigrationStatus::Copied),
            destination_path: Some(Some(destination_path.into())),
            error: Some(None),
            updated_at: Some(now),
            ..Default::default()
        }
    }

    /// Failed copy: status=CopyError, destination cleared, error recorded.
    pub fn copy_failed(error: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            status: Some(MigrationStatus::CopyError),
            destination_path: Some(None),
            error: Some(Some(error.into())),
            updated_at: Some(now),
            ..Default::default()
        }
    }

    pub fn transform_failed(error: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            transform_error: Some(Some(error.into())),
            updated_at: Some(now),
            ..Default::default()
        }
    }

    /// A derivative landed: record its path, mark the record migrated.
    pub fn derivative_ready(
        field: RecordPathField,
        path: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        let path = path.into();
        let mut update = Self {
            migrated: Some(true),
            transform_error: Some(None),
            updated_at: Some(now),
            ..Default::default()
        };
        match field {
            RecordPathField::ConvertedFileName => update.converted_file_name = Some(path),
            RecordPathField::CompressedFileName => update.compressed_file_name = Some(path),
        }
        update
    }

    pub fn is_empty(&self) -> bool {
        *self == RecordUpdate::default()
    }

    /// Merge this update into a record in place.
    pub fn apply_to(&self, record: &mut MigrationRecord) {
        if let Some(status) = self.status {
            record.status = status;
        }
        if let Some(ref destination_path) = self.destination_path {
            record.destination_path = destination_path.clone();
        }
        if let Some(ref error) = self.error {
            record.error = error.clone();
        }
        if let Some(ref transform_error) = self.transform_error {
            record.transform_error = transform_error.clone();
        }
        if let Some(ref name) = self.converted_file_name {
            record.converted_file_name = Some(name.clone());
        }
        if let Some(ref name) = self.compressed_file_name {
            record.compressed_file_name = Some(name.clone());
        }
        if let Some(migrated) = self.migrated {
            record.migrated = migrated;
        }
        if let Some(updated_at) = self.updated_at {
            record.updated_at = updated_at;
        }
    }
}
