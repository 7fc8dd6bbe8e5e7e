//! Custom metadata attached to stored objects.
//!
//! Every object the migrator writes carries the identifying metadata of the
//! record it belongs to. Derivatives additionally carry `processed=true`, which is
//! what stops the ingest gate from re-processing its own output.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::photo_type::PhotoType;
use super::record::MigrationRecord;

pub const KEY_ID: &str = "id";
pub const KEY_CID: &str = "cid";
pub const KEY_TYPE: &str = "type";
pub const KEY_USER: &str = "user";
pub const KEY_ORIGINAL_NAME: &str = "originalName";
pub const KEY_PROCESSED: &str = "processed";

/// String-to-string metadata map of a stored object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectMetadata(BTreeMap<String, String>);

impl ObjectMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Overlay `other` onto `self`; keys in `other` win.
    pub fn merge(&mut self, other: &ObjectMetadata) {
        for (key, value) in other.iter() {
            self.0.insert(key.clone(), value.clone());
        }
    }

    /// Whether every entry of `other` is already present with the same value.
    pub fn contains_all(&self, other: &ObjectMetadata) -> bool {
        other
            .iter()
            .all(|(key, value)| self.0.get(key).is_some_and(|v| v == value))
    }

    pub fn id(&self) -> Option<&str> {
        self.non_empty(KEY_ID)
    }

    pub fn cid(&self) -> Option<&str> {
        self.non_empty(KEY_CID)
    }

    pub fn photo_type_raw(&self) -> Option<&str> {
        self.non_empty(KEY_TYPE)
    }

    pub fn owning_user(&self) -> Option<&str> {
        self.non_empty(KEY_USER)
    }

    pub fn original_name(&self) -> Option<&str> {
        self.non_empty(KEY_ORIGINAL_NAME)
    }

    /// Only the exact string `"true"` marks an object as a derivative.
    pub fn is_processed(&self) -> bool {
        self.get(KEY_PROCESSED) == Some("true")
    }

    fn non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|value| !value.is_empty())
    }
}

impl FromIterator<(String, String)> for ObjectMetadata {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<BTreeMap<String, String>> for ObjectMetadata {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MetadataError {
    #[error("metadata key '{0}' is missing or empty")]
    Missing(&'static str),

    #[error("unknown photo type '{0}'")]
    UnknownPhotoType(String),
}

/// The identifying subset of object metadata, typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifyingMetadata {
    pub id: String,
    pub cid: Option<String>,
    pub photo_type: PhotoType,
    pub owning_user: String,
    pub original_name: Option<String>,
}

impl IdentifyingMetadata {
    pub fn from_record(record: &MigrationRecord) -> Self {
        Self {
            id: record.id.clone(),
            cid: Some(record.cid.clone()),
            photo_type: record.photo_type,
            owning_user: record.owning_user.clone(),
            original_name: record.original_file_name.clone(),
        }
    }

    /// Extract `id`, `type` and `user` from object metadata. `cid` and
    /// `originalName` are optional.
    pub fn from_object(metadata: &ObjectMetadata) -> Result<Self, MetadataError> {
        let id = metadata.id().ok_or(MetadataError::Missing(KEY_ID))?;
        let raw_type = metadata
            .photo_type_raw()
            .ok_or(MetadataError::Missing(KEY_TYPE))?;
        let owning_user = metadata
            .owning_user()
            .ok_or(MetadataError::Missing(KEY_USER))?;
        let photo_type = raw_type
            .parse::<PhotoType>()
            .map_err(|_| MetadataError::UnknownPhotoType(raw_type.to_string()))?;

        Ok(Self {
            id: id.to_string(),
            cid: metadata.cid().map(str::to_string),
            photo_type,
            owning_user: owning_user.to_string(),
            original_name: metadata.original_name().map(str::to_string),
        })
    }

    pub fn to_metadata(&self) -> ObjectMetadata {
        let mut metadata = ObjectMetadata::new();
        metadata.insert(KEY_ID, self.id.clone());
        if let Some(ref cid) = self.cid {
            metadata.insert(KEY_CID, cid.clone());
        }
        metadata.insert(KEY_TYPE, self.photo_type.as_str());
        metadata.insert(KEY_USER, self.owning_user.clone());
        if let Some(ref name) = self.original_name {
            metadata.insert(KEY_ORIGINAL_NAME, name.clone());
        }
        metadata
    }

    /// Metadata for an object produced by the transform pipeline.
    pub fn derivative(&self) -> ObjectMetadata {
        let mut metadata = self.to_metadata();
        metadata.insert(KEY_PROCESSED, "true");
        metadata
    }
}
