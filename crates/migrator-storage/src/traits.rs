//! Storage abstraction trait
//!
//! This module defines the `ObjectStorage` trait that every bucket backend implements.

use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use migrator_core::ObjectMetadata;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Object already exists: {0}")]
    AlreadyExists(String),

    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Unknown bucket: {0}")]
    UnknownBucket(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Version of a stored object as reported by the backend.
///
/// GCS reports a generation, S3 a version id; both report an ETag. Two values
/// compare equal only when they describe the same write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectGeneration {
    pub e_tag: Option<String>,
    pub version: Option<String>,
}

/// Metadata of a stored object together with the generation it was read at.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredMetadata {
    pub metadata: ObjectMetadata,
    pub content_type: Option<String>,
    pub generation: ObjectGeneration,
}

/// Write precondition.
#[derive(Debug, Clone, PartialEq)]
pub enum Precondition {
    /// The target must not exist yet (generation-match-zero).
    DoesNotExist,
    /// The target must still be at this generation.
    GenerationMatch(ObjectGeneration),
}

/// Bucket-addressed object storage.
///
/// Every method takes the bucket explicitly; an implementation only serves the
/// buckets it was configured with and answers `UnknownBucket` otherwise.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Fetch the full body of an object.
    async fn read(&self, bucket: &str, key: &str) -> StorageResult<Bytes>;

    /// Write an object, replacing any existing one, with the given custom metadata.
    async fn write_with_metadata(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        content_type: &str,
        metadata: &ObjectMetadata,
    ) -> StorageResult<()>;

    /// Read the custom metadata and current generation of an object.
    async fn get_metadata(&self, bucket: &str, key: &str) -> StorageResult<StoredMetadata>;

    /// Merge `metadata` into the object's custom metadata.
    ///
    /// Fails with `PreconditionFailed` when the object changed since the
    /// generation named by `precondition`.
    async fn set_metadata(
        &self,
        bucket: &str,
        key: &str,
        metadata: &ObjectMetadata,
        precondition: Precondition,
    ) -> StorageResult<()>;

    /// Copy an object, body and metadata, possibly across buckets.
    ///
    /// With `Precondition::DoesNotExist` an existing destination yields
    /// `AlreadyExists` and is left untouched.
    async fn copy(
        &self,
        src_bucket: &str,
        src_key: &str,
        dst_bucket: &str,
        dst_key: &str,
        precondition: Precondition,
    ) -> StorageResult<()>;

    /// Delete an object. An absent object is not an error.
    async fn delete_if_exists(&self, bucket: &str, key: &str) -> StorageResult<()>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
