//! Process-wide storage handle built on first use.

use crate::traits::{ObjectStorage, Precondition, StorageResult, StoredMetadata};
use crate::{create_storage, StorageBackend};
use async_trait::async_trait;
use bytes::Bytes;
use migrator_core::{Config, ObjectMetadata};
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Storage client constructed at most once, on the first call that needs it.
///
/// A failed construction leaves the cell empty; the next call retries.
pub struct LazyStorage {
    config: Config,
    cell: OnceCell<Arc<dyn ObjectStorage>>,
}

impl LazyStorage {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            cell: OnceCell::new(),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.initialized()
    }

    pub async fn get(&self) -> StorageResult<&Arc<dyn ObjectStorage>> {
        self.cell
            .get_or_try_init(|| async { create_storage(&self.config).await })
            .await
    }
}

#[async_trait]
impl ObjectStorage for LazyStorage {
    async fn read(&self, bucket: &str, key: &str) -> StorageResult<Bytes> {
        self.get().await?.read(bucket, key).await
    }

    async fn write_with_metadata(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        content_type: &str,
        metadata: &ObjectMetadata,
    ) -> StorageResult<()> {
        self.get()
            .await?
            .write_with_metadata(bucket, key, data, content_type, metadata)
            .await
    }

    async fn get_metadata(&self, bucket: &str, key: &str) -> StorageResult<StoredMetadata> {
        self.get().await?.get_metadata(bucket, key).await
    }

    async fn set_metadata(
        &self,
        bucket: &str,
        key: &str,
        metadata: &ObjectMetadata,
        precondition: Precondition,
    ) -> StorageResult<()> {
        self.get()
            .await?
            .set_metadata(bucket, key, metadata, precondition)
            .await
    }

    async fn copy(
        &self,
        src_bucket: &str,
        src_key: &str,
        dst_bucket: &str,
        dst_key: &str,
        precondition: Precondition,
    ) -> StorageResult<()> {
        self.get()
            .await?
            .copy(src_bucket, src_key, dst_bucket, dst_key, precondition)
            .await
    }

    async fn delete_if_exists(&self, bucket: &str, key: &str) -> StorageResult<()> {
        self.get().await?.delete_if_exists(bucket, key).await
    }

    fn backend_type(&self) -> StorageBackend {
        self.config.storage_backend()
    }
}
