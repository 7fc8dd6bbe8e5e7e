use crate::traits::{
    ObjectGeneration, ObjectStorage, Precondition, StorageError, StorageResult, StoredMetadata,
};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use migrator_core::ObjectMetadata;
use object_store::memory::InMemory;
use object_store::path::Path;
use object_store::Error as ObjectStoreError;
use object_store::{
    Attribute, AttributeValue, Attributes, GetOptions, GetResult, ObjectMeta, ObjectStore,
    ObjectStoreExt, PutMode, PutOptions, PutPayload, UpdateVersion,
};
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

/// `ObjectStorage` over one `object_store` client per bucket.
#[derive(Clone)]
pub struct BucketStorage {
    backend: StorageBackend,
    stores: HashMap<String, Arc<dyn ObjectStore>>,
}

impl BucketStorage {
    pub fn new(backend: StorageBackend) -> Self {
        Self {
            backend,
            stores: HashMap::new(),
        }
    }

    /// Register the client serving `bucket`.
    pub fn with_bucket(mut self, bucket: impl Into<String>, store: Arc<dyn ObjectStore>) -> Self {
        self.stores.insert(bucket.into(), store);
        self
    }

    /// Process-local buckets backed by `InMemory`.
    pub fn in_memory<S: AsRef<str>>(buckets: &[S]) -> Self {
        buckets
            .iter()
            .fold(Self::new(StorageBackend::Memory), |storage, bucket| {
                storage.with_bucket(bucket.as_ref(), Arc::new(InMemory::new()))
            })
    }

    pub fn buckets(&self) -> impl Iterator<Item = &str> {
        self.stores.keys().map(String::as_str)
    }

    fn store(&self, bucket: &str) -> StorageResult<&Arc<dyn ObjectStore>> {
        self.stores
            .get(bucket)
            .ok_or_else(|| StorageError::UnknownBucket(bucket.to_string()))
    }

    async fn fetch(&self, bucket: &str, key: &str, head: bool) -> StorageResult<GetResult> {
        let store = self.store(bucket)?;
        let options = GetOptions {
            head,
            ..Default::default()
        };
        store
            .get_opts(&Path::from(key), options)
            .await
            .map_err(|e| read_error(e, bucket, key))
    }
}

fn location(bucket: &str, key: &str) -> String {
    format!("{}/{}", bucket, key)
}

fn read_error(err: ObjectStoreError, bucket: &str, key: &str) -> StorageError {
    match err {
        ObjectStoreError::NotFound { .. } => StorageError::NotFound(location(bucket, key)),
        other => StorageError::DownloadFailed(other.to_string()),
    }
}

fn write_error(err: ObjectStoreError, bucket: &str, key: &str) -> StorageError {
    match err {
        ObjectStoreError::AlreadyExists { .. } => {
            StorageError::AlreadyExists(location(bucket, key))
        }
        ObjectStoreError::Precondition { .. } => {
            StorageError::PreconditionFailed(location(bucket, key))
        }
        ObjectStoreError::NotFound { .. } => StorageError::NotFound(location(bucket, key)),
        other => StorageError::UploadFailed(other.to_string()),
    }
}

fn generation_of(meta: &ObjectMeta) -> ObjectGeneration {
    ObjectGeneration {
        e_tag: meta.e_tag.clone(),
        version: meta.version.clone(),
    }
}

fn put_mode(precondition: Precondition) -> PutMode {
    match precondition {
        Precondition::DoesNotExist => PutMode::Create,
        Precondition::GenerationMatch(generation) => PutMode::Update(UpdateVersion {
            e_tag: generation.e_tag,
            version: generation.version,
        }),
    }
}

fn stamp_metadata(attributes: &mut Attributes, metadata: &ObjectMetadata) {
    for (key, value) in metadata.iter() {
        attributes.insert(
            Attribute::Metadata(Cow::Owned(key.clone())),
            AttributeValue::from(value.clone()),
        );
    }
}

fn split_attributes(attributes: &Attributes) -> (ObjectMetadata, Option<String>) {
    let mut metadata = ObjectMetadata::new();
    let mut content_type = None;
    for (attribute, value) in attributes.iter() {
        let value: &str = value.as_ref();
        match attribute {
            Attribute::Metadata(name) => metadata.insert(name.to_string(), value),
            Attribute::ContentType => content_type = Some(value.to_string()),
            _ => {}
        }
    }
    (metadata, content_type)
}

#[async_trait]
impl ObjectStorage for BucketStorage {
    async fn read(&self, bucket: &str, key: &str) -> StorageResult<Bytes> {
        let start = Instant::now();
        let result = self.fetch(bucket, key, false).await?;
        let bytes = result.bytes().await.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %bucket,
                key = %key,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Object download failed"
            );
            StorageError::DownloadFailed(e.to_string())
        })?;

        tracing::debug!(
            bucket = %bucket,
            key = %key,
            size_bytes = bytes.len() as u64,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Object download successful"
        );

        Ok(bytes)
    }

    async fn write_with_metadata(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        content_type: &str,
        metadata: &ObjectMetadata,
    ) -> StorageResult<()> {
        let store = self.store(bucket)?;
        let start = Instant::now();
        let size = data.len() as u64;

        let mut attributes = Attributes::new();
        attributes.insert(
            Attribute::ContentType,
            AttributeValue::from(content_type.to_string()),
        );
        stamp_metadata(&mut attributes, metadata);

        let options = PutOptions {
            mode: PutMode::Overwrite,
            attributes,
            ..Default::default()
        };

        store
            .put_opts(&Path::from(key), PutPayload::from(data), options)
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %bucket,
                    key = %key,
                    size_bytes = size,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Object upload failed"
                );
                write_error(e, bucket, key)
            })?;

        tracing::info!(
            bucket = %bucket,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Object upload successful"
        );

        Ok(())
    }

    async fn get_metadata(&self, bucket: &str, key: &str) -> StorageResult<StoredMetadata> {
        let result = self.fetch(bucket, key, true).await?;
        let (metadata, content_type) = split_attributes(&result.attributes);
        Ok(StoredMetadata {
            metadata,
            content_type,
            generation: generation_of(&result.meta),
        })
    }

    async fn set_metadata(
        &self,
        bucket: &str,
        key: &str,
        metadata: &ObjectMetadata,
        precondition: Precondition,
    ) -> StorageResult<()> {
        let store = self.store(bucket)?;
        let current = self.fetch(bucket, key, false).await?;
        let generation = generation_of(&current.meta);

        match precondition {
            Precondition::DoesNotExist => {
                return Err(StorageError::AlreadyExists(location(bucket, key)));
            }
            Precondition::GenerationMatch(ref expected) if *expected != generation => {
                return Err(StorageError::PreconditionFailed(location(bucket, key)));
            }
            Precondition::GenerationMatch(_) => {}
        }

        // object_store has no metadata patch, so the body is rewritten in place,
        // conditional on the generation just read.
        let mut attributes = current.attributes.clone();
        stamp_metadata(&mut attributes, metadata);
        let body = current
            .bytes()
            .await
            .map_err(|e| StorageError::DownloadFailed(e.to_string()))?;

        let options = PutOptions {
            mode: put_mode(Precondition::GenerationMatch(generation)),
            attributes,
            ..Default::default()
        };
        store
            .put_opts(&Path::from(key), PutPayload::from(body), options)
            .await
            .map_err(|e| write_error(e, bucket, key))?;

        tracing::debug!(bucket = %bucket, key = %key, "Object metadata updated");
        Ok(())
    }

    async fn copy(
        &self,
        src_bucket: &str,
        src_key: &str,
        dst_bucket: &str,
        dst_key: &str,
        precondition: Precondition,
    ) -> StorageResult<()> {
        let start = Instant::now();
        let destination = self.store(dst_bucket)?;
        let source = self.fetch(src_bucket, src_key, false).await?;
        let attributes = source.attributes.clone();
        let body = source
            .bytes()
            .await
            .map_err(|e| StorageError::DownloadFailed(e.to_string()))?;
        let size = body.len() as u64;

        let options = PutOptions {
            mode: put_mode(precondition),
            attributes,
            ..Default::default()
        };
        destination
            .put_opts(&Path::from(dst_key), PutPayload::from(body), options)
            .await
            .map_err(|e| write_error(e, dst_bucket, dst_key))?;

        tracing::info!(
            from = %location(src_bucket, src_key),
            to = %location(dst_bucket, dst_key),
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Object copy successful"
        );

        Ok(())
    }

    async fn delete_if_exists(&self, bucket: &str, key: &str) -> StorageResult<()> {
        let store = self.store(bucket)?;
        match store.delete(&Path::from(key)).await {
            Ok(()) | Err(ObjectStoreError::NotFound { .. }) => {
                tracing::debug!(bucket = %bucket, key = %key, "Object deleted");
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, bucket = %bucket, key = %key, "Object delete failed");
                Err(StorageError::DeleteFailed(e.to_string()))
            }
        }
    }

    fn backend_type(&self) -> StorageBackend {
        self.backend
    }
}
