use crate::{BucketStorage, ObjectStorage, StorageBackend, StorageError, StorageResult};
use migrator_core::Config;
use object_store::aws::AmazonS3Builder;
use object_store::gcp::GoogleCloudStorageBuilder;
use object_store::ObjectStore;
use std::sync::Arc;

/// Create a storage backend based on configuration
///
/// One client is built per bucket the configuration names. Credentials come
/// from the ambient environment of the selected provider.
pub async fn create_storage(config: &Config) -> StorageResult<Arc<dyn ObjectStorage>> {
    let backend = config.storage_backend();
    let buckets = config.buckets();

    let storage = match backend {
        StorageBackend::Memory => BucketStorage::in_memory(&buckets),
        StorageBackend::Gcs => {
            let mut storage = BucketStorage::new(backend);
            for bucket in &buckets {
                let store = GoogleCloudStorageBuilder::from_env()
                    .with_bucket_name(bucket.clone())
                    .build()
                    .map_err(|e| StorageError::ConfigError(e.to_string()))?;
                storage = storage.with_bucket(bucket.clone(), Arc::new(store) as Arc<dyn ObjectStore>);
            }
            storage
        }
        StorageBackend::S3 => {
            let region = config.s3_region().map(String::from).ok_or_else(|| {
                StorageError::ConfigError("S3_REGION or AWS_REGION not configured".to_string())
            })?;
            let mut storage = BucketStorage::new(backend);
            for bucket in &buckets {
                let mut builder = AmazonS3Builder::from_env()
                    .with_region(region.clone())
                    .with_bucket_name(bucket.clone());
                if let Some(endpoint) = config.s3_endpoint() {
                    builder = builder
                        .with_endpoint(endpoint.to_string())
                        .with_allow_http(endpoint.starts_with("http://"));
                }
                let store = builder
                    .build()
                    .map_err(|e| StorageError::ConfigError(e.to_string()))?;
                storage = storage.with_bucket(bucket.clone(), Arc::new(store) as Arc<dyn ObjectStore>);
            }
            storage
        }
    };

    tracing::info!(
        backend = %backend,
        buckets = ?buckets,
        "Object storage initialized"
    );

    Ok(Arc::new(storage))
}
