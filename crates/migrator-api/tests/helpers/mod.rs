use axum_test::TestServer;
use bytes::Bytes;
use migrator_api::setup::routes::setup_routes;
use migrator_api::AppState;
use migrator_core::{Config, MigrationRecord, ObjectMetadata, PhotoType};
use migrator_db::InMemoryRecordStore;
use migrator_pipeline::MigrationService;
use migrator_processing::RasterCodec;
use migrator_storage::{BucketStorage, ObjectStorage};
use std::collections::HashMap;
use std::sync::Arc;

/// Test application over in-memory buckets and records
pub struct TestApp {
    pub server: TestServer,
    pub storage: Arc<BucketStorage>,
    pub records: Arc<InMemoryRecordStore>,
}

impl TestApp {
    /// Get the HTTP test client
    pub fn client(&self) -> &TestServer {
        &self.server
    }
}

pub fn test_config() -> Config {
    let vars: HashMap<&str, &str> = [
        ("SOURCE_BUCKET_ID", "legacy"),
        ("DESTINATION_BUCKET_ID", "photos"),
        ("STORAGE_BACKEND", "memory"),
        ("RECORD_STORE_BACKEND", "memory"),
    ]
    .into_iter()
    .collect();
    Config::from_lookup(move |key: &str| vars.get(key).map(|v| v.to_string()))
        .expect("Failed to build test config")
}

pub fn test_record() -> MigrationRecord {
    MigrationRecord::new("rec-1", "c1", PhotoType::Product, "uploads/abc.jpg", "u1")
}

/// Setup a test application with one legacy object and its record
pub async fn setup_test_app() -> TestApp {
    let config = test_config();
    let storage = Arc::new(BucketStorage::in_memory(&config.buckets()));
    storage
        .write_with_metadata(
            "legacy",
            "uploads/abc.jpg",
            Bytes::from_static(b"legacy bytes"),
            "image/jpeg",
            &ObjectMetadata::new(),
        )
        .await
        .expect("Failed to seed legacy object");

    let records = Arc::new(InMemoryRecordStore::new());
    records.insert(test_record()).await;

    let service = Arc::new(MigrationService::new(
        &config,
        storage.clone(),
        records.clone(),
        Arc::new(RasterCodec::new()),
    ));
    let state = Arc::new(AppState::new(service, storage.clone(), None));
    let server = TestServer::new(setup_routes(state)).expect("Failed to create test server");

    TestApp {
        server,
        storage,
        records,
    }
}
