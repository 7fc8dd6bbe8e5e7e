//! End-to-end scenarios over in-memory buckets and records.
//!
//! Finalize events are built from what the pipeline actually stored, so the
//! metadata each step stamps is what the next step sees.

use bytes::Bytes;
use migrator_core::{
    Config, MetadataError, MigrationRecord, MigrationStatus, ObjectMetadata, PhotoType,
};
use migrator_db::{InMemoryRecordStore, MigrationRecordStore};
use migrator_pipeline::{
    CopyOutcome, FinalizeReport, MigrationService, ObjectFinalizeEvent, RecordChangeEvent,
    SkipReason,
};
use migrator_processing::RasterCodec;
use migrator_storage::{BucketStorage, ObjectStorage, StorageError};
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Arc;

struct Harness {
    storage: Arc<BucketStorage>,
    records: Arc<InMemoryRecordStore>,
    service: MigrationService,
}

fn config() -> Config {
    let vars: HashMap<&str, &str> = [
        ("SOURCE_BUCKET_ID", "legacy"),
        ("DESTINATION_BUCKET_ID", "photos"),
        ("STORAGE_BACKEND", "memory"),
        ("RECORD_STORE_BACKEND", "memory"),
        ("PHOTO_SIZE_CIRCLE", "48"),
        ("PHOTO_SIZE_PRODUCT", "72"),
        ("PHOTO_SIZE_REPRESENTATIVE", "24"),
    ]
    .into_iter()
    .collect();
    Config::from_lookup(move |key: &str| vars.get(key).map(|v| v.to_string())).unwrap()
}

fn jpeg(width: u32, height: u32) -> Bytes {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([180, 90, 30]));
    let mut buffer = Vec::new();
    img.write_to(&mut Cursor::new(&mut buffer), image::ImageFormat::Jpeg)
        .unwrap();
    Bytes::from(buffer)
}

fn record() -> MigrationRecord {
    MigrationRecord::new("rec-1", "c1", PhotoType::Product, "uploads/abc.jpg", "u1")
        .with_original_file_name("abc.jpg")
}

async fn harness() -> Harness {
    let config = config();
    let storage = Arc::new(BucketStorage::in_memory(&config.buckets()));
    storage
        .write_with_metadata(
            "legacy",
            "uploads/abc.jpg",
            jpeg(96, 64),
            "image/jpeg",
            &ObjectMetadata::new(),
        )
        .await
        .unwrap();
    let records = Arc::new(InMemoryRecordStore::new());
    records.insert(record()).await;
    let service = MigrationService::new(
        &config,
        storage.clone(),
        records.clone(),
        Arc::new(RasterCodec::new()),
    );
    Harness {
        storage,
        records,
        service,
    }
}

/// The finalize notification the bucket would send for `key`.
async fn finalized(storage: &BucketStorage, bucket: &str, key: &str) -> ObjectFinalizeEvent {
    let stored = storage.get_metadata(bucket, key).await.unwrap();
    ObjectFinalizeEvent::new(bucket, key, stored.metadata)
}

fn metadata(pairs: &[(&str, &str)]) -> ObjectMetadata {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[tokio::test]
async fn test_new_record_is_copied_to_destination() {
    let h = harness().await;
    let report = h
        .service
        .on_record_change(&RecordChangeEvent::created(record()))
        .await
        .unwrap();

    assert_eq!(
        report.outcome,
        CopyOutcome::Copied {
            destination_path: "migrated/c1.jpg".into()
        }
    );
    assert_eq!(
        h.storage.read("photos", "migrated/c1.jpg").await.unwrap(),
        h.storage.read("legacy", "uploads/abc.jpg").await.unwrap()
    );

    let stored = h.records.read("rec-1").await.unwrap().unwrap();
    assert_eq!(stored.status, MigrationStatus::Copied);
    assert_eq!(stored.destination_path.as_deref(), Some("migrated/c1.jpg"));
    assert!(stored.error.is_none());
}

#[tokio::test]
async fn test_redelivered_copy_keeps_destination_and_status() {
    let h = harness().await;
    let event = RecordChangeEvent::created(record());
    h.service.on_record_change(&event).await.unwrap();
    let first = h.storage.read("photos", "migrated/c1.jpg").await.unwrap();

    // The source changes between deliveries; the destination must not follow
    let source = h.storage.get_metadata("legacy", "uploads/abc.jpg").await.unwrap();
    h.storage
        .write_with_metadata("legacy", "uploads/abc.jpg", jpeg(10, 10), "image/jpeg", &source.metadata)
        .await
        .unwrap();

    let report = h.service.on_record_change(&event).await.unwrap();
    assert_eq!(
        report.outcome,
        CopyOutcome::AlreadyMigrated {
            destination_path: "migrated/c1.jpg".into()
        }
    );
    assert_eq!(h.storage.read("photos", "migrated/c1.jpg").await.unwrap(), first);

    let stored = h.records.read("rec-1").await.unwrap().unwrap();
    assert_eq!(stored.status, MigrationStatus::Copied);
    assert!(stored.error.is_none());
}

#[tokio::test]
async fn test_copied_record_never_regresses_on_failed_redelivery() {
    let h = harness().await;
    let event = RecordChangeEvent::created(record());
    h.service.on_record_change(&event).await.unwrap();
    h.storage
        .delete_if_exists("legacy", "uploads/abc.jpg")
        .await
        .unwrap();

    let report = h.service.on_record_change(&event).await.unwrap();
    assert_eq!(
        report.outcome,
        CopyOutcome::AlreadyMigrated {
            destination_path: "migrated/c1.jpg".into()
        }
    );

    let stored = h.records.read("rec-1").await.unwrap().unwrap();
    assert_eq!(stored.status, MigrationStatus::Copied);
    assert_eq!(stored.destination_path.as_deref(), Some("migrated/c1.jpg"));
    assert!(stored.error.is_none());
}

#[tokio::test]
async fn test_own_status_write_does_not_copy_again() {
    let h = harness().await;
    h.service
        .on_record_change(&RecordChangeEvent::created(record()))
        .await
        .unwrap();
    let after = h.records.read("rec-1").await.unwrap().unwrap();

    let report = h
        .service
        .on_record_change(&RecordChangeEvent::updated(record(), after))
        .await
        .unwrap();
    assert!(matches!(report.outcome, CopyOutcome::Ignored(_)));
}

#[tokio::test]
async fn test_upload_proceeds_to_rounded_card() {
    let h = harness().await;
    h.service
        .on_record_change(&RecordChangeEvent::created(record()))
        .await
        .unwrap();

    let event = finalized(&h.storage, "photos", "migrated/c1.jpg").await;
    assert!(!event.metadata.is_processed());
    let report = h.service.on_object_finalize(&event).await.unwrap();

    let transformed = match report {
        FinalizeReport::Transformed(transformed) => transformed,
        other => panic!("expected Transformed, got {:?}", other),
    };
    assert_eq!(transformed.variant_path, "rounded-corners/u1/abc.jpg");
    assert_eq!(transformed.normalized_path, "tmp-converted/u1/abc.jpg");

    let card = h.storage.read("photos", "rounded-corners/u1/abc.jpg").await.unwrap();
    let card = image::load_from_memory(&card).unwrap().to_rgba8();
    assert_eq!(card.dimensions(), (72, 72));
    assert_eq!(card.get_pixel(0, 0)[3], 0);

    assert!(matches!(
        h.storage.read("photos", "migrated/c1.jpg").await,
        Err(StorageError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_derivative_finalize_redirects_to_record() {
    let h = harness().await;
    h.storage
        .write_with_metadata(
            "photos",
            "rounded-corners/u1/c1.png",
            Bytes::from_static(b"png"),
            "image/png",
            &metadata(&[
                ("id", "rec-1"),
                ("type", "PRODUCT"),
                ("user", "u1"),
                ("processed", "true"),
            ]),
        )
        .await
        .unwrap();

    let event = finalized(&h.storage, "photos", "rounded-corners/u1/c1.png").await;
    let report = h.service.on_object_finalize(&event).await.unwrap();
    assert!(matches!(report, FinalizeReport::Redirected(_)));

    let stored = h.records.read("rec-1").await.unwrap().unwrap();
    assert_eq!(
        stored.converted_file_name.as_deref(),
        Some("rounded-corners/u1/c1.png")
    );
    assert!(stored.migrated);
    // No transform ran: nothing was normalized
    assert!(matches!(
        h.storage.read("photos", "tmp-converted/u1/c1.png").await,
        Err(StorageError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_missing_id_is_skipped_without_mutation() {
    let h = harness().await;
    h.storage
        .write_with_metadata(
            "photos",
            "migrated/c1.jpg",
            jpeg(20, 20),
            "image/jpeg",
            &metadata(&[("type", "PRODUCT"), ("user", "u1")]),
        )
        .await
        .unwrap();
    let before = h.records.read("rec-1").await.unwrap().unwrap();

    let event = finalized(&h.storage, "photos", "migrated/c1.jpg").await;
    let report = h.service.on_object_finalize(&event).await.unwrap();
    assert_eq!(
        report,
        FinalizeReport::Skipped(SkipReason::InvalidMetadata(MetadataError::Missing("id")))
    );

    assert_eq!(h.records.read("rec-1").await.unwrap().unwrap(), before);
    assert!(h.storage.read("photos", "migrated/c1.jpg").await.is_ok());
}

#[tokio::test]
async fn test_full_chain_settles_on_record() {
    let h = harness().await;
    h.service
        .on_record_change(&RecordChangeEvent::created(record()))
        .await
        .unwrap();

    let upload = finalized(&h.storage, "photos", "migrated/c1.jpg").await;
    let FinalizeReport::Transformed(transformed) =
        h.service.on_object_finalize(&upload).await.unwrap()
    else {
        panic!("upload was not transformed");
    };

    // The pipeline's own writes come back as a Skip and a Redirect
    let temp = finalized(&h.storage, "photos", &transformed.normalized_path).await;
    assert_eq!(
        h.service.on_object_finalize(&temp).await.unwrap(),
        FinalizeReport::Skipped(SkipReason::ProcessedElsewhere)
    );
    let variant = finalized(&h.storage, "photos", &transformed.variant_path).await;
    assert!(matches!(
        h.service.on_object_finalize(&variant).await.unwrap(),
        FinalizeReport::Redirected(_)
    ));

    let stored = h.records.read("rec-1").await.unwrap().unwrap();
    assert_eq!(stored.status, MigrationStatus::Copied);
    assert_eq!(
        stored.converted_file_name.as_deref(),
        Some("rounded-corners/u1/abc.jpg")
    );
    assert!(stored.migrated);
    assert!(stored.transform_error.is_none());
}

#[tokio::test]
async fn test_undecodable_upload_records_transform_error() {
    let h = harness().await;
    h.storage
        .write_with_metadata(
            "photos",
            "migrated/c1.jpg",
            Bytes::from_static(b"garbage"),
            "image/jpeg",
            &metadata(&[("id", "rec-1"), ("type", "PRODUCT"), ("user", "u1")]),
        )
        .await
        .unwrap();

    let event = finalized(&h.storage, "photos", "migrated/c1.jpg").await;
    let report = h.service.on_object_finalize(&event).await.unwrap();
    assert!(matches!(report, FinalizeReport::TransformFailed { .. }));

    let stored = h.records.read("rec-1").await.unwrap().unwrap();
    assert!(stored.transform_error.is_some());
    assert_eq!(stored.status, MigrationStatus::Pending);
}
