mod helpers;

use axum::http::StatusCode;
use helpers::{setup_test_app, test_record};
use migrator_core::MigrationStatus;
use migrator_db::MigrationRecordStore;
use migrator_pipeline::RecordChangeEvent;
use migrator_storage::ObjectStorage;
use serde_json::json;

#[tokio::test]
async fn test_record_change_copies_and_acks() {
    let app = setup_test_app().await;
    let client = app.client();

    let event = RecordChangeEvent::created(test_record());
    let response = client.post("/events/record-change").json(&event).await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

    let copied = app.storage.read("photos", "migrated/c1.jpg").await.unwrap();
    assert_eq!(copied.as_ref(), b"legacy bytes");

    let stored = app.records.read("rec-1").await.unwrap().unwrap();
    assert_eq!(stored.status, MigrationStatus::Copied);
}

#[tokio::test]
async fn test_failed_copy_still_acks() {
    let app = setup_test_app().await;
    let client = app.client();

    let mut record = test_record();
    record.source_path = "uploads/missing.jpg".to_string();
    let response = client
        .post("/events/record-change")
        .json(&RecordChangeEvent::created(record))
        .await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

    let stored = app.records.read("rec-1").await.unwrap().unwrap();
    assert_eq!(stored.status, MigrationStatus::CopyError);
    assert!(stored.error.is_some());
}

#[tokio::test]
async fn test_object_finalize_acks_skipped_object() {
    let app = setup_test_app().await;
    let client = app.client();

    let response = client
        .post("/events/object-finalize")
        .json(&json!({
            "bucket": "photos",
            "name": "migrated/c1.jpg",
            "contentType": "image/jpeg",
            "metadata": {"type": "PRODUCT", "user": "u1"}
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

    // Missing id: nothing is written back
    let stored = app.records.read("rec-1").await.unwrap().unwrap();
    assert!(stored.converted_file_name.is_none());
    assert!(stored.transform_error.is_none());
}

#[tokio::test]
async fn test_malformed_body_is_rejected() {
    let app = setup_test_app().await;
    let client = app.client();

    let response = client
        .post("/events/object-finalize")
        .json(&json!({"bucket": 5}))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "INVALID_EVENT_BODY");
    assert!(body["error"].as_str().unwrap().starts_with("Invalid event body"));
}

#[tokio::test]
async fn test_health_reports_backends() {
    let app = setup_test_app().await;
    let client = app.client();

    let response = client.get("/health").await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["storage"], "memory");
    assert_eq!(body["database"], "disabled");
}
