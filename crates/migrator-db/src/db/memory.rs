//! In-process record store.

use super::MigrationRecordStore;
use async_trait::async_trait;
use migrator_core::{AppError, MigrationRecord, RecordUpdate};
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct InMemoryRecordStore {
    records: RwLock<HashMap<String, MigrationRecord>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a record.
    pub async fn insert(&self, record: MigrationRecord) {
        self.records.write().await.insert(record.id.clone(), record);
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl MigrationRecordStore for InMemoryRecordStore {
    async fn read(&self, id: &str) -> Result<Option<MigrationRecord>, AppError> {
        Ok(self.records.read().await.get(id).cloned())
    }

    async fn update(&self, id: &str, update: &RecordUpdate) -> Result<(), AppError> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(id)
            .ok_or_else(|| AppError::NotFound(id.to_string()))?;
        update.apply_to(record);
        tracing::debug!(record_id = %id, "Record updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use migrator_core::{MigrationStatus, PhotoType};

    #[tokio::test]
    async fn test_update_merges_fields() {
        let store = InMemoryRecordStore::new();
        store
            .insert(MigrationRecord::new("rec-1", "c1", PhotoType::Product, "uploads/a.jpg", "u1"))
            .await;

        store
            .update("rec-1", &RecordUpdate::copied("migrated/c1.jpg", Utc::now()))
            .await
            .unwrap();

        let record = store.read("rec-1").await.unwrap().unwrap();
        assert_eq!(record.status, MigrationStatus::Copied);
        assert_eq!(record.destination_path.as_deref(), Some("migrated/c1.jpg"));
        assert_eq!(record.source_path, "uploads/a.jpg");
    }

    #[tokio::test]
    async fn test_update_missing_record_is_not_found() {
        let store = InMemoryRecordStore::new();
        let result = store
            .update("nope", &RecordUpdate::copy_failed("x", Utc::now()))
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert!(store.read("nope").await.unwrap().is_none());
        assert!(store.is_empty().await);
    }
}
