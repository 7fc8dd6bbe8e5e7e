//! Migrator Core Library
//!
//! This crate provides the domain models, error types and configuration shared by
//! every migrator component: the migration record, the object metadata wire shape,
//! the photo type tag set and the environment-driven configuration.

pub mod config;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{Config, DirectoryLayout, LogFormat, VariantSizes};
pub use error::{AppError, LogLevel};
pub use models::{
    IdentifyingMetadata, MetadataError, MigrationRecord, MigrationStatus, ObjectMetadata,
    PhotoType, RecordPathField, RecordUpdate,
};
pub use storage_types::{RecordStoreBackend, StorageBackend};
