//! Migrator Storage Library
//!
//! Object storage abstraction used by the migration pipeline. The `ObjectStorage`
//! trait addresses objects by `(bucket, key)` and exposes the custom metadata and
//! generation preconditions the copy protocol relies on.
//!
//! # Key format
//!
//! Keys are plain `/`-separated paths without a leading `/`. Directory checks and
//! file-name extraction live in the `keys` module so every caller agrees on them.

pub mod bucket;
pub mod factory;
pub mod keys;
pub mod lazy;
pub mod traits;

// Re-export commonly used types
pub use bucket::BucketStorage;
pub use factory::create_storage;
pub use lazy::LazyStorage;
pub use migrator_core::StorageBackend;
pub use traits::{
    ObjectGeneration, ObjectStorage, Precondition, StorageError, StorageResult, StoredMetadata,
};
