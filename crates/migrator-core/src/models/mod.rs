//! Domain models for image migration.

pub mod metadata;
pub mod photo_type;
pub mod record;

pub use metadata::{IdentifyingMetadata, MetadataError, ObjectMetadata};
pub use photo_type::PhotoType;
pub use record::{MigrationRecord, MigrationStatus, RecordPathField, RecordUpdate};
