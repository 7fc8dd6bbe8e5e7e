//! Error types module
//!
//! Every failure the pipeline can hit folds into `MigrationError`, and every
//! `MigrationError` classifies into one `ErrorKind` with a stable code for logs.

use migrator_core::{AppError, LogLevel, MetadataError, PhotoType};
use migrator_processing::ProcessingError;
use migrator_storage::StorageError;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Object metadata unusable; the event is skipped.
    Validation,
    /// Cross-bucket copy failed; persisted as `copy_error`.
    Copy,
    /// Derivative processing failed; persisted to `transformError`.
    Transform,
    /// The record store rejected a read or update.
    Record,
    /// The invocation ran out of its time budget.
    Timeout,
}

impl ErrorKind {
    pub fn error_code(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "METADATA_PARAMS_EMPTY_ERROR",
            ErrorKind::Copy => "MIGRATION_FILE_COPY_ERROR",
            ErrorKind::Transform => "IMAGE_MIGRATION_PROCESSING_ERROR",
            ErrorKind::Record => "MIGRATION_RECORD_UPDATE_ERROR",
            ErrorKind::Timeout => "INVOCATION_TIMEOUT",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("Invalid object metadata: {0}")]
    Validation(#[from] MetadataError),

    #[error("Copy failed: {0}")]
    Copy(#[source] StorageError),

    #[error("Destination {0} already holds an object of another record")]
    DestinationConflict(String),

    #[error("Storage operation failed: {0}")]
    Storage(#[source] StorageError),

    #[error("Image processing failed: {0}")]
    Processing(#[from] ProcessingError),

    #[error("No recipe for photo type {0}")]
    NoRecipe(PhotoType),

    #[error("Blocking task failed: {0}")]
    Task(String),

    #[error("Record store error: {0}")]
    Record(#[from] AppError),

    #[error("Invocation exceeded its {}s budget", .0.as_secs())]
    Timeout(Duration),
}

impl MigrationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MigrationError::Validation(_) => ErrorKind::Validation,
            MigrationError::Copy(_) | MigrationError::DestinationConflict(_) => ErrorKind::Copy,
            MigrationError::Storage(_)
            | MigrationError::Processing(_)
            | MigrationError::NoRecipe(_)
            | MigrationError::Task(_) => ErrorKind::Transform,
            MigrationError::Record(_) => ErrorKind::Record,
            MigrationError::Timeout(_) => ErrorKind::Timeout,
        }
    }

    /// Machine-readable error code (e.g., "MIGRATION_FILE_COPY_ERROR")
    pub fn error_code(&self) -> &'static str {
        self.kind().error_code()
    }

    pub fn log_level(&self) -> LogLevel {
        match self.kind() {
            ErrorKind::Validation => LogLevel::Warn,
            ErrorKind::Record => match self {
                MigrationError::Record(err) => err.log_level(),
                _ => LogLevel::Error,
            },
            ErrorKind::Copy | ErrorKind::Transform | ErrorKind::Timeout => LogLevel::Error,
        }
    }

    /// Emit this error at its log level with its code.
    pub fn log(&self, message: &str) {
        let code = self.error_code();
        match self.log_level() {
            LogLevel::Debug => tracing::debug!(error = %self, error_code = code, "{}", message),
            LogLevel::Warn => tracing::warn!(error = %self, error_code = code, "{}", message),
            LogLevel::Error => tracing::error!(error = %self, error_code = code, "{}", message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_and_codes() {
        let err = MigrationError::from(MetadataError::Missing("id"));
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.error_code(), "METADATA_PARAMS_EMPTY_ERROR");
        assert_eq!(err.log_level(), LogLevel::Warn);

        let err = MigrationError::Copy(StorageError::PreconditionFailed("src/a.jpg".into()));
        assert_eq!(err.error_code(), "MIGRATION_FILE_COPY_ERROR");
        assert_eq!(
            MigrationError::DestinationConflict("migrated/c1.jpg".into()).kind(),
            ErrorKind::Copy
        );

        let err = MigrationError::Storage(StorageError::NotFound("dst/migrated/c1.jpg".into()));
        assert_eq!(err.error_code(), "IMAGE_MIGRATION_PROCESSING_ERROR");
        assert_eq!(
            MigrationError::Processing(ProcessingError::Decode("bad".into())).kind(),
            ErrorKind::Transform
        );

        let err = MigrationError::from(AppError::NotFound("rec-1".into()));
        assert_eq!(err.kind(), ErrorKind::Record);
        assert_eq!(err.log_level(), LogLevel::Warn);
    }

    #[test]
    fn test_timeout_display() {
        let err = MigrationError::Timeout(Duration::from_secs(240));
        assert_eq!(err.kind(), ErrorKind::Timeout);
        assert_eq!(err.to_string(), "Invocation exceeded its 240s budget");
    }
}
