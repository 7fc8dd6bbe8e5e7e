//! Configuration module
//!
//! Environment-driven configuration for the migrator: bucket names, directory
//! layout, derivative sizes, backend selection and invocation time budgets.
//! `.env` files are honoured through dotenvy.

use std::env;
use std::time::Duration;

use crate::storage_types::{RecordStoreBackend, StorageBackend};

const DEFAULT_PORT: u16 = 8080;
const MAX_CONNECTIONS: u32 = 10;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const COPY_TIMEOUT_SECS: u64 = 240;
const TRANSFORM_TIMEOUT_SECS: u64 = 540;

const PHOTO_SIZE_CIRCLE: u32 = 400;
const PHOTO_SIZE_PRODUCT: u32 = 600;
const PHOTO_SIZE_REPRESENTATIVE: u32 = 300;

/// Directory prefixes inside the buckets.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirectoryLayout {
    /// Copy destination directory.
    pub destination_dir: String,
    /// Objects under this prefix, not yet processed, are transformed.
    pub upload_dir: String,
    pub temp_convert_dir: String,
    pub circle_dir: String,
    pub rounded_dir: String,
    pub representative_dir: String,
}

impl Default for DirectoryLayout {
    fn default() -> Self {
        Self {
            destination_dir: "migrated".to_string(),
            upload_dir: "migrated".to_string(),
            temp_convert_dir: "tmp-converted".to_string(),
            circle_dir: "circle".to_string(),
            rounded_dir: "rounded-corners".to_string(),
            representative_dir: "representative".to_string(),
        }
    }
}

/// Target sizes in pixels for each derivative kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VariantSizes {
    pub circle: u32,
    pub product: u32,
    pub representative: u32,
}

impl Default for VariantSizes {
    fn default() -> Self {
        Self {
            circle: PHOTO_SIZE_CIRCLE,
            product: PHOTO_SIZE_PRODUCT,
            representative: PHOTO_SIZE_REPRESENTATIVE,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    environment: String,
    server_port: u16,
    source_bucket: String,
    destination_bucket: String,
    watched_bucket: String,
    layout: DirectoryLayout,
    sizes: VariantSizes,
    storage_backend: StorageBackend,
    s3_region: Option<String>,
    s3_endpoint: Option<String>,
    record_store_backend: RecordStoreBackend,
    database_url: Option<String>,
    db_max_connections: u32,
    db_timeout_seconds: u64,
    copy_timeout_secs: u64,
    transform_timeout_secs: u64,
    log_format: LogFormat,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable source. `from_env` passes the process
    /// environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let environment = var("ENVIRONMENT")
            .or_else(|| var("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let server_port = match var("PORT") {
            Some(port) => port
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            None => DEFAULT_PORT,
        };

        let source_bucket = var("SOURCE_BUCKET_ID")
            .ok_or_else(|| anyhow::anyhow!("SOURCE_BUCKET_ID must be set"))?;
        let destination_bucket = var("DESTINATION_BUCKET_ID")
            .ok_or_else(|| anyhow::anyhow!("DESTINATION_BUCKET_ID must be set"))?;
        let watched_bucket = var("WATCHED_BUCKET_ID").unwrap_or_else(|| destination_bucket.clone());

        let defaults = DirectoryLayout::default();
        let destination_dir = var("DESTINATION_BUCKET_DIRECTORY")
            .map(|d| trim_dir(&d))
            .unwrap_or(defaults.destination_dir);
        let layout = DirectoryLayout {
            upload_dir: var("UPLOAD_DIRECTORY")
                .map(|d| trim_dir(&d))
                .unwrap_or_else(|| destination_dir.clone()),
            destination_dir,
            temp_convert_dir: var("TMP_CONVERTED_DIR")
                .map(|d| trim_dir(&d))
                .unwrap_or(defaults.temp_convert_dir),
            circle_dir: var("TRANSFORM_DIR_CIRCLE")
                .map(|d| trim_dir(&d))
                .unwrap_or(defaults.circle_dir),
            rounded_dir: var("TRANSFORM_DIR_ROUNDED_CORNERS")
                .map(|d| trim_dir(&d))
                .unwrap_or(defaults.rounded_dir),
            representative_dir: var("TRANSFORM_SM_IMAGE")
                .map(|d| trim_dir(&d))
                .unwrap_or(defaults.representative_dir),
        };

        let sizes = VariantSizes {
            circle: parse_or(var("PHOTO_SIZE_CIRCLE"), "PHOTO_SIZE_CIRCLE", PHOTO_SIZE_CIRCLE)?,
            product: parse_or(
                var("PHOTO_SIZE_PRODUCT"),
                "PHOTO_SIZE_PRODUCT",
                PHOTO_SIZE_PRODUCT,
            )?,
            representative: parse_or(
                var("PHOTO_SIZE_REPRESENTATIVE"),
                "PHOTO_SIZE_REPRESENTATIVE",
                PHOTO_SIZE_REPRESENTATIVE,
            )?,
        };

        let storage_backend = match var("STORAGE_BACKEND") {
            Some(s) => s.parse::<StorageBackend>()?,
            None => StorageBackend::Gcs,
        };
        let record_store_backend = match var("RECORD_STORE_BACKEND") {
            Some(s) => s.parse::<RecordStoreBackend>()?,
            None => RecordStoreBackend::Postgres,
        };

        let log_format = match var("LOG_FORMAT").map(|s| s.to_lowercase()).as_deref() {
            None | Some("compact") => LogFormat::Compact,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(anyhow::anyhow!(
                    "LOG_FORMAT must be 'compact' or 'json', got '{}'",
                    other
                ))
            }
        };

        let config = Config {
            environment,
            server_port,
            source_bucket,
            destination_bucket,
            watched_bucket,
            layout,
            sizes,
            storage_backend,
            s3_region: var("S3_REGION").or_else(|| var("AWS_REGION")),
            s3_endpoint: var("S3_ENDPOINT"),
            record_store_backend,
            database_url: var("DATABASE_URL"),
            db_max_connections: var("DB_MAX_CONNECTIONS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: var("DB_TIMEOUT_SECONDS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            copy_timeout_secs: var("COPY_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(COPY_TIMEOUT_SECS),
            transform_timeout_secs: var("TRANSFORM_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(TRANSFORM_TIMEOUT_SECS),
            log_format,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.record_store_backend == RecordStoreBackend::Postgres {
            match self.database_url.as_deref() {
                None => {
                    return Err(anyhow::anyhow!(
                        "DATABASE_URL must be set when using the postgres record store"
                    ))
                }
                Some(url) if !(url.starts_with("postgres://") || url.starts_with("postgresql://")) => {
                    return Err(anyhow::anyhow!(
                        "DATABASE_URL must be a valid PostgreSQL connection string"
                    ))
                }
                Some(_) => {}
            }
        }

        if self.storage_backend == StorageBackend::S3 && self.s3_region.is_none() {
            return Err(anyhow::anyhow!(
                "S3_REGION or AWS_REGION must be set when using S3 storage backend"
            ));
        }

        if self.sizes.circle == 0 || self.sizes.product == 0 || self.sizes.representative == 0 {
            return Err(anyhow::anyhow!("PHOTO_SIZE_* values must be greater than zero"));
        }

        let derivative_dirs = [
            &self.layout.temp_convert_dir,
            &self.layout.circle_dir,
            &self.layout.rounded_dir,
            &self.layout.representative_dir,
        ];
        if derivative_dirs.contains(&&self.layout.upload_dir) {
            return Err(anyhow::anyhow!(
                "UPLOAD_DIRECTORY must differ from the temp-convert and derivative directories"
            ));
        }

        if self.copy_timeout_secs == 0 || self.transform_timeout_secs == 0 {
            return Err(anyhow::anyhow!("invocation timeouts must be greater than zero"));
        }

        Ok(())
    }

    pub fn is_production(&self) -> bool {
        matches!(self.environment.to_lowercase().as_str(), "production" | "prod")
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn server_port(&self) -> u16 {
        self.server_port
    }

    pub fn source_bucket(&self) -> &str {
        &self.source_bucket
    }

    pub fn destination_bucket(&self) -> &str {
        &self.destination_bucket
    }

    pub fn watched_bucket(&self) -> &str {
        &self.watched_bucket
    }

    pub fn layout(&self) -> &DirectoryLayout {
        &self.layout
    }

    pub fn sizes(&self) -> VariantSizes {
        self.sizes
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.storage_backend
    }

    pub fn s3_region(&self) -> Option<&str> {
        self.s3_region.as_deref()
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.s3_endpoint.as_deref()
    }

    pub fn record_store_backend(&self) -> RecordStoreBackend {
        self.record_store_backend
    }

    pub fn database_url(&self) -> Option<&str> {
        self.database_url.as_deref()
    }

    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.db_timeout_seconds
    }

    pub fn copy_timeout(&self) -> Duration {
        Duration::from_secs(self.copy_timeout_secs)
    }

    pub fn transform_timeout(&self) -> Duration {
        Duration::from_secs(self.transform_timeout_secs)
    }

    pub fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Every bucket the storage client must be able to reach.
    pub fn buckets(&self) -> Vec<String> {
        let mut buckets = vec![
            self.source_bucket.clone(),
            self.destination_bucket.clone(),
            self.watched_bucket.clone(),
        ];
        buckets.sort();
        buckets.dedup();
        buckets
    }
}

fn trim_dir(dir: &str) -> String {
    dir.trim().trim_matches('/').to_string()
}

fn parse_or(value: Option<String>, key: &str, default: u32) -> Result<u32, anyhow::Error> {
    match value {
        Some(v) => v
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("{} must be a positive integer", key)),
        None => Ok(default),
    }
}
