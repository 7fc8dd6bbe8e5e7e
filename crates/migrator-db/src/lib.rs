//! Migrator DB Library
//!
//! Persistence for migration records: the `MigrationRecordStore` trait, a
//! PostgreSQL repository and an in-memory store.

pub mod db;

pub use db::{
    create_record_store, InMemoryRecordStore, MigrationRecordStore, PgMigrationRecordStore,
};
