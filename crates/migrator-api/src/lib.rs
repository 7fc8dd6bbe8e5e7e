//! Migrator API Library
//!
//! The event receiver: push endpoints for record-change and object-finalize
//! deliveries, a health check, and application bootstrap.

pub mod error;
pub mod handlers;
pub mod setup;
pub mod state;
pub mod telemetry;

pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;
