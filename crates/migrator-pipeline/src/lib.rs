//! Migrator Pipeline Library
//!
//! The event-driven core. A record change enters the `CopyOrchestrator`, which
//! copies the source image into the destination bucket under a does-not-exist
//! precondition. The resulting object-finalize event is classified by the
//! `IngestGate` as Skip, Redirect or Proceed; Proceed hands the object to the
//! `TransformPipeline`, whose derivative writes come back through the gate as
//! Redirects and land in the record.
//!
//! `MigrationService` wires the three together and bounds each invocation
//! with its time budget.

pub mod copy;
pub mod error;
pub mod events;
pub mod gate;
pub mod service;
pub mod transform;

pub use copy::{CopyOrchestrator, CopyOutcome, CopyReport, IgnoreReason};
pub use error::{ErrorKind, MigrationError};
pub use events::{ObjectFinalizeEvent, RecordChangeEvent};
pub use gate::{GateOutcome, IngestGate, ProceedJob, Redirect, SkipReason};
pub use service::{FinalizeReport, MigrationService};
pub use transform::{TransformPipeline, TransformReport};
