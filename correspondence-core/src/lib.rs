//! Correspondence lifecycle service.
//!
//! Wires the status ledger, the sync deduplicator and the dialog lifecycle
//! coordinator behind [`CorrespondenceService`]. Local rows are always written
//! before the dialog system is called; a failed mirror call surfaces to the
//! caller and leaves the local state in place.

pub mod config;
pub mod error;
mod service;
mod telemetry;

pub use config::CoreConfig;
pub use error::{CoreError, CoreResult};
pub use service::{CorrespondenceOverview, CorrespondenceService};
pub use telemetry::init_tracing;

pub use correspondence_dialog as dialog;
pub use correspondence_ledger as ledger;
pub use correspondence_storage as storage;
pub use correspondence_types as types;
