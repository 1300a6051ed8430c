//! Correspondence status ledger and sync deduplication.
//!
//! - [`StatusLedger`] appends interactive status changes after checking the
//!   transition rules, and derives the current status from the history
//! - [`SyncDeduplicator`] imports historical batches with insert-or-ignore
//!   semantics so replays are harmless
//! - [`IdempotencyKeyRegistry`] mints one stable external operation id per
//!   logical side effect

pub mod error;
mod ledger;
mod registry;
mod sync;
pub mod transitions;

pub use correspondence_storage::InsertOutcome;
pub use error::{LedgerError, LedgerResult};
pub use ledger::{Retrieval, StatusLedger};
pub use registry::{DialogKeys, IdempotencyKeyRegistry};
pub use sync::{EventOutcome, SyncDeduplicator, SyncReport};
pub use transitions::{StatusFacts, TransitionViolation};
