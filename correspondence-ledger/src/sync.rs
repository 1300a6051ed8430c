//! Idempotent import of externally-sourced event batches.
//!
//! Uniqueness keys per kind:
//! - status: correspondence, status, actor, occurrence truncated to the second
//! - notification: correspondence, channel, reminder flag, sent-at truncated to the second
//! - forwarding: correspondence, forwarding party, exact forwarded-at
//! - delete: correspondence, event type, actor, exact occurrence
//!
//! Each event in a batch is evaluated on its own; a rejected event never
//! aborts the rest of the batch.

use crate::error::{LedgerError, LedgerResult};
use correspondence_storage::{CorrespondenceStore, InsertOutcome, StorageResult};
use correspondence_types::{
    CorrespondenceId, CorrespondenceStatus, DeleteEvent, ForwardingEvent, NotificationEvent,
    StatusEvent, SyncBatch,
};
use serde::Serialize;
use tracing::{debug, info};

/// What happened to one event of a sync batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "reason", rename_all = "snake_case")]
pub enum EventOutcome {
    Created,
    DuplicateIgnored,
    Rejected(String),
}

impl From<InsertOutcome> for EventOutcome {
    fn from(outcome: InsertOutcome) -> Self {
        match outcome {
            InsertOutcome::Created => Self::Created,
            InsertOutcome::DuplicateIgnored => Self::DuplicateIgnored,
        }
    }
}

/// Per-event outcomes of a batch, in submission order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub correspondence_id: CorrespondenceId,
    pub outcomes: Vec<EventOutcome>,
}

impl SyncReport {
    fn count(&self, pred: impl Fn(&EventOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(o)).count()
    }

    pub fn created(&self) -> usize {
        self.count(|o| matches!(o, EventOutcome::Created))
    }

    pub fn duplicates(&self) -> usize {
        self.count(|o| matches!(o, EventOutcome::DuplicateIgnored))
    }

    pub fn rejected(&self) -> usize {
        self.count(|o| matches!(o, EventOutcome::Rejected(_)))
    }

    /// Indices of events that produced a new row.
    pub fn created_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.outcomes
            .iter()
            .enumerate()
            .filter(|(_, o)| matches!(o, EventOutcome::Created))
            .map(|(i, _)| i)
    }
}

/// Imports historical/sync batches with insert-or-ignore semantics.
#[derive(Clone)]
pub struct SyncDeduplicator {
    store: CorrespondenceStore,
}

impl SyncDeduplicator {
    pub fn new(store: CorrespondenceStore) -> Self {
        Self { store }
    }

    pub fn sync_status_events(&self, batch: &SyncBatch<StatusEvent>) -> LedgerResult<SyncReport> {
        self.run("status", batch, |e| e.correspondence_id, |store, event| {
            if !is_syncable_status(event.status) {
                return Ok(EventOutcome::Rejected(format!(
                    "status {} cannot be synced",
                    event.status
                )));
            }
            Ok(store.insert_status_event(event)?.into())
        })
    }

    pub fn sync_notification_events(
        &self,
        batch: &SyncBatch<NotificationEvent>,
    ) -> LedgerResult<SyncReport> {
        self.run("notification", batch, |e| e.correspondence_id, |store, event| {
            Ok(store.insert_notification_event(event)?.into())
        })
    }

    pub fn sync_forwarding_events(&self, batch: &SyncBatch<ForwardingEvent>) -> LedgerResult<SyncReport> {
        self.run("forwarding", batch, |e| e.correspondence_id, |store, event| {
            Ok(store.insert_forwarding_event(event)?.into())
        })
    }

    /// Delete events also append the matching status. A purge on an already
    /// purged correspondence is reported as a duplicate and writes nothing.
    pub fn sync_delete_events(&self, batch: &SyncBatch<DeleteEvent>) -> LedgerResult<SyncReport> {
        self.run("delete", batch, |e| e.correspondence_id, |store, event| {
            if event.event_type.is_purge() && store.is_purged(&event.correspondence_id)? {
                return Ok(EventOutcome::DuplicateIgnored);
            }
            let outcome = store.insert_delete_event(event)?;
            if outcome.is_created() {
                let mut status =
                    StatusEvent::new(event.correspondence_id, event.event_type.status(), event.occurred_at);
                status.actor_party = event.actor_party;
                store.insert_status_event(&status)?;
            }
            Ok(outcome.into())
        })
    }

    fn run<E>(
        &self,
        kind: &'static str,
        batch: &SyncBatch<E>,
        owner: impl Fn(&E) -> CorrespondenceId,
        apply: impl Fn(&CorrespondenceStore, &E) -> StorageResult<EventOutcome>,
    ) -> LedgerResult<SyncReport> {
        if batch.events.is_empty() {
            return Err(LedgerError::Validation(format!(
                "{kind} sync request for {} contains no events",
                batch.correspondence_id
            )));
        }
        if !self.store.correspondence_exists(&batch.correspondence_id)? {
            return Err(LedgerError::correspondence_not_found(&batch.correspondence_id));
        }

        let mut outcomes = Vec::with_capacity(batch.events.len());
        for event in &batch.events {
            let outcome = if owner(event) != batch.correspondence_id {
                EventOutcome::Rejected(format!(
                    "event belongs to correspondence {}",
                    owner(event)
                ))
            } else {
                apply(&self.store, event)?
            };
            debug!(correspondence_id = %batch.correspondence_id, kind, ?outcome, "sync event applied");
            outcomes.push(outcome);
        }

        let report = SyncReport {
            correspondence_id: batch.correspondence_id,
            outcomes,
        };
        info!(
            correspondence_id = %report.correspondence_id,
            kind,
            created = report.created(),
            duplicates = report.duplicates(),
            rejected = report.rejected(),
            "sync batch processed"
        );
        Ok(report)
    }
}

/// Statuses accepted through status sync. Delete-family statuses arrive as
/// delete events.
fn is_syncable_status(status: CorrespondenceStatus) -> bool {
    !status.is_pre_publication() && !status.is_delete_family()
}
