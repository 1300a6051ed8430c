//! Append-only status ledger with interactive transition checks.

use crate::error::{LedgerError, LedgerResult};
use crate::transitions::StatusFacts;
use chrono::{DateTime, Utc};
use correspondence_storage::{CorrespondenceStore, InsertOutcome};
use correspondence_types::{
    Correspondence, CorrespondenceId, CorrespondenceStatus, DeleteEvent, DeleteEventType, PartyId,
    StatusEvent,
};
use tracing::{debug, info, warn};

/// Result of a recipient retrieving a correspondence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Retrieval {
    /// `Fetched` on the first retrieval, `Read` afterwards.
    pub appended: CorrespondenceStatus,
    pub outcome: InsertOutcome,
    /// Whether this was the first retrieval ever recorded.
    pub first_retrieval: bool,
    /// Recipient-visible status after the append.
    pub visible_status: CorrespondenceStatus,
}

/// Per-correspondence status history.
///
/// Current status is a projection over the history, never a stored field.
#[derive(Clone)]
pub struct StatusLedger {
    store: CorrespondenceStore,
}

impl StatusLedger {
    pub fn new(store: CorrespondenceStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &CorrespondenceStore {
        &self.store
    }

    /// Loads a correspondence or fails with `NotFound`.
    pub fn correspondence(&self, id: &CorrespondenceId) -> LedgerResult<Correspondence> {
        self.store
            .get_correspondence(id)?
            .ok_or_else(|| LedgerError::correspondence_not_found(id))
    }

    /// Appends an interactive status change after checking the transition
    /// rules.
    ///
    /// Purge requests on an already purged correspondence succeed as
    /// `DuplicateIgnored` without writing anything; every other change to a
    /// purged correspondence is `NotFound`. Delete-family statuses also record
    /// the matching delete event.
    pub fn append_status(&self, event: StatusEvent) -> LedgerResult<InsertOutcome> {
        let correspondence = self.correspondence(&event.correspondence_id)?;
        let facts = StatusFacts::load(&self.store, &correspondence.id)?;

        if facts.purged {
            if event.status.is_purged() {
                debug!(correspondence_id = %correspondence.id, "repeat purge ignored");
                return Ok(InsertOutcome::DuplicateIgnored);
            }
            warn!(
                correspondence_id = %correspondence.id,
                status = %event.status,
                "rejected status change on purged correspondence"
            );
            return Err(LedgerError::correspondence_not_found(&correspondence.id));
        }

        if let Err(violation) = facts.check(event.status, correspondence.is_confirmation_needed) {
            info!(
                correspondence_id = %correspondence.id,
                status = %event.status,
                %violation,
                "rejected status transition"
            );
            return Err(LedgerError::InvalidTransition {
                correspondence_id: correspondence.id,
                to: event.status,
                violation,
            });
        }

        let outcome = self.store.insert_status_event(&event)?;
        if let Some(event_type) = DeleteEventType::from_status(event.status) {
            self.store.insert_delete_event(&DeleteEvent {
                correspondence_id: event.correspondence_id,
                event_type,
                occurred_at: event.occurred_at,
                actor_party: event.actor_party,
            })?;
        }

        debug!(
            correspondence_id = %event.correspondence_id,
            status = %event.status,
            ?outcome,
            "status appended"
        );
        Ok(outcome)
    }

    /// Status of the event with the latest occurrence. Ties on identical
    /// timestamps go to the event inserted last.
    pub fn current_status(&self, id: &CorrespondenceId) -> LedgerResult<CorrespondenceStatus> {
        self.store
            .latest_status_event(id)?
            .map(|e| e.status)
            .ok_or_else(|| LedgerError::correspondence_not_found(id))
    }

    /// Latest status a recipient can see; bookkeeping statuses are skipped.
    pub fn visible_status(&self, id: &CorrespondenceId) -> LedgerResult<CorrespondenceStatus> {
        self.store
            .latest_visible_status_event(id)?
            .map(|e| e.status)
            .ok_or_else(|| LedgerError::correspondence_not_found(id))
    }

    /// Post-deduplication history ordered by occurrence.
    pub fn history(&self, id: &CorrespondenceId) -> LedgerResult<Vec<StatusEvent>> {
        if !self.store.correspondence_exists(id)? {
            return Err(LedgerError::correspondence_not_found(id));
        }
        Ok(self.store.status_history(id)?)
    }

    /// Records a recipient retrieval: `Fetched` the first time, `Read` after.
    ///
    /// Purged and unpublished correspondences are `NotFound` to the recipient.
    pub fn record_retrieval(
        &self,
        id: &CorrespondenceId,
        recipient_party: PartyId,
        at: DateTime<Utc>,
    ) -> LedgerResult<Retrieval> {
        let facts = StatusFacts::load(&self.store, id)?;
        if facts.current.is_none() || facts.purged || !facts.published {
            return Err(LedgerError::correspondence_not_found(id));
        }

        let first_retrieval = !facts.fetched;
        let appended = if first_retrieval {
            CorrespondenceStatus::Fetched
        } else {
            CorrespondenceStatus::Read
        };

        let outcome = self
            .store
            .insert_status_event(&StatusEvent::new(*id, appended, at).by(recipient_party))?;
        let visible_status = self.visible_status(id)?;

        debug!(correspondence_id = %id, %appended, ?outcome, "retrieval recorded");
        Ok(Retrieval {
            appended,
            outcome,
            first_retrieval,
            visible_status,
        })
    }
}
