//! Delete events (soft delete, restore, purge).

use super::CorrespondenceStore;
use crate::InsertOutcome;
use crate::error::{StorageError, StorageResult};
use crate::keys::{from_micros, optional_key, parse_optional_key, to_micros};
use correspondence_types::{CorrespondenceId, DeleteEvent, DeleteEventType, PartyId};
use duckdb::params;

impl CorrespondenceStore {
    /// Insert unless an event with the same type, actor and exact instant exists.
    pub fn insert_delete_event(&self, event: &DeleteEvent) -> StorageResult<InsertOutcome> {
        let conn = self.lock_conn();
        let changed = conn.execute(
            r#"
            INSERT OR IGNORE INTO delete_events (
                correspondence_id, event_type, occurred_micros, actor_key
            ) VALUES (?, ?, ?, ?)
            "#,
            params![
                event.correspondence_id.to_string(),
                event.event_type.as_str(),
                to_micros(&event.occurred_at),
                optional_key(event.actor_party.as_ref()),
            ],
        )?;
        Ok(InsertOutcome::from_changes(changed))
    }

    pub fn delete_events(&self, id: &CorrespondenceId) -> StorageResult<Vec<DeleteEvent>> {
        let conn = self.lock_conn();
        let mut stmt = conn.prepare(
            "SELECT event_type, occurred_micros, actor_key FROM delete_events \
             WHERE correspondence_id = ? ORDER BY occurred_micros, seq",
        )?;
        let rows = stmt
            .query_map(params![id.to_string()], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(event_type, micros, actor_key)| {
                let corrupt = |reason: String| StorageError::corrupt("delete_events", reason);
                Ok(DeleteEvent {
                    correspondence_id: *id,
                    event_type: event_type
                        .parse::<DeleteEventType>()
                        .map_err(|e| corrupt(e.to_string()))?,
                    occurred_at: from_micros(micros)
                        .ok_or_else(|| corrupt(format!("timestamp out of range: {micros}")))?,
                    actor_party: parse_optional_key::<PartyId>(&actor_key).map_err(|e| corrupt(e.to_string()))?,
                })
            })
            .collect()
    }

    /// The most recent soft-delete or restore, if any.
    pub fn latest_bin_event(&self, id: &CorrespondenceId) -> StorageResult<Option<DeleteEventType>> {
        let conn = self.lock_conn();
        let result = conn.query_row(
            "SELECT status FROM status_events WHERE correspondence_id = ? \
             AND status IN ('SoftDeletedByRecipient', 'RestoredByRecipient') \
             ORDER BY occurred_micros DESC, seq DESC LIMIT 1",
            params![id.to_string()],
            |row| row.get::<_, String>(0),
        );
        match result {
            Ok(raw) => raw
                .parse::<DeleteEventType>()
                .map(Some)
                .map_err(|e| StorageError::corrupt("status_events", e)),
            Err(duckdb::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
