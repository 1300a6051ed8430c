//! Forwarding events.

use super::CorrespondenceStore;
use crate::InsertOutcome;
use crate::error::{StorageError, StorageResult};
use crate::keys::{from_micros, to_micros};
use correspondence_types::{CorrespondenceId, ForwardingEvent};
use duckdb::params;

impl CorrespondenceStore {
    /// Insert unless the same party already forwarded at exactly this instant.
    pub fn insert_forwarding_event(&self, event: &ForwardingEvent) -> StorageResult<InsertOutcome> {
        let destination_json = serde_json::to_string(&event.destination)?;
        let conn = self.lock_conn();
        let changed = conn.execute(
            r#"
            INSERT OR IGNORE INTO forwarding_events (
                correspondence_id, forwarded_micros, forwarded_by_party,
                forwarded_by_user, destination_json, note
            ) VALUES (?, ?, ?, ?, ?, ?)
            "#,
            params![
                event.correspondence_id.to_string(),
                to_micros(&event.forwarded_at),
                event.forwarded_by_party.to_string(),
                event.forwarded_by_user,
                destination_json,
                event.note,
            ],
        )?;
        Ok(InsertOutcome::from_changes(changed))
    }

    pub fn forwarding_events(&self, id: &CorrespondenceId) -> StorageResult<Vec<ForwardingEvent>> {
        let conn = self.lock_conn();
        let mut stmt = conn.prepare(
            "SELECT forwarded_micros, forwarded_by_party, forwarded_by_user, destination_json, note \
             FROM forwarding_events WHERE correspondence_id = ? ORDER BY forwarded_micros, seq",
        )?;
        let rows = stmt
            .query_map(params![id.to_string()], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, Option<String>>(4)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(micros, party, user, destination_json, note)| {
                Ok(ForwardingEvent {
                    correspondence_id: *id,
                    forwarded_at: from_micros(micros).ok_or_else(|| {
                        StorageError::corrupt("forwarding_events", "forwarded timestamp out of range")
                    })?,
                    forwarded_by_party: party
                        .parse()
                        .map_err(|e| StorageError::corrupt("forwarding_events", e))?,
                    forwarded_by_user: user,
                    destination: serde_json::from_str(&destination_json)?,
                    note,
                })
            })
            .collect()
    }
}
