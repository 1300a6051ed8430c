//! Append-only status history.

use super::CorrespondenceStore;
use crate::InsertOutcome;
use crate::error::{StorageError, StorageResult};
use crate::keys::{from_micros, optional_key, parse_optional_key, second_bucket, to_micros};
use correspondence_types::{CorrespondenceId, CorrespondenceStatus, StatusEvent};
use duckdb::params;

const SELECT_COLUMNS: &str =
    "SELECT correspondence_id, status, occurred_micros, actor_key, attachment_key, note FROM status_events";

const PURGE_FIRST: &str =
    "CASE WHEN status IN ('PurgedByRecipient', 'PurgedByAltinn') THEN 0 ELSE 1 END";

struct StatusRow {
    correspondence_id: String,
    status: String,
    occurred_micros: i64,
    actor_key: String,
    attachment_key: String,
    note: Option<String>,
}

impl StatusRow {
    fn from_row(row: &duckdb::Row<'_>) -> duckdb::Result<Self> {
        Ok(Self {
            correspondence_id: row.get(0)?,
            status: row.get(1)?,
            occurred_micros: row.get(2)?,
            actor_key: row.get(3)?,
            attachment_key: row.get(4)?,
            note: row.get(5)?,
        })
    }

    fn into_event(self) -> StorageResult<StatusEvent> {
        let corrupt = |e: &dyn std::fmt::Display| StorageError::corrupt("status_events", e);
        Ok(StatusEvent {
            correspondence_id: self.correspondence_id.parse().map_err(|e| corrupt(&e))?,
            status: self.status.parse().map_err(|e| corrupt(&e))?,
            occurred_at: from_micros(self.occurred_micros)
                .ok_or_else(|| corrupt(&format!("timestamp out of range: {}", self.occurred_micros)))?,
            actor_party: parse_optional_key(&self.actor_key).map_err(|e| corrupt(&e))?,
            attachment_id: parse_optional_key(&self.attachment_key).map_err(|e| corrupt(&e))?,
            note: self.note,
        })
    }
}

impl CorrespondenceStore {
    /// Insert a status event unless one with the same key (status, actor,
    /// attachment and occurrence second) already exists.
    pub fn insert_status_event(&self, event: &StatusEvent) -> StorageResult<InsertOutcome> {
        let conn = self.lock_conn();
        let changed = conn.execute(
            r#"
            INSERT OR IGNORE INTO status_events (
                correspondence_id, status, occurred_micros, occurred_second,
                actor_key, attachment_key, note
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                event.correspondence_id.to_string(),
                event.status.as_str(),
                to_micros(&event.occurred_at),
                second_bucket(&event.occurred_at),
                optional_key(event.actor_party.as_ref()),
                optional_key(event.attachment_id.as_ref()),
                event.note,
            ],
        )?;
        Ok(InsertOutcome::from_changes(changed))
    }

    /// Full history ordered by occurrence, ties broken by insertion order.
    pub fn status_history(&self, id: &CorrespondenceId) -> StorageResult<Vec<StatusEvent>> {
        let conn = self.lock_conn();
        let mut stmt = conn.prepare(&format!(
            "{SELECT_COLUMNS} WHERE correspondence_id = ? ORDER BY occurred_micros, seq"
        ))?;
        let rows = stmt
            .query_map(params![id.to_string()], StatusRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(StatusRow::into_event).collect()
    }

    /// The event with the latest occurrence; the later insert wins a tie.
    /// A purge is terminal: once recorded it stays latest even when history
    /// with a later occurrence arrives afterwards.
    pub fn latest_status_event(&self, id: &CorrespondenceId) -> StorageResult<Option<StatusEvent>> {
        self.latest_matching(id, "")
    }

    /// Latest event whose status is not bookkeeping-only.
    pub fn latest_visible_status_event(&self, id: &CorrespondenceId) -> StorageResult<Option<StatusEvent>> {
        self.latest_matching(id, "AND status NOT IN ('Fetched', 'AttachmentsDownloaded')")
    }

    fn latest_matching(&self, id: &CorrespondenceId, filter: &str) -> StorageResult<Option<StatusEvent>> {
        let conn = self.lock_conn();
        let result = conn.query_row(
            &format!(
                "{SELECT_COLUMNS} WHERE correspondence_id = ? {filter} \
                 ORDER BY {PURGE_FIRST}, occurred_micros DESC, seq DESC LIMIT 1"
            ),
            params![id.to_string()],
            StatusRow::from_row,
        );
        match result {
            Ok(row) => row.into_event().map(Some),
            Err(duckdb::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Number of recorded events with the given status.
    pub fn count_status(&self, id: &CorrespondenceId, status: CorrespondenceStatus) -> StorageResult<i64> {
        let conn = self.lock_conn();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM status_events WHERE correspondence_id = ? AND status = ?",
            params![id.to_string(), status.as_str()],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    pub fn has_status(&self, id: &CorrespondenceId, status: CorrespondenceStatus) -> StorageResult<bool> {
        Ok(self.count_status(id, status)? > 0)
    }

    /// Whether any purge status has been recorded.
    pub fn is_purged(&self, id: &CorrespondenceId) -> StorageResult<bool> {
        let conn = self.lock_conn();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM status_events WHERE correspondence_id = ? \
             AND status IN ('PurgedByRecipient', 'PurgedByAltinn')",
            params![id.to_string()],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}
