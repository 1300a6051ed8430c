//! Notification events.

use super::CorrespondenceStore;
use crate::InsertOutcome;
use crate::error::{StorageError, StorageResult};
use crate::keys::{from_micros, second_bucket, to_micros};
use correspondence_types::{CorrespondenceId, NotificationEvent};
use duckdb::params;

impl CorrespondenceStore {
    /// Insert unless a notification with the same channel, reminder flag and
    /// sent-second exists. The address is not part of the key.
    pub fn insert_notification_event(&self, event: &NotificationEvent) -> StorageResult<InsertOutcome> {
        let conn = self.lock_conn();
        let changed = conn.execute(
            r#"
            INSERT OR IGNORE INTO notification_events (
                correspondence_id, channel, address, sent_micros, sent_second,
                is_reminder, source_notification_id
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                event.correspondence_id.to_string(),
                event.channel.as_str(),
                event.address,
                to_micros(&event.sent_at),
                second_bucket(&event.sent_at),
                event.is_reminder,
                event.source_notification_id,
            ],
        )?;
        Ok(InsertOutcome::from_changes(changed))
    }

    pub fn notification_events(&self, id: &CorrespondenceId) -> StorageResult<Vec<NotificationEvent>> {
        let conn = self.lock_conn();
        let mut stmt = conn.prepare(
            "SELECT channel, address, sent_micros, is_reminder, source_notification_id \
             FROM notification_events WHERE correspondence_id = ? ORDER BY sent_micros, seq",
        )?;
        let rows = stmt
            .query_map(params![id.to_string()], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, bool>(3)?,
                    row.get::<_, Option<i64>>(4)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(channel, address, sent_micros, is_reminder, source_notification_id)| {
                Ok(NotificationEvent {
                    correspondence_id: *id,
                    channel: channel
                        .parse()
                        .map_err(|e| StorageError::corrupt("notification_events", e))?,
                    address,
                    sent_at: from_micros(sent_micros).ok_or_else(|| {
                        StorageError::corrupt("notification_events", "sent timestamp out of range")
                    })?,
                    is_reminder,
                    source_notification_id,
                })
            })
            .collect()
    }
}
