//! Idempotency keys for mirrored external effects.

use super::CorrespondenceStore;
use crate::InsertOutcome;
use crate::error::{StorageError, StorageResult};
use crate::keys::{from_micros, optional_key, parse_optional_key, to_micros};
use correspondence_types::{IdempotencyKey, KeyScope};
use duckdb::{Connection, params};

impl CorrespondenceStore {
    /// Insert a key unless its scope already has one.
    pub fn insert_idempotency_key(&self, key: &IdempotencyKey) -> StorageResult<InsertOutcome> {
        let conn = self.lock_conn();
        insert_key(&conn, key)
    }

    /// Insert several keys in one transaction. Scopes that already hold a key
    /// are left untouched.
    pub fn insert_idempotency_keys(&self, keys: &[IdempotencyKey]) -> StorageResult<Vec<InsertOutcome>> {
        let conn = self.lock_conn();
        conn.execute_batch("BEGIN TRANSACTION")?;

        let mut outcomes = Vec::with_capacity(keys.len());
        for key in keys {
            match insert_key(&conn, key) {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => {
                    let _ = conn.execute_batch("ROLLBACK");
                    return Err(e);
                }
            }
        }

        conn.execute_batch("COMMIT")?;
        Ok(outcomes)
    }

    pub fn find_idempotency_key(&self, scope: &KeyScope) -> StorageResult<Option<IdempotencyKey>> {
        let conn = self.lock_conn();
        let result = conn.query_row(
            "SELECT id, attachment_key, created_micros FROM idempotency_keys \
             WHERE correspondence_id = ? AND attachment_key = ? AND action = ? AND effect_kind = ?",
            params![
                scope.correspondence_id.to_string(),
                optional_key(scope.attachment_id.as_ref()),
                scope.action.as_str(),
                scope.effect_kind.as_str(),
            ],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)?,
                ))
            },
        );

        let (id, attachment_key, created_micros) = match result {
            Ok(row) => row,
            Err(duckdb::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let corrupt = |reason: String| StorageError::corrupt("idempotency_keys", reason);
        Ok(Some(IdempotencyKey {
            id: id.parse().map_err(|e: uuid::Error| corrupt(e.to_string()))?,
            scope: KeyScope {
                attachment_id: parse_optional_key(&attachment_key)
                    .map_err(|e: uuid::Error| corrupt(e.to_string()))?,
                ..*scope
            },
            created_at: from_micros(created_micros)
                .ok_or_else(|| corrupt(format!("timestamp out of range: {created_micros}")))?,
        }))
    }
}

fn insert_key(conn: &Connection, key: &IdempotencyKey) -> StorageResult<InsertOutcome> {
    let changed = conn.execute(
        r#"
        INSERT OR IGNORE INTO idempotency_keys (
            id, correspondence_id, attachment_key, action, effect_kind, created_micros
        ) VALUES (?, ?, ?, ?, ?, ?)
        "#,
        params![
            key.id.to_string(),
            key.scope.correspondence_id.to_string(),
            optional_key(key.scope.attachment_id.as_ref()),
            key.scope.action.as_str(),
            key.scope.effect_kind.as_str(),
            to_micros(&key.created_at),
        ],
    )?;
    Ok(InsertOutcome::from_changes(changed))
}
