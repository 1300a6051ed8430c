//! Correspondence aggregates and their external references.

use super::CorrespondenceStore;
use crate::InsertOutcome;
use crate::error::{StorageError, StorageResult};
use crate::keys::to_micros;
use correspondence_types::{Correspondence, CorrespondenceId, ExternalReference};
use duckdb::{Connection, params};

impl CorrespondenceStore {
    /// Store a new correspondence. A second insert with the same id is ignored.
    pub fn insert_correspondence(&self, correspondence: &Correspondence) -> StorageResult<InsertOutcome> {
        let mut body = correspondence.clone();
        let references = std::mem::take(&mut body.external_references);
        let body_json = serde_json::to_string(&body)?;

        let conn = self.lock_conn();
        let changed = conn.execute(
            "INSERT OR IGNORE INTO correspondences (id, body_json, created_micros) VALUES (?, ?, ?)",
            params![
                correspondence.id.to_string(),
                body_json,
                to_micros(&correspondence.created_at),
            ],
        )?;
        let outcome = InsertOutcome::from_changes(changed);
        if outcome.is_created() {
            for reference in &references {
                insert_reference(&conn, &correspondence.id, reference)?;
            }
        }
        Ok(outcome)
    }

    /// Load a correspondence with all external references attached.
    pub fn get_correspondence(&self, id: &CorrespondenceId) -> StorageResult<Option<Correspondence>> {
        let conn = self.lock_conn();
        let body: Option<String> = match conn.query_row(
            "SELECT body_json FROM correspondences WHERE id = ?",
            params![id.to_string()],
            |row| row.get(0),
        ) {
            Ok(body) => Some(body),
            Err(duckdb::Error::QueryReturnedNoRows) => None,
            Err(e) => return Err(e.into()),
        };
        let Some(body) = body else {
            return Ok(None);
        };

        let mut correspondence: Correspondence = serde_json::from_str(&body)?;
        correspondence.external_references = load_references(&conn, id)?;
        Ok(Some(correspondence))
    }

    pub fn correspondence_exists(&self, id: &CorrespondenceId) -> StorageResult<bool> {
        let conn = self.lock_conn();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM correspondences WHERE id = ?",
            params![id.to_string()],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Attach an external reference. Re-adding an identical reference is ignored.
    pub fn add_external_reference(
        &self,
        id: &CorrespondenceId,
        reference: &ExternalReference,
    ) -> StorageResult<InsertOutcome> {
        let conn = self.lock_conn();
        insert_reference(&conn, id, reference)
    }
}

fn insert_reference(
    conn: &Connection,
    id: &CorrespondenceId,
    reference: &ExternalReference,
) -> StorageResult<InsertOutcome> {
    let changed = conn.execute(
        "INSERT OR IGNORE INTO external_references (correspondence_id, reference_type, reference_value) \
         VALUES (?, ?, ?)",
        params![
            id.to_string(),
            reference.reference_type.as_str(),
            reference.value,
        ],
    )?;
    Ok(InsertOutcome::from_changes(changed))
}

fn load_references(conn: &Connection, id: &CorrespondenceId) -> StorageResult<Vec<ExternalReference>> {
    let mut stmt = conn.prepare(
        "SELECT reference_type, reference_value FROM external_references \
         WHERE correspondence_id = ? ORDER BY rowid",
    )?;
    let rows = stmt
        .query_map(params![id.to_string()], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(|(ty, value)| {
            let reference_type = ty
                .parse()
                .map_err(|e| StorageError::corrupt("external_references", e))?;
            Ok(ExternalReference {
                reference_type,
                value,
            })
        })
        .collect()
}
