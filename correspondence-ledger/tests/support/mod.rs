//! Shared fixtures for ledger tests.

use chrono::{DateTime, TimeZone, Utc};
use correspondence_storage::CorrespondenceStore;
use correspondence_types::*;

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 7, 12, 0, 0).unwrap()
}

pub fn correspondence() -> Correspondence {
    Correspondence::new(
        "resource-123",
        "urn:altinn:organization:identifier-no:991825827",
        "urn:altinn:person:identifier-no:01018012345",
        "ref-1",
        Content {
            language: "nb".into(),
            title: "Tittel".into(),
            summary: "Sammendrag".into(),
        },
    )
}

/// Stores the correspondence and walks it to Published.
pub fn published(store: &CorrespondenceStore, correspondence: &Correspondence) {
    store.insert_correspondence(correspondence).unwrap();
    for (offset, status) in [
        CorrespondenceStatus::Initialized,
        CorrespondenceStatus::ReadyForPublish,
        CorrespondenceStatus::Published,
    ]
    .into_iter()
    .enumerate()
    {
        store
            .insert_status_event(&StatusEvent::new(
                correspondence.id,
                status,
                base_time() + chrono::Duration::seconds(offset as i64),
            ))
            .unwrap();
    }
}
