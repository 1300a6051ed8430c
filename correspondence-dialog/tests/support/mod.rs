//! Shared fixtures for dialog tests.

use chrono::{DateTime, TimeZone, Utc};
use correspondence_dialog::testing::RecordingDialogService;
use correspondence_dialog::{DialogConfig, DialogLifecycleCoordinator};
use correspondence_storage::CorrespondenceStore;
use correspondence_types::*;

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 7, 12, 0, 0).unwrap()
}

pub fn config() -> DialogConfig {
    DialogConfig {
        dialog_api_base_url: "https://dialogs.test".into(),
        correspondence_base_url: "https://correspondence.test".into(),
        api_token: None,
        request_timeout_secs: 5,
    }
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

pub fn coordinator(
    correspondence: &Correspondence,
) -> (DialogLifecycleCoordinator<RecordingDialogService>, CorrespondenceStore) {
    let store = CorrespondenceStore::open_in_memory().unwrap();
    store.insert_correspondence(correspondence).unwrap();
    let coordinator =
        DialogLifecycleCoordinator::new(RecordingDialogService::new(), store.clone(), &config());
    (coordinator, store)
}
