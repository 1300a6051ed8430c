//! Shared fixtures for service tests.

use chrono::{DateTime, Duration, TimeZone, Utc};
use correspondence_core::CorrespondenceService;
use correspondence_core::dialog::DialogConfig;
use correspondence_core::dialog::testing::RecordingDialogService;
use correspondence_core::storage::CorrespondenceStore;
use correspondence_core::types::*;

pub type TestService = CorrespondenceService<RecordingDialogService>;

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 7, 12, 0, 0).unwrap()
}

pub fn at(secs: i64) -> DateTime<Utc> {
    base_time() + Duration::seconds(secs)
}

pub fn dialog_config() -> DialogConfig {
    DialogConfig {
        dialog_api_base_url: "https://dialogs.test".into(),
        correspondence_base_url: "https://correspondence.test".into(),
        api_token: None,
        request_timeout_secs: 5,
    }
}

pub fn correspondence() -> Correspondence {
    let mut c = Correspondence::new(
        "resource-123",
        "urn:altinn:organization:identifier-no:991825827",
        "urn:altinn:person:identifier-no:01018012345",
        "ref-1",
        Content {
            language: "nb".into(),
            title: "Tittel".into(),
            summary: "Sammendrag".into(),
        },
    );
    c.created_at = base_time();
    c
}

pub fn service() -> TestService {
    let store = CorrespondenceStore::open_in_memory().unwrap();
    CorrespondenceService::new(store, RecordingDialogService::new(), &dialog_config())
}

/// Initializes and publishes `c` one second after its creation.
pub async fn published(service: &TestService, c: Correspondence) -> CorrespondenceId {
    let id = service.initialize_correspondence(c).await.unwrap();
    service.publish(&id, at(1)).await.unwrap();
    id
}

pub fn recording(service: &TestService) -> &RecordingDialogService {
    service.coordinator().service()
}
