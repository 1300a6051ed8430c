//! The service wired to the HTTP dialog client.

use chrono::{TimeZone, Utc};
use correspondence_core::types::*;
use correspondence_core::{CoreConfig, CorrespondenceService};
use correspondence_core::dialog::DialogApiClient;
use wiremock::matchers::{header, method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DIALOGS: &str = "/dialogporten/api/v1/serviceowner/dialogs";
const DIALOG_ID: &str = "0191c6a8-2c3f-7d4e-9b1a-5f0e2d3c4b5a";

fn setup(server: &MockServer) -> CorrespondenceService<DialogApiClient> {
    let mut config = CoreConfig::default();
    config.dialog.dialog_api_base_url = server.uri();
    config.dialog.correspondence_base_url = "https://correspondence.test".into();
    config.dialog.api_token = Some("token-123".into());
    CorrespondenceService::from_config(&config).unwrap()
}

fn correspondence() -> Correspondence {
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
    c.created_at = Utc.with_ymd_and_hms(2024, 1, 7, 12, 0, 0).unwrap();
    c
}

#[tokio::test]
async fn initialize_and_publish_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(DIALOGS))
        .and(header("authorization", "Bearer token-123"))
        .respond_with(ResponseTemplate::new(201).set_body_string(format!("\"{DIALOG_ID}\"")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("{DIALOGS}/{DIALOG_ID}/activities")))
        .and(query_param("isSilentUpdate", "true"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let service = setup(&server);
    let c = correspondence();
    let id = service.initialize_correspondence(c.clone()).await.unwrap();
    service
        .publish(&id, c.created_at + chrono::Duration::seconds(1))
        .await
        .unwrap();

    let stored = service.ledger().correspondence(&id).unwrap();
    assert_eq!(stored.dialog_id(), Some(DIALOG_ID));
}

#[tokio::test]
async fn dialog_outage_surfaces_after_local_write() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path_regex(r"^/dialogporten/.*"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .mount(&server)
        .await;

    let service = setup(&server);
    let c = correspondence();
    let err = service.initialize_correspondence(c.clone()).await.unwrap_err();

    assert!(err.to_string().contains("503"));
    assert_eq!(
        service.ledger().current_status(&c.id).unwrap(),
        CorrespondenceStatus::Initialized
    );
    assert!(service.ledger().correspondence(&c.id).unwrap().dialog_id().is_none());
}
