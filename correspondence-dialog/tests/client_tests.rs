use chrono::{TimeZone, Utc};
use correspondence_dialog::*;
use pretty_assertions::assert_eq;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DIALOGS: &str = "/dialogporten/api/v1/serviceowner/dialogs";
const DIALOG_ID: &str = "0191c6a8-2c3f-7d4e-9b1a-5f0e2d3c4b5a";

fn setup(server: &MockServer) -> DialogApiClient {
    let config = DialogConfig {
        dialog_api_base_url: format!("{}/", server.uri()),
        correspondence_base_url: "https://correspondence.test".into(),
        api_token: Some("token-123".into()),
        request_timeout_secs: 5,
    };
    DialogApiClient::new(config).unwrap()
}

fn activity() -> CreateActivityRequest {
    CreateActivityRequest {
        id: "0191c6a8-0000-7000-8000-000000000001".into(),
        created_at: Utc.with_ymd_and_hms(2024, 1, 7, 12, 0, 0).unwrap(),
        activity_type: ActivityType::CorrespondenceOpened,
        performed_by: PerformedBy {
            actor_type: "PartyRepresentative".into(),
            actor_id: Some("urn:altinn:person:identifier-no:01018012345".into()),
        },
        description: vec![],
    }
}

// --- Construction ---

#[test]
fn rejects_invalid_config() {
    let config = DialogConfig {
        request_timeout_secs: 0,
        ..DialogConfig::default()
    };
    assert!(matches!(
        DialogApiClient::new(config),
        Err(DialogError::Config(_))
    ));
}

// --- Dialogs ---

#[tokio::test]
async fn create_dialog_returns_trimmed_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(DIALOGS))
        .and(header("authorization", "Bearer token-123"))
        .and(body_partial_json(serde_json::json!({ "status": "New" })))
        .respond_with(ResponseTemplate::new(201).set_body_string(format!("\"{DIALOG_ID}\"")))
        .expect(1)
        .mount(&server)
        .await;

    let client = setup(&server);
    let correspondence = correspondence_types::Correspondence::new(
        "resource-123",
        "urn:altinn:organization:identifier-no:991825827",
        "urn:altinn:person:identifier-no:01018012345",
        "ref-1",
        correspondence_types::Content {
            language: "nb".into(),
            title: "Tittel".into(),
            summary: "Sammendrag".into(),
        },
    );
    let request = mapper::create_dialog_request(
        &correspondence,
        &CallbackUrls::new(client.config()),
        false,
    );

    assert_eq!(client.create_dialog(&request).await.unwrap(), DIALOG_ID);
}

#[tokio::test]
async fn get_dialog_reads_actions() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{DIALOGS}/{DIALOG_ID}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": DIALOG_ID,
            "status": "RequiresAttention",
            "guiActions": [{ "action": "read", "url": "https://x/confirm", "priority": "Primary", "httpMethod": "POST" }],
            "apiActions": [{ "action": "write", "endpoints": [{ "url": "https://x/confirm", "httpMethod": "POST" }] }],
            "content": { "ignored": true }
        })))
        .mount(&server)
        .await;

    let dialog = setup(&server).get_dialog(DIALOG_ID).await.unwrap();
    assert_eq!(dialog.status, "RequiresAttention");
    assert_eq!(dialog.gui_actions[0].url, "https://x/confirm");
    assert_eq!(dialog.api_actions[0].endpoints[0].http_method, "POST");
}

#[tokio::test]
async fn get_missing_dialog_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{DIALOGS}/{DIALOG_ID}")))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = setup(&server).get_dialog(DIALOG_ID).await.unwrap_err();
    assert!(matches!(err, DialogError::NotFound(_)));
}

#[tokio::test]
async fn patch_is_silent() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path(format!("{DIALOGS}/{DIALOG_ID}")))
        .and(query_param("isSilentUpdate", "true"))
        .and(body_partial_json(serde_json::json!([{ "op": "remove", "path": "/guiActions/0" }])))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let ops = patch::DialogPatchBuilder::new().remove_gui_action(0).build();
    setup(&server).patch_dialog(DIALOG_ID, &ops).await.unwrap();
}

#[tokio::test]
async fn purge_failure_surfaces_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("{DIALOGS}/{DIALOG_ID}/actions/purge")))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    match setup(&server).purge_dialog(DIALOG_ID).await.unwrap_err() {
        DialogError::ExternalSystem { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "boom");
        }
        other => panic!("expected external system error, got {other:?}"),
    }
}

#[tokio::test]
async fn soft_delete_uses_delete() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path(format!("{DIALOGS}/{DIALOG_ID}")))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    setup(&server).soft_delete_dialog(DIALOG_ID).await.unwrap();
}

// --- Activities ---

#[tokio::test]
async fn activity_posts_with_key_as_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("{DIALOGS}/{DIALOG_ID}/activities")))
        .and(query_param("isSilentUpdate", "true"))
        .and(body_partial_json(serde_json::json!({
            "id": "0191c6a8-0000-7000-8000-000000000001",
            "type": "CorrespondenceOpened",
            "performedBy": { "actorType": "PartyRepresentative" }
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    setup(&server).create_activity(DIALOG_ID, &activity()).await.unwrap();
}

#[tokio::test]
async fn activity_already_exists_is_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("{DIALOGS}/{DIALOG_ID}/activities")))
        .respond_with(
            ResponseTemplate::new(422)
                .set_body_string("Entity 'DialogActivity' with key '...' already exists."),
        )
        .mount(&server)
        .await;

    setup(&server).create_activity(DIALOG_ID, &activity()).await.unwrap();
}

#[tokio::test]
async fn other_unprocessable_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("{DIALOGS}/{DIALOG_ID}/activities")))
        .respond_with(ResponseTemplate::new(422).set_body_string("invalid actor"))
        .mount(&server)
        .await;

    let err = setup(&server)
        .create_activity(DIALOG_ID, &activity())
        .await
        .unwrap_err();
    assert!(matches!(err, DialogError::ExternalSystem { status: 422, .. }));
}

// --- System labels ---

#[tokio::test]
async fn gone_dialog_label_update_is_ignored() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path(format!("{DIALOGS}/{DIALOG_ID}/endusercontext/systemlabels")))
        .and(body_partial_json(serde_json::json!({ "addLabels": ["Bin"] })))
        .respond_with(ResponseTemplate::new(410))
        .expect(1)
        .mount(&server)
        .await;

    let request = SetSystemLabelsRequest {
        dialog_id: DIALOG_ID.into(),
        add_labels: vec![SystemLabel::Bin],
        remove_labels: vec![],
        performed_by: PerformedBy {
            actor_type: "PartyRepresentative".into(),
            actor_id: Some("urn:altinn:person:identifier-no:01018012345".into()),
        },
    };
    setup(&server).set_system_labels(&request).await.unwrap();
}
