use correspondence_dialog::*;

#[test]
fn default_config_is_valid() {
    let config = DialogConfig::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.request_timeout_secs, 30);
    assert!(config.api_token.is_none());
}

#[test]
fn non_http_url_is_rejected() {
    let config = DialogConfig {
        correspondence_base_url: "ftp://example.com".into(),
        ..DialogConfig::default()
    };
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("correspondence_base_url"));
}

#[test]
fn missing_fields_fall_back_to_defaults() {
    let config: DialogConfig =
        serde_json::from_str(r#"{ "dialog_api_base_url": "http://localhost:5000" }"#).unwrap();
    assert_eq!(config.dialog_api_base_url, "http://localhost:5000");
    assert_eq!(config.request_timeout_secs, 30);
}
