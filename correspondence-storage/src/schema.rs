//! DDL for the correspondence database.

use crate::error::StorageResult;
use duckdb::Connection;

/// Correspondence aggregates. External references are kept separately.
const CORRESPONDENCES_DDL: &str = r#"
CREATE TABLE IF NOT EXISTS correspondences (
    id VARCHAR PRIMARY KEY,
    body_json TEXT NOT NULL,
    created_micros BIGINT NOT NULL
);
"#;

const EXTERNAL_REFERENCES_DDL: &str = r#"
CREATE TABLE IF NOT EXISTS external_references (
    correspondence_id VARCHAR NOT NULL,
    reference_type VARCHAR NOT NULL,
    reference_value VARCHAR NOT NULL,
    UNIQUE (correspondence_id, reference_type, reference_value)
);
"#;

/// Status history. `seq` records insertion order for equal timestamps.
const STATUS_EVENTS_DDL: &str = r#"
CREATE SEQUENCE IF NOT EXISTS status_event_seq START 1;
CREATE TABLE IF NOT EXISTS status_events (
    seq BIGINT NOT NULL DEFAULT nextval('status_event_seq'),
    correspondence_id VARCHAR NOT NULL,
    status VARCHAR NOT NULL,
    occurred_micros BIGINT NOT NULL,
    occurred_second BIGINT NOT NULL,
    actor_key VARCHAR NOT NULL,
    attachment_key VARCHAR NOT NULL,
    note TEXT,
    UNIQUE (correspondence_id, status, occurred_second, actor_key, attachment_key)
);
"#;

const NOTIFICATION_EVENTS_DDL: &str = r#"
CREATE SEQUENCE IF NOT EXISTS notification_event_seq START 1;
CREATE TABLE IF NOT EXISTS notification_events (
    seq BIGINT NOT NULL DEFAULT nextval('notification_event_seq'),
    correspondence_id VARCHAR NOT NULL,
    channel VARCHAR NOT NULL,
    address VARCHAR NOT NULL,
    sent_micros BIGINT NOT NULL,
    sent_second BIGINT NOT NULL,
    is_reminder BOOLEAN NOT NULL,
    source_notification_id BIGINT,
    UNIQUE (correspondence_id, channel, sent_second, is_reminder)
);
"#;

const FORWARDING_EVENTS_DDL: &str = r#"
CREATE SEQUENCE IF NOT EXISTS forwarding_event_seq START 1;
CREATE TABLE IF NOT EXISTS forwarding_events (
    seq BIGINT NOT NULL DEFAULT nextval('forwarding_event_seq'),
    correspondence_id VARCHAR NOT NULL,
    forwarded_micros BIGINT NOT NULL,
    forwarded_by_party VARCHAR NOT NULL,
    forwarded_by_user VARCHAR,
    destination_json TEXT NOT NULL,
    note TEXT,
    UNIQUE (correspondence_id, forwarded_micros, forwarded_by_party)
);
"#;

const DELETE_EVENTS_DDL: &str = r#"
CREATE SEQUENCE IF NOT EXISTS delete_event_seq START 1;
CREATE TABLE IF NOT EXISTS delete_events (
    seq BIGINT NOT NULL DEFAULT nextval('delete_event_seq'),
    correspondence_id VARCHAR NOT NULL,
    event_type VARCHAR NOT NULL,
    occurred_micros BIGINT NOT NULL,
    actor_key VARCHAR NOT NULL,
    UNIQUE (correspondence_id, event_type, occurred_micros, actor_key)
);
"#;

/// One key per (correspondence, attachment, action, effect kind).
const IDEMPOTENCY_KEYS_DDL: &str = r#"
CREATE TABLE IF NOT EXISTS idempotency_keys (
    id VARCHAR NOT NULL,
    correspondence_id VARCHAR NOT NULL,
    attachment_key VARCHAR NOT NULL,
    action VARCHAR NOT NULL,
    effect_kind VARCHAR NOT NULL,
    created_micros BIGINT NOT NULL,
    UNIQUE (correspondence_id, attachment_key, action, effect_kind)
);
"#;

const LOOKUP_INDEXES: &str = r#"
CREATE INDEX IF NOT EXISTS idx_status_events_corr ON status_events(correspondence_id);
CREATE INDEX IF NOT EXISTS idx_notification_events_corr ON notification_events(correspondence_id);
CREATE INDEX IF NOT EXISTS idx_forwarding_events_corr ON forwarding_events(correspondence_id);
CREATE INDEX IF NOT EXISTS idx_delete_events_corr ON delete_events(correspondence_id);
"#;

/// Initialize all correspondence schema tables.
pub fn initialize_correspondence_schema(conn: &Connection) -> StorageResult<()> {
    conn.execute_batch(CORRESPONDENCES_DDL)?;
    conn.execute_batch(EXTERNAL_REFERENCES_DDL)?;
    conn.execute_batch(STATUS_EVENTS_DDL)?;
    conn.execute_batch(NOTIFICATION_EVENTS_DDL)?;
    conn.execute_batch(FORWARDING_EVENTS_DDL)?;
    conn.execute_batch(DELETE_EVENTS_DDL)?;
    conn.execute_batch(IDEMPOTENCY_KEYS_DDL)?;
    conn.execute_batch(LOOKUP_INDEXES)?;
    Ok(())
}
