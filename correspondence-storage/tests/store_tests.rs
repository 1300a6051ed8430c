use chrono::{DateTime, Duration, TimeZone, Utc};
use correspondence_storage::{CorrespondenceStore, InsertOutcome, keys};
use correspondence_types::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn store() -> CorrespondenceStore {
    CorrespondenceStore::open_in_memory().unwrap()
}

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 7, 12, 0, 0).unwrap()
}

fn correspondence() -> Correspondence {
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

// ── Correspondences ──

#[test]
fn insert_and_get_correspondence_with_references() {
    let store = store();
    let c = correspondence()
        .with_attachment(Attachment::new("a.pdf"))
        .with_external_reference(ExternalReference::new(ReferenceType::DialogportenProcessId, "proc-1"));

    assert_eq!(store.insert_correspondence(&c).unwrap(), InsertOutcome::Created);
    let loaded = store.get_correspondence(&c.id).unwrap().unwrap();
    assert_eq!(loaded, c);
}

#[test]
fn second_insert_of_same_correspondence_is_ignored() {
    let store = store();
    let c = correspondence();
    store.insert_correspondence(&c).unwrap();
    assert_eq!(
        store.insert_correspondence(&c).unwrap(),
        InsertOutcome::DuplicateIgnored
    );
}

#[test]
fn get_missing_correspondence_returns_none() {
    let store = store();
    assert!(store.get_correspondence(&CorrespondenceId::new()).unwrap().is_none());
    assert!(!store.correspondence_exists(&CorrespondenceId::new()).unwrap());
}

#[test]
fn add_external_reference_is_visible_on_reload() {
    let store = store();
    let c = correspondence();
    store.insert_correspondence(&c).unwrap();
    let reference = ExternalReference::new(ReferenceType::DialogportenDialogId, "dialog-1");

    assert!(store.add_external_reference(&c.id, &reference).unwrap().is_created());
    assert!(!store.add_external_reference(&c.id, &reference).unwrap().is_created());

    let loaded = store.get_correspondence(&c.id).unwrap().unwrap();
    assert_eq!(loaded.dialog_id(), Some("dialog-1"));
    assert_eq!(loaded.external_references.len(), 1);
}

// ── Status events ──

#[test]
fn identical_status_event_inserted_once() {
    let store = store();
    let id = CorrespondenceId::new();
    let ev = StatusEvent::new(id, CorrespondenceStatus::Read, base_time()).by(PartyId::new());

    assert_eq!(store.insert_status_event(&ev).unwrap(), InsertOutcome::Created);
    assert_eq!(
        store.insert_status_event(&ev).unwrap(),
        InsertOutcome::DuplicateIgnored
    );
    assert_eq!(store.status_history(&id).unwrap().len(), 1);
}

#[test]
fn status_events_within_same_second_collapse() {
    let store = store();
    let id = CorrespondenceId::new();
    let party = PartyId::new();
    let first = StatusEvent::new(id, CorrespondenceStatus::Read, base_time()).by(party);
    let jittered =
        StatusEvent::new(id, CorrespondenceStatus::Read, base_time() + Duration::milliseconds(250)).by(party);

    store.insert_status_event(&first).unwrap();
    assert_eq!(
        store.insert_status_event(&jittered).unwrap(),
        InsertOutcome::DuplicateIgnored
    );
    assert_eq!(store.count_status(&id, CorrespondenceStatus::Read).unwrap(), 1);
}

#[test]
fn status_events_a_second_apart_both_persist() {
    let store = store();
    let id = CorrespondenceId::new();
    let first = StatusEvent::new(id, CorrespondenceStatus::Read, base_time());
    let later = StatusEvent::new(id, CorrespondenceStatus::Read, base_time() + Duration::seconds(1));

    store.insert_status_event(&first).unwrap();
    assert!(store.insert_status_event(&later).unwrap().is_created());
    assert_eq!(store.count_status(&id, CorrespondenceStatus::Read).unwrap(), 2);
}

#[test]
fn different_actor_is_a_distinct_status_event() {
    let store = store();
    let id = CorrespondenceId::new();
    let a = StatusEvent::new(id, CorrespondenceStatus::Read, base_time()).by(PartyId::new());
    let b = StatusEvent::new(id, CorrespondenceStatus::Read, base_time()).by(PartyId::new());
    let anonymous = StatusEvent::new(id, CorrespondenceStatus::Read, base_time());

    assert!(store.insert_status_event(&a).unwrap().is_created());
    assert!(store.insert_status_event(&b).unwrap().is_created());
    assert!(store.insert_status_event(&anonymous).unwrap().is_created());
    assert!(!store.insert_status_event(&anonymous).unwrap().is_created());
}

#[test]
fn attachment_downloads_are_scoped_per_attachment() {
    let store = store();
    let id = CorrespondenceId::new();
    let a = StatusEvent::new(id, CorrespondenceStatus::AttachmentsDownloaded, base_time())
        .for_attachment(AttachmentId::new());
    let b = StatusEvent::new(id, CorrespondenceStatus::AttachmentsDownloaded, base_time())
        .for_attachment(AttachmentId::new());

    assert!(store.insert_status_event(&a).unwrap().is_created());
    assert!(store.insert_status_event(&b).unwrap().is_created());
}

#[test]
fn history_roundtrips_optional_fields() {
    let store = store();
    let id = CorrespondenceId::new();
    let party = PartyId::new();
    let ev = StatusEvent::new(id, CorrespondenceStatus::Confirmed, base_time() + Duration::microseconds(1234))
        .by(party)
        .with_note("confirmed via api");
    store.insert_status_event(&ev).unwrap();

    assert_eq!(store.status_history(&id).unwrap(), vec![ev]);
}

#[test]
fn latest_status_is_latest_occurrence_not_latest_insert() {
    let store = store();
    let id = CorrespondenceId::new();
    store
        .insert_status_event(&StatusEvent::new(id, CorrespondenceStatus::Read, base_time() + Duration::hours(1)))
        .unwrap();
    store
        .insert_status_event(&StatusEvent::new(id, CorrespondenceStatus::Published, base_time()))
        .unwrap();

    let latest = store.latest_status_event(&id).unwrap().unwrap();
    assert_eq!(latest.status, CorrespondenceStatus::Read);
}

#[test]
fn latest_status_tie_goes_to_later_insert() {
    let store = store();
    let id = CorrespondenceId::new();
    store
        .insert_status_event(&StatusEvent::new(id, CorrespondenceStatus::Published, base_time()))
        .unwrap();
    store
        .insert_status_event(&StatusEvent::new(id, CorrespondenceStatus::Fetched, base_time()))
        .unwrap();

    let latest = store.latest_status_event(&id).unwrap().unwrap();
    assert_eq!(latest.status, CorrespondenceStatus::Fetched);
}

#[test]
fn visible_status_skips_bookkeeping() {
    let store = store();
    let id = CorrespondenceId::new();
    store
        .insert_status_event(&StatusEvent::new(id, CorrespondenceStatus::Published, base_time()))
        .unwrap();
    store
        .insert_status_event(&StatusEvent::new(
            id,
            CorrespondenceStatus::Fetched,
            base_time() + Duration::seconds(5),
        ))
        .unwrap();

    let visible = store.latest_visible_status_event(&id).unwrap().unwrap();
    assert_eq!(visible.status, CorrespondenceStatus::Published);
}

#[test]
fn latest_status_of_unknown_correspondence_is_none() {
    let store = store();
    assert!(store.latest_status_event(&CorrespondenceId::new()).unwrap().is_none());
}

#[test]
fn is_purged_detects_either_purge_status() {
    let store = store();
    let id = CorrespondenceId::new();
    assert!(!store.is_purged(&id).unwrap());
    store
        .insert_status_event(&StatusEvent::new(id, CorrespondenceStatus::PurgedByAltinn, base_time()))
        .unwrap();
    assert!(store.is_purged(&id).unwrap());
}

#[test]
fn purge_stays_latest_after_later_history() {
    let store = store();
    let id = CorrespondenceId::new();
    for (secs, status) in [
        (0, CorrespondenceStatus::Published),
        (10, CorrespondenceStatus::PurgedByRecipient),
        (20, CorrespondenceStatus::Archived),
    ] {
        store
            .insert_status_event(&StatusEvent::new(id, status, base_time() + Duration::seconds(secs)))
            .unwrap();
    }

    let latest = store.latest_status_event(&id).unwrap().unwrap();
    assert_eq!(latest.status, CorrespondenceStatus::PurgedByRecipient);
    let visible = store.latest_visible_status_event(&id).unwrap().unwrap();
    assert_eq!(visible.status, CorrespondenceStatus::PurgedByRecipient);
}

// ── Notification events ──

fn notification(id: CorrespondenceId, channel: NotificationChannel, at: DateTime<Utc>, reminder: bool) -> NotificationEvent {
    NotificationEvent {
        correspondence_id: id,
        channel,
        address: "testemail@altinn.no".into(),
        sent_at: at,
        is_reminder: reminder,
        source_notification_id: Some(1),
    }
}

#[test]
fn notifications_within_same_second_collapse() {
    let store = store();
    let id = CorrespondenceId::new();
    store
        .insert_notification_event(&notification(id, NotificationChannel::Email, base_time(), false))
        .unwrap();
    let outcome = store
        .insert_notification_event(&notification(
            id,
            NotificationChannel::Email,
            base_time() + Duration::milliseconds(150),
            false,
        ))
        .unwrap();

    assert_eq!(outcome, InsertOutcome::DuplicateIgnored);
    assert_eq!(store.notification_events(&id).unwrap().len(), 1);
}

#[test]
fn notification_channel_and_reminder_are_key_fields() {
    let store = store();
    let id = CorrespondenceId::new();
    assert!(store
        .insert_notification_event(&notification(id, NotificationChannel::Email, base_time(), false))
        .unwrap()
        .is_created());
    assert!(store
        .insert_notification_event(&notification(id, NotificationChannel::Sms, base_time(), false))
        .unwrap()
        .is_created());
    assert!(store
        .insert_notification_event(&notification(id, NotificationChannel::Email, base_time(), true))
        .unwrap()
        .is_created());
    assert_eq!(store.notification_events(&id).unwrap().len(), 3);
}

// ── Forwarding events ──

#[test]
fn forwarding_dedup_is_exact() {
    let store = store();
    let id = CorrespondenceId::new();
    let party = PartyId::new();
    let ev = ForwardingEvent {
        correspondence_id: id,
        forwarded_at: base_time(),
        forwarded_by_party: party,
        forwarded_by_user: Some("user-1".into()),
        destination: ForwardingDestination::Email("someone@example.com".into()),
        note: Some("fyi".into()),
    };
    let shifted = ForwardingEvent {
        forwarded_at: base_time() + Duration::milliseconds(1),
        ..ev.clone()
    };
    let other_party = ForwardingEvent {
        forwarded_by_party: PartyId::new(),
        ..ev.clone()
    };

    assert!(store.insert_forwarding_event(&ev).unwrap().is_created());
    assert!(!store.insert_forwarding_event(&ev).unwrap().is_created());
    assert!(store.insert_forwarding_event(&shifted).unwrap().is_created());
    assert!(store.insert_forwarding_event(&other_party).unwrap().is_created());

    let stored = store.forwarding_events(&id).unwrap();
    assert_eq!(stored.len(), 3);
    assert_eq!(stored[0], ev);
}

// ── Delete events ──

#[test]
fn delete_dedup_is_exact_and_typed() {
    let store = store();
    let id = CorrespondenceId::new();
    let party = PartyId::new();
    let purge = DeleteEvent {
        correspondence_id: id,
        event_type: DeleteEventType::PurgedByRecipient,
        occurred_at: base_time(),
        actor_party: Some(party),
    };
    let soft = DeleteEvent {
        event_type: DeleteEventType::SoftDeletedByRecipient,
        ..purge.clone()
    };

    assert!(store.insert_delete_event(&purge).unwrap().is_created());
    assert!(!store.insert_delete_event(&purge).unwrap().is_created());
    assert!(store.insert_delete_event(&soft).unwrap().is_created());
    assert_eq!(store.delete_events(&id).unwrap().len(), 2);
}

#[test]
fn latest_bin_event_follows_status_history() {
    let store = store();
    let id = CorrespondenceId::new();
    assert_eq!(store.latest_bin_event(&id).unwrap(), None);

    store
        .insert_status_event(&StatusEvent::new(id, CorrespondenceStatus::SoftDeletedByRecipient, base_time()))
        .unwrap();
    assert_eq!(
        store.latest_bin_event(&id).unwrap(),
        Some(DeleteEventType::SoftDeletedByRecipient)
    );

    store
        .insert_status_event(&StatusEvent::new(
            id,
            CorrespondenceStatus::RestoredByRecipient,
            base_time() + Duration::minutes(1),
        ))
        .unwrap();
    assert_eq!(
        store.latest_bin_event(&id).unwrap(),
        Some(DeleteEventType::RestoredByRecipient)
    );
}

// ── Idempotency keys ──

#[test]
fn idempotency_key_is_unique_per_scope() {
    let store = store();
    let scope = KeyScope::activity(CorrespondenceId::new(), IdempotentAction::Fetched);
    let first = IdempotencyKey::mint(scope);
    let second = IdempotencyKey::mint(scope);

    assert!(store.insert_idempotency_key(&first).unwrap().is_created());
    assert!(!store.insert_idempotency_key(&second).unwrap().is_created());

    let found = store.find_idempotency_key(&scope).unwrap().unwrap();
    assert_eq!(found.id, first.id);
}

#[test]
fn attachment_scopes_do_not_collide() {
    let store = store();
    let id = CorrespondenceId::new();
    let keys = vec![
        IdempotencyKey::mint(KeyScope::attachment_download(id, AttachmentId::new())),
        IdempotencyKey::mint(KeyScope::attachment_download(id, AttachmentId::new())),
        IdempotencyKey::mint(KeyScope::activity(id, IdempotentAction::Fetched)),
    ];

    let outcomes = store.insert_idempotency_keys(&keys).unwrap();
    assert!(outcomes.iter().all(InsertOutcome::is_created));
    for key in &keys {
        let found = store.find_idempotency_key(&key.scope).unwrap().unwrap();
        assert_eq!(found.id, key.id);
        assert_eq!(found.scope, key.scope);
    }
}

#[test]
fn missing_idempotency_key_is_none() {
    let store = store();
    let scope = KeyScope::activity(CorrespondenceId::new(), IdempotentAction::Confirmed);
    assert!(store.find_idempotency_key(&scope).unwrap().is_none());
}

// ── Persistence ──

#[test]
fn on_disk_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("correspondence.duckdb");
    let c = correspondence();

    {
        let store = CorrespondenceStore::open(&path).unwrap();
        store.insert_correspondence(&c).unwrap();
        store
            .insert_status_event(&StatusEvent::new(c.id, CorrespondenceStatus::Initialized, base_time()))
            .unwrap();
        store.checkpoint().unwrap();
    }

    let reopened = CorrespondenceStore::open(&path).unwrap();
    assert!(reopened.correspondence_exists(&c.id).unwrap());
    assert_eq!(reopened.status_history(&c.id).unwrap().len(), 1);
    // Replays still dedupe after reopen.
    let replay = StatusEvent::new(c.id, CorrespondenceStatus::Initialized, base_time());
    assert!(!reopened.insert_status_event(&replay).unwrap().is_created());
}

// ── Key helpers ──

proptest! {
    #[test]
    fn truncation_stays_within_the_same_second(secs in 0i64..4_000_000_000, micros in 0u32..1_000_000) {
        let at = DateTime::from_timestamp(secs, micros * 1000).unwrap();
        let truncated = keys::truncate_to_second(&at);
        prop_assert!(truncated <= at);
        prop_assert!(at - truncated < Duration::seconds(1));
        prop_assert_eq!(keys::second_bucket(&at), keys::second_bucket(&truncated));
    }
}
