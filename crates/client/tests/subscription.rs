//! Event subscription and listener tests against the in-memory store.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::timeout;

use feedo_client::store::FeedbackStore;
use feedo_client::subscription::FeedbackListener;
use feedo_core::feedback::{Feedback, FeedbackChanges};
use feedo_events::{EventFilter, RecordEventKind};

mod common;
use common::{init_tracing, new_feedback, owner, MemoryStore};

#[tokio::test]
async fn subscription_sees_only_matching_events() {
    init_tracing();
    let store = MemoryStore::new();
    let owner_a = owner();
    let owner_b = owner();

    let mut subscription = store.subscribe(EventFilter::for_owner(owner_a));

    let first = store
        .create_feedback(owner_a, &new_feedback("Ana", 5))
        .await
        .unwrap();
    let event = subscription.next().await.unwrap();
    assert_eq!(event.kind, RecordEventKind::Inserted);
    assert_eq!(event.feedback_id, first.id);
    assert_eq!(event.record.as_ref().map(|r| r.id), Some(first.id));

    // An event for another account is skipped; the next matching one is
    // delivered in its place.
    store
        .create_feedback(owner_b, &new_feedback("Intrusa", 1))
        .await
        .unwrap();
    let second = store
        .create_feedback(owner_a, &new_feedback("Bruno", 4))
        .await
        .unwrap();
    let event = subscription.next().await.unwrap();
    assert_eq!(event.feedback_id, second.id);
}

#[tokio::test]
async fn kind_filters_narrow_the_stream() {
    let store = MemoryStore::new();
    let owner = owner();

    let mut subscription =
        store.subscribe(EventFilter::for_owner(owner).with_kinds([RecordEventKind::Deleted]));

    let record = store
        .create_feedback(owner, &new_feedback("Ana", 5))
        .await
        .unwrap();
    store.delete_feedback(owner, record.id).await.unwrap();

    // The insert is filtered out; the delete arrives without a record body.
    let event = subscription.next().await.unwrap();
    assert_eq!(event.kind, RecordEventKind::Deleted);
    assert_eq!(event.feedback_id, record.id);
    assert!(event.record.is_none());
}

#[tokio::test]
async fn listener_invokes_the_callback_per_new_record() {
    init_tracing();
    let store = MemoryStore::new();
    let owner_a = owner();
    let owner_b = owner();

    let (tx, mut rx) = mpsc::unbounded_channel::<Feedback>();
    let mut listener = FeedbackListener::spawn(
        store.clone() as Arc<dyn FeedbackStore>,
        owner_a,
        move |record| {
            let _ = tx.send(record);
        },
    );

    store
        .create_feedback(owner_a, &new_feedback("Ana", 5))
        .await
        .unwrap();
    store
        .create_feedback(owner_b, &new_feedback("Intrusa", 1))
        .await
        .unwrap();
    let third = store
        .create_feedback(owner_a, &new_feedback("Bruno", 4))
        .await
        .unwrap();

    let delivered = timeout(Duration::from_secs(1), rx.recv()).await.unwrap().unwrap();
    assert_eq!(delivered.customer_name, "Ana");
    let delivered = timeout(Duration::from_secs(1), rx.recv()).await.unwrap().unwrap();
    assert_eq!(delivered.id, third.id, "the other account's record is skipped");

    listener.close().await;
}

#[tokio::test]
async fn updates_do_not_reach_the_new_record_listener() {
    let store = MemoryStore::new();
    let owner = owner();

    let (tx, mut rx) = mpsc::unbounded_channel::<Feedback>();
    let mut listener = FeedbackListener::spawn(
        store.clone() as Arc<dyn FeedbackStore>,
        owner,
        move |record| {
            let _ = tx.send(record);
        },
    );

    let record = store
        .create_feedback(owner, &new_feedback("Ana", 5))
        .await
        .unwrap();
    store
        .update_feedback(owner, record.id, &FeedbackChanges::urgency(true))
        .await
        .unwrap();
    let second = store
        .create_feedback(owner, &new_feedback("Bruno", 4))
        .await
        .unwrap();

    let delivered = timeout(Duration::from_secs(1), rx.recv()).await.unwrap().unwrap();
    assert_eq!(delivered.id, record.id);
    let delivered = timeout(Duration::from_secs(1), rx.recv()).await.unwrap().unwrap();
    assert_eq!(delivered.id, second.id, "the update event is filtered out");

    listener.close().await;
}

#[tokio::test]
async fn closed_listener_never_fires_again() {
    let store = MemoryStore::new();
    let owner = owner();

    let (tx, mut rx) = mpsc::unbounded_channel::<Feedback>();
    let mut listener = FeedbackListener::spawn(
        store.clone() as Arc<dyn FeedbackStore>,
        owner,
        move |record| {
            let _ = tx.send(record);
        },
    );

    store
        .create_feedback(owner, &new_feedback("Ana", 5))
        .await
        .unwrap();
    timeout(Duration::from_secs(1), rx.recv()).await.unwrap().unwrap();

    listener.close().await;
    store
        .create_feedback(owner, &new_feedback("Bruno", 4))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(rx.try_recv().is_err(), "no callback after close returns");
}
