//! MemoryStore contract and the denormalized writer fan-out.

mod common;
use common::utils::{init_tracing, reading_at};

use std::sync::Arc;

use serde_json::json;

use healthsync_backend::models::health_data::{WorkoutPayload, WorkoutSession};
use healthsync_backend::services::HealthWriter;
use healthsync_backend::store::{keys, KeyedStore, MemoryStore};

#[tokio::test]
async fn put_get_delete_roundtrip() {
    init_tracing();
    let store = MemoryStore::new();

    store
        .put("users:abc", json!({ "email": "a@test.com" }))
        .await
        .expect("put failed");
    let value = store.get("users:abc").await.expect("get failed");
    assert_eq!(value, Some(json!({ "email": "a@test.com" })));

    store.delete("users:abc").await.expect("delete failed");
    assert_eq!(store.get("users:abc").await.expect("get failed"), None);
}

#[tokio::test]
async fn list_returns_only_prefix_matches_in_key_order() {
    init_tracing();
    let store = MemoryStore::new();

    store.put("health_data:u1:history:100", json!(1)).await.unwrap();
    store.put("health_data:u1:history:200", json!(2)).await.unwrap();
    store.put("health_data:u1:current", json!(3)).await.unwrap();
    store.put("health_data:u2:history:100", json!(4)).await.unwrap();

    let entries = store
        .list(&keys::history_prefix("u1"))
        .await
        .expect("list failed");
    let listed: Vec<&str> = entries.iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(
        listed,
        vec!["health_data:u1:history:100", "health_data:u1:history:200"]
    );
}

#[tokio::test]
async fn subscription_sees_writes_and_deletes_under_prefix() {
    init_tracing();
    let store = MemoryStore::new();

    let mut subscription = store
        .subscribe(&keys::current("u1"))
        .await
        .expect("subscribe failed");

    store.put(&keys::current("u2"), json!(1)).await.unwrap();
    store.put(&keys::current("u1"), json!(2)).await.unwrap();
    store.delete(&keys::current("u1")).await.unwrap();

    let event = subscription.next().await.expect("missing put event");
    assert_eq!(event.key, keys::current("u1"));
    assert_eq!(event.value, Some(json!(2)));

    let event = subscription.next().await.expect("missing delete event");
    assert_eq!(event.key, keys::current("u1"));
    assert_eq!(event.value, None);
}

#[tokio::test]
async fn writer_fans_out_to_current_daily_and_history() {
    init_tracing();
    let store: Arc<dyn KeyedStore> = Arc::new(MemoryStore::new());
    let writer = HealthWriter::new(store.clone());

    // 2024-03-15T10:30:00Z
    let timestamp_ms = 1_710_498_600_000;
    let mut reading = reading_at(timestamp_ms);
    reading.heart_rate = Some(72);
    reading.steps = Some(5400);

    writer.write("u1", &reading).await.expect("write failed");

    let current = store.get(&keys::current("u1")).await.unwrap();
    let daily = store.get(&keys::daily("u1", "2024-03-15")).await.unwrap();
    let history = store
        .get(&keys::history("u1", timestamp_ms))
        .await
        .unwrap();

    assert!(current.is_some(), "current slot not written");
    assert_eq!(current, daily, "daily slot differs from current");
    assert_eq!(current, history, "history entry differs from current");
}

#[tokio::test]
async fn writer_overwrites_daily_slot_for_same_day() {
    init_tracing();
    let store: Arc<dyn KeyedStore> = Arc::new(MemoryStore::new());
    let writer = HealthWriter::new(store.clone());

    let mut first = reading_at(1_710_498_600_000);
    first.steps = Some(1000);
    let mut second = reading_at(1_710_502_200_000); // one hour later, same day
    second.steps = Some(2500);

    writer.write("u1", &first).await.unwrap();
    writer.write("u1", &second).await.unwrap();

    let daily = store
        .get(&keys::daily("u1", "2024-03-15"))
        .await
        .unwrap()
        .expect("daily slot missing");
    assert_eq!(daily["steps"], json!(2500), "daily slot should be last-write-wins");

    // Both syncs keep their own history entry
    let history = store.list(&keys::history_prefix("u1")).await.unwrap();
    assert_eq!(history.len(), 2);
}

#[tokio::test]
async fn absent_metrics_are_omitted_not_null() {
    init_tracing();
    let store: Arc<dyn KeyedStore> = Arc::new(MemoryStore::new());
    let writer = HealthWriter::new(store.clone());

    let mut reading = reading_at(1_710_498_600_000);
    reading.heart_rate = Some(68);
    reading.workouts = Some(WorkoutPayload::Many(vec![WorkoutSession {
        exercise_type: "Running".to_string(),
        duration_minutes: 30,
        title: None,
        start_time: None,
        end_time: None,
    }]));

    writer.write("u1", &reading).await.unwrap();

    let document = store
        .get(&keys::current("u1"))
        .await
        .unwrap()
        .expect("current slot missing");
    let object = document.as_object().expect("reading should be an object");

    assert!(object.contains_key("heartRate"));
    assert!(object.contains_key("workout"), "workout field uses its wire name");
    assert!(!object.contains_key("steps"), "absent metric must be omitted");
    assert!(!object.contains_key("sleepHours"));
    // Session titles were not set, so they should not appear either
    assert!(!document["workout"][0]
        .as_object()
        .unwrap()
        .contains_key("title"));
}
