//! History pagination, payload-shape tolerance, and the current-slot views.

mod common;
use common::utils::{init_tracing, reading_at};

use std::sync::Arc;

use serde_json::json;
use tokio::time::{timeout, Duration};

use healthsync_backend::models::health_data::{Reading, WorkoutPayload};
use healthsync_backend::services::projection::{
    paginate, project_current, project_history, PAGE_SIZE,
};
use healthsync_backend::services::ProjectionService;
use healthsync_backend::store::{keys, KeyedStore, MemoryStore};

async fn seed_history(store: &Arc<dyn KeyedStore>, account_id: &str, count: i64) {
    for i in 0..count {
        let mut reading = reading_at(1_710_000_000_000 + i * 60_000);
        reading.steps = Some(i);
        store
            .put(
                &keys::history(account_id, reading.timestamp),
                serde_json::to_value(&reading).unwrap(),
            )
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn sixty_entries_paginate_into_three_pages() {
    init_tracing();
    let store: Arc<dyn KeyedStore> = Arc::new(MemoryStore::new());
    seed_history(&store, "u1", 60).await;

    let service = ProjectionService::new(store);

    let page1 = service.history_page("u1", 1).await.unwrap();
    assert_eq!(page1.entries.len(), PAGE_SIZE);
    assert_eq!(page1.total_pages, 3);
    assert_eq!(page1.total_entries, 60);
    // Newest first: the highest step count was written last
    assert_eq!(page1.entries[0].reading.steps, Some(59));
    assert_eq!(page1.entries[24].reading.steps, Some(35));

    let page3 = service.history_page("u1", 3).await.unwrap();
    assert_eq!(page3.entries.len(), 10);
    assert_eq!(page3.entries[9].reading.steps, Some(0), "oldest entry lands last");
}

#[tokio::test]
async fn page_beyond_the_end_is_empty_but_keeps_totals() {
    init_tracing();
    let store: Arc<dyn KeyedStore> = Arc::new(MemoryStore::new());
    seed_history(&store, "u1", 10).await;

    let service = ProjectionService::new(store);
    let page = service.history_page("u1", 5).await.unwrap();
    assert!(page.entries.is_empty());
    assert_eq!(page.page, 5);
    assert_eq!(page.total_pages, 1);
    assert_eq!(page.total_entries, 10);
}

#[tokio::test]
async fn empty_history_is_one_empty_page() {
    init_tracing();
    let store: Arc<dyn KeyedStore> = Arc::new(MemoryStore::new());
    let service = ProjectionService::new(store);

    let page = service.history_page("nobody", 1).await.unwrap();
    assert!(page.entries.is_empty());
    assert_eq!(page.total_pages, 1);
    assert_eq!(page.total_entries, 0);
}

#[test]
fn page_zero_is_clamped_to_one() {
    let entries = Vec::new();
    let page = paginate(&entries, 0);
    assert_eq!(page.page, 1);
}

#[test]
fn absurdly_large_page_numbers_are_just_empty_pages() {
    // The page offset must not overflow for any caller-supplied value
    let mut reading = reading_at(1000);
    reading.steps = Some(1);
    let entries = project_history(vec![(
        keys::history("u1", 1000),
        serde_json::to_value(&reading).unwrap(),
    )]);

    let page = paginate(&entries, usize::MAX);
    assert!(page.entries.is_empty());
    assert_eq!(page.total_entries, 1);

    let page = paginate(&entries, usize::MAX / PAGE_SIZE + 1);
    assert!(page.entries.is_empty());
}

#[test]
fn history_orders_by_timestamp_not_key_text() {
    // "900" sorts after "1000" lexicographically
    let mut older = reading_at(900);
    older.steps = Some(1);
    let mut newer = reading_at(1000);
    newer.steps = Some(2);

    let entries = project_history(vec![
        (keys::history("u1", 1000), serde_json::to_value(&newer).unwrap()),
        (keys::history("u1", 900), serde_json::to_value(&older).unwrap()),
    ]);
    assert_eq!(entries[0].reading.steps, Some(2));
    assert_eq!(entries[0].key, "1000");
    assert_eq!(entries[1].key, "900");
}

#[test]
fn undecodable_history_entries_are_skipped() {
    let mut good = reading_at(1000);
    good.steps = Some(5);

    let entries = project_history(vec![
        (keys::history("u1", 500), json!("not a reading")),
        (keys::history("u1", 1000), serde_json::to_value(&good).unwrap()),
    ]);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].reading.steps, Some(5));
}

#[test]
fn workout_payload_decodes_all_three_historical_shapes() {
    // Old simulator payloads wrote a bare minutes figure
    let bare: Reading = serde_json::from_value(json!({
        "timestamp": 1000, "source": "sim", "workout": 42.0
    }))
    .unwrap();
    assert_eq!(bare.workout_minutes(), 42.0);

    let single: Reading = serde_json::from_value(json!({
        "timestamp": 1000, "source": "sim",
        "workout": { "exerciseType": "Running", "durationMinutes": 30 }
    }))
    .unwrap();
    assert_eq!(single.workout_minutes(), 30.0);

    let many: Reading = serde_json::from_value(json!({
        "timestamp": 1000, "source": "sim",
        "workout": [
            { "exerciseType": "Running", "durationMinutes": 30 },
            { "exerciseType": "Walking", "durationMinutes": 15 }
        ]
    }))
    .unwrap();
    assert_eq!(many.workout_minutes(), 45.0);
    assert_eq!(many.workouts.as_ref().unwrap().sessions().len(), 2);
}

#[test]
fn bare_minutes_payload_normalizes_to_one_generic_session() {
    let payload = WorkoutPayload::Minutes(42.4);
    let sessions = payload.sessions();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].exercise_type, "Workout");
    assert_eq!(sessions[0].duration_minutes, 42);
}

#[test]
fn current_view_tolerates_missing_and_corrupt_slots() {
    assert!(project_current(None).reading.is_none());
    assert!(project_current(Some(json!("garbage"))).reading.is_none());

    let mut reading = reading_at(1000);
    reading.heart_rate = Some(70);
    let view = project_current(Some(serde_json::to_value(&reading).unwrap()));
    assert_eq!(view.reading.unwrap().heart_rate, Some(70));
}

#[tokio::test]
async fn watch_current_delivers_updates_as_views() {
    init_tracing();
    let store: Arc<dyn KeyedStore> = Arc::new(MemoryStore::new());
    let service = ProjectionService::new(store.clone());

    let mut watch = service.watch_current("u1").await.unwrap();

    let mut reading = reading_at(1000);
    reading.heart_rate = Some(88);
    store
        .put(&keys::current("u1"), serde_json::to_value(&reading).unwrap())
        .await
        .unwrap();

    let view = timeout(Duration::from_secs(2), watch.next())
        .await
        .expect("no update within 2s")
        .expect("subscription closed");
    assert_eq!(view.reading.unwrap().heart_rate, Some(88));
}
