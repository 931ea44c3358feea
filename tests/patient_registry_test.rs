//! Patient code assignment and resolution.

mod common;
use common::utils::init_tracing;

use std::sync::Arc;

use healthsync_backend::services::PatientRegistry;
use healthsync_backend::store::{KeyedStore, MemoryStore};

fn registry() -> PatientRegistry {
    let store: Arc<dyn KeyedStore> = Arc::new(MemoryStore::new());
    PatientRegistry::new(store)
}

#[tokio::test]
async fn codes_are_assigned_sequentially() {
    init_tracing();
    let registry = registry();

    let first = registry.assign_code("acct-a", "Alice", "alice@test.com").await.unwrap();
    let second = registry.assign_code("acct-b", "Bob", "bob@test.com").await.unwrap();
    assert_eq!(first, "P1");
    assert_eq!(second, "P2");
}

#[tokio::test]
async fn assignment_is_idempotent_per_account() {
    init_tracing();
    let registry = registry();

    let first = registry.assign_code("acct-a", "Alice", "alice@test.com").await.unwrap();
    let again = registry.assign_code("acct-a", "Alice", "alice@test.com").await.unwrap();
    assert_eq!(first, again, "re-registration must not burn a new code");

    let next = registry.assign_code("acct-b", "Bob", "bob@test.com").await.unwrap();
    assert_eq!(next, "P2");
}

#[tokio::test]
async fn resolve_maps_codes_and_passes_raw_ids_through() {
    init_tracing();
    let registry = registry();
    registry.assign_code("acct-a", "Alice", "alice@test.com").await.unwrap();

    assert_eq!(
        registry.resolve("P1").await.unwrap(),
        Some("acct-a".to_string())
    );
    // Anything not shaped like a code is treated as an account id already
    assert_eq!(
        registry.resolve("acct-zzz").await.unwrap(),
        Some("acct-zzz".to_string())
    );
    assert_eq!(registry.resolve("P999").await.unwrap(), None);
    assert_eq!(registry.resolve("").await.unwrap(), None);
}

#[tokio::test]
async fn reverse_lookup_finds_the_code() {
    init_tracing();
    let registry = registry();
    registry.assign_code("acct-a", "Alice", "alice@test.com").await.unwrap();
    registry.assign_code("acct-b", "Bob", "bob@test.com").await.unwrap();

    assert_eq!(
        registry.reverse_lookup("acct-b").await.unwrap(),
        Some("P2".to_string())
    );
    assert_eq!(registry.reverse_lookup("acct-unknown").await.unwrap(), None);
}

#[tokio::test]
async fn patient_info_is_written_alongside_the_mapping() {
    init_tracing();
    let registry = registry();
    registry.assign_code("acct-a", "Alice", "alice@test.com").await.unwrap();

    let info = registry.patient_info("P1").await.unwrap().expect("info missing");
    assert_eq!(info.name, "Alice");
    assert_eq!(info.email, "alice@test.com");
    assert_eq!(info.uid, "acct-a");

    assert!(registry.patient_info("P999").await.unwrap().is_none());
}

#[tokio::test]
async fn all_patients_is_sorted_by_code() {
    init_tracing();
    let registry = registry();
    registry.assign_code("acct-a", "Alice", "alice@test.com").await.unwrap();
    registry.assign_code("acct-b", "Bob", "bob@test.com").await.unwrap();

    let patients = registry.all_patients().await.unwrap();
    assert_eq!(patients.len(), 2);
    assert_eq!(patients[0].code, "P1");
    assert_eq!(patients[0].account_id, "acct-a");
    assert_eq!(patients[0].name, "Alice");
    assert_eq!(patients[1].code, "P2");
}

#[tokio::test]
async fn all_patients_orders_double_digit_codes_numerically() {
    init_tracing();
    let registry = registry();
    for i in 1..=11 {
        registry
            .assign_code(&format!("acct-{}", i), "Name", "name@test.com")
            .await
            .unwrap();
    }

    let patients = registry.all_patients().await.unwrap();
    let codes: Vec<&str> = patients.iter().map(|p| p.code.as_str()).collect();
    // Text order would put "P10" and "P11" right after "P1"
    assert_eq!(codes[0], "P1");
    assert_eq!(codes[1], "P2");
    assert_eq!(codes[9], "P10");
    assert_eq!(codes[10], "P11");
}
