//! Prediction endpoints. The app under test points at an unroutable
//! prediction service, so these cover the local decision points: data
//! prerequisites, profile validation, and unreachable-service mapping.

mod common;
use common::utils::{reading_at, register_and_login, spawn_app};

use serde_json::json;

use healthsync_backend::store::keys;

async fn seed_current(app: &common::utils::TestApp, account_id: &str) {
    let mut reading = reading_at(1_710_498_600_000);
    reading.heart_rate = Some(72);
    app.store
        .put(
            &keys::current(account_id),
            serde_json::to_value(&reading).unwrap(),
        )
        .await
        .unwrap();
}

fn complete_profile() -> serde_json::Value {
    json!({
        "age": 45,
        "gender": "female",
        "heightCm": 170.0,
        "weightKg": 65.0,
        "smoking": false,
        "alcohol": false,
        "physicalActivity": true
    })
}

#[tokio::test]
async fn prediction_without_data_is_not_found() {
    let app = spawn_app().await;
    let account = register_and_login(&app, "patient").await;

    let client = reqwest::Client::new();
    let response = client
        .post(format!("{}/patients/me/predict", app.address))
        .bearer_auth(&account.token)
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn unreachable_prediction_service_maps_to_service_unavailable() {
    let app = spawn_app().await;
    let account = register_and_login(&app, "patient").await;
    seed_current(&app, &account.account_id).await;

    let client = reqwest::Client::new();
    let response = client
        .post(format!("{}/patients/me/predict", app.address))
        .bearer_auth(&account.token)
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(response.status().as_u16(), 503);
}

#[tokio::test]
async fn incomplete_cardio_profile_is_unprocessable() {
    let app = spawn_app().await;
    let account = register_and_login(&app, "patient").await;
    seed_current(&app, &account.account_id).await;

    let mut profile = complete_profile();
    profile.as_object_mut().unwrap().remove("smoking");

    let client = reqwest::Client::new();
    let response = client
        .post(format!("{}/patients/me/predict_cardio", app.address))
        .bearer_auth(&account.token)
        .json(&profile)
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(response.status().as_u16(), 422);

    let body: serde_json::Value = response.json().await.unwrap();
    assert!(
        body["message"].as_str().unwrap().contains("smoking"),
        "the missing field should be named"
    );
}

#[tokio::test]
async fn complete_profile_reaches_the_request_stage() {
    let app = spawn_app().await;
    let account = register_and_login(&app, "patient").await;
    seed_current(&app, &account.account_id).await;

    // Validation passes; the unroutable service turns into a 503 rather
    // than a 422
    let client = reqwest::Client::new();
    let response = client
        .post(format!("{}/patients/me/predict_cardio", app.address))
        .bearer_auth(&account.token)
        .json(&complete_profile())
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(response.status().as_u16(), 503);
}
