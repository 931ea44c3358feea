use std::net::TcpListener;
use std::sync::Arc;

use once_cell::sync::Lazy;
use secrecy::SecretString;
use serde_json::json;
use uuid::Uuid;

use healthsync_backend::config::jwt::JwtSettings;
use healthsync_backend::config::prediction::PredictionSettings;
use healthsync_backend::config::settings::SyncSettings;
use healthsync_backend::models::health_data::Reading;
use healthsync_backend::provider::DeviceDataProvider;
use healthsync_backend::run;
use healthsync_backend::services::telemetry::{get_subscriber, init_subscriber};
use healthsync_backend::services::{
    HealthCollector, HealthWriter, PredictionClient, SyncScheduler, SyncService,
};
use healthsync_backend::store::{KeyedStore, MemoryStore};

use super::provider::MockProvider;

pub const DEVICE_SOURCE: &str = "amazfit_pace";
pub const EXCLUDED_SOURCE: &str = "com.google.android.apps.fitness";

// Ensure that the `tracing` stack is only initialised once using `once_cell`
static TRACING: Lazy<()> = Lazy::new(|| {
    let default_filter_level = "info".to_string();
    let subscriber_name = "test".to_string();

    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::stdout);
        init_subscriber(subscriber);
    } else {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::sink);
        init_subscriber(subscriber);
    }
});

pub fn init_tracing() {
    Lazy::force(&TRACING);
}

pub fn sync_settings() -> SyncSettings {
    SyncSettings {
        device_source: DEVICE_SOURCE.to_string(),
        excluded_source: EXCLUDED_SOURCE.to_string(),
    }
}

/// Reading with only the envelope fields set; tests fill in metrics.
pub fn reading_at(timestamp_ms: i64) -> Reading {
    Reading::empty(timestamp_ms, DEVICE_SOURCE)
}

pub struct TestApp {
    pub address: String,
    pub store: Arc<dyn KeyedStore>,
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with_provider(Arc::new(MockProvider::granted_all())).await
}

pub async fn spawn_app_with_provider(provider: Arc<dyn DeviceDataProvider>) -> TestApp {
    // The first time `initialize` is invoked the code in `TRACING` is executed.
    // All other invocations will instead skip execution.
    Lazy::force(&TRACING);

    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    // Get port assigned by the OS
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let store: Arc<dyn KeyedStore> = Arc::new(MemoryStore::new());
    let collector = HealthCollector::new(provider.clone(), &sync_settings());
    let writer = HealthWriter::new(store.clone());
    let sync_service = Arc::new(SyncService::new(
        provider,
        collector,
        writer,
        store.clone(),
    ));
    let scheduler = Arc::new(
        SyncScheduler::new(sync_service.clone())
            .await
            .expect("Failed to create scheduler"),
    );
    scheduler.start().await.expect("Failed to start scheduler");
    let jwt_settings = JwtSettings::new("test-secret".to_string(), 24);
    // Unroutable endpoint; prediction tests only exercise the error paths
    let prediction = PredictionClient::new(&PredictionSettings::new(
        "http://127.0.0.1:9".to_string(),
        SecretString::new("test-key".to_string().into_boxed_str()),
    ));

    let server = run(
        listener,
        store.clone(),
        jwt_settings,
        sync_service,
        scheduler,
        prediction,
    )
    .expect("Failed to bind address");
    // Launch the server as a background task
    let _ = tokio::spawn(server);

    TestApp { address, store }
}

pub struct TestAccount {
    pub token: String,
    pub account_id: String,
    pub patient_id: Option<String>,
}

/// Register an account with a unique email and log it in.
pub async fn register_and_login(app: &TestApp, role: &str) -> TestAccount {
    let client = reqwest::Client::new();
    let email = format!("user_{}@test.com", &Uuid::new_v4().to_string()[..8]);

    let response = client
        .post(format!("{}/register_user", app.address))
        .json(&json!({
            "email": email,
            "full_name": "Test User",
            "role": role,
            "password": "password123"
        }))
        .send()
        .await
        .expect("Failed to execute registration request");
    assert!(response.status().is_success(), "Registration should succeed");
    let registered: serde_json::Value = response.json().await.expect("Invalid registration body");
    let account_id = registered["accountId"]
        .as_str()
        .expect("Missing accountId")
        .to_string();
    let patient_id = registered["patientId"].as_str().map(str::to_string);

    let response = client
        .post(format!("{}/login", app.address))
        .json(&json!({ "email": email, "password": "password123" }))
        .send()
        .await
        .expect("Failed to execute login request");
    assert!(response.status().is_success(), "Login should succeed");
    let body: serde_json::Value = response.json().await.expect("Invalid login body");
    let token = body["token"].as_str().expect("Missing token").to_string();

    TestAccount {
        token,
        account_id,
        patient_id,
    }
}
