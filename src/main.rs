use std::net::TcpListener;
use std::sync::Arc;

use secrecy::ExposeSecret;

use healthsync_backend::config::settings::{get_config, get_jwt_settings};
use healthsync_backend::provider::gateway::DeviceGatewayClient;
use healthsync_backend::provider::DeviceDataProvider;
use healthsync_backend::run;
use healthsync_backend::services::telemetry::{get_subscriber, init_subscriber};
use healthsync_backend::services::{
    HealthCollector, HealthWriter, PredictionClient, SyncScheduler, SyncService,
};
use healthsync_backend::store::redis_store::RedisStore;
use healthsync_backend::store::KeyedStore;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Panic if we can't read the config
    let config = get_config().expect("Failed to read the config.");

    let subscriber = get_subscriber(
        "healthsync-backend".into(),
        config.application.log_level.clone(),
        std::io::stdout,
    );
    init_subscriber(subscriber);

    // JWT
    let jwt_settings = get_jwt_settings(&config);

    // Redis is the single document store; without it there is nothing to
    // serve, so fail fast.
    let redis_client = match redis::Client::open(config.redis.get_redis_url().expose_secret()) {
        Ok(client) => {
            tracing::info!("Redis client created successfully");
            Arc::new(client)
        }
        Err(e) => {
            tracing::error!("❌ Failed to create Redis client: {}", e);
            eprintln!("Failed to create Redis client: {}", e);
            std::process::exit(1);
        }
    };
    let store: Arc<dyn KeyedStore> = Arc::new(RedisStore::new(redis_client));

    // Device data comes in through the gateway; readings go out through the
    // writer. The sync service ties the two together.
    let provider: Arc<dyn DeviceDataProvider> = Arc::new(DeviceGatewayClient::new(&config.gateway));
    let collector = HealthCollector::new(provider.clone(), &config.sync);
    let writer = HealthWriter::new(store.clone());
    let sync_service = Arc::new(SyncService::new(provider, collector, writer, store.clone()));

    let scheduler = match SyncScheduler::new(sync_service.clone()).await {
        Ok(scheduler) => match scheduler.start().await {
            Ok(_) => {
                tracing::info!("✅ Sync scheduler started successfully");
                Arc::new(scheduler)
            }
            Err(e) => {
                tracing::error!("❌ Failed to start sync scheduler: {}", e);
                std::process::exit(1);
            }
        },
        Err(e) => {
            tracing::error!("❌ Failed to create sync scheduler: {}", e);
            std::process::exit(1);
        }
    };

    let prediction = PredictionClient::new(&config.prediction);

    let address = format!("{}:{}", config.application.host, config.application.port);
    let listener = TcpListener::bind(&address)?;

    run(
        listener,
        store,
        jwt_settings,
        sync_service,
        scheduler,
        prediction,
    )?
    .await
}
