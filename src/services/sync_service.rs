//! One sync attempt: authenticated context → permission check → collect →
//! write, with the fatal/retryable split the job runner relies on.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use thiserror::Error;

use crate::models::health_data::Reading;
use crate::provider::{DeviceDataProvider, MetricPermission};
use crate::services::collector::HealthCollector;
use crate::services::writer::HealthWriter;
use crate::store::{keys, KeyedStore, StoreError};

#[derive(Debug, Error)]
pub enum SyncError {
    /// No account context: requires the user to log in, never retried.
    #[error("no authenticated account context")]
    NotAuthenticated,
    /// Read permission missing for at least one metric category: requires
    /// user action, never retried.
    #[error("missing device permissions: {0:?}")]
    MissingPermissions(Vec<MetricPermission>),
    /// The device gateway is unreachable; retried on the next cadence.
    #[error("device data provider is unreachable")]
    ProviderUnavailable,
    /// A store write failed mid-fanout; retried on the next cadence.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SyncError {
    /// Fatal errors need user action, not time; the scheduler does not
    /// retry them.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SyncError::NotAuthenticated | SyncError::MissingPermissions(_)
        )
    }
}

pub struct SyncService {
    provider: Arc<dyn DeviceDataProvider>,
    collector: HealthCollector,
    writer: HealthWriter,
    store: Arc<dyn KeyedStore>,
}

impl SyncService {
    pub fn new(
        provider: Arc<dyn DeviceDataProvider>,
        collector: HealthCollector,
        writer: HealthWriter,
        store: Arc<dyn KeyedStore>,
    ) -> Self {
        Self {
            provider,
            collector,
            writer,
            store,
        }
    }

    /// Run a single sync attempt for `account_id`. Shared by the periodic
    /// job and the on-demand "sync now" endpoint; overlapping attempts race
    /// benignly because every write target is last-write-wins or keyed by
    /// the attempt's own timestamp.
    pub async fn run_once(&self, account_id: Option<&str>) -> Result<Reading, SyncError> {
        let started_at = Utc::now();
        tracing::info!("🔔 Sync started at {}", started_at.format("%H:%M:%S"));

        let account_id = account_id.ok_or(SyncError::NotAuthenticated)?;
        self.record_status(account_id, "running", None).await;

        let result = self.attempt(account_id).await;
        match &result {
            Ok(reading) => {
                tracing::info!(
                    "✅ Sync completed for {}: steps={:?}",
                    account_id,
                    reading.steps
                );
                self.record_status(account_id, "success", None).await;
            }
            Err(e) if e.is_fatal() => {
                tracing::error!("❌ Sync failed fatally for {}: {}", account_id, e);
                self.record_status(account_id, "fatal", Some(&e.to_string()))
                    .await;
            }
            Err(e) => {
                tracing::warn!("❌ Sync failed for {} (will retry): {}", account_id, e);
                self.record_status(account_id, "retryable", Some(&e.to_string()))
                    .await;
            }
        }
        result
    }

    async fn attempt(&self, account_id: &str) -> Result<Reading, SyncError> {
        if !self.provider.is_available().await {
            return Err(SyncError::ProviderUnavailable);
        }

        let granted = self
            .provider
            .granted_permissions()
            .await
            .map_err(|_| SyncError::ProviderUnavailable)?;
        let missing: Vec<MetricPermission> = MetricPermission::all()
            .into_iter()
            .filter(|p| !granted.contains(p))
            .collect();
        if !missing.is_empty() {
            return Err(SyncError::MissingPermissions(missing));
        }

        let reading = self.collector.collect(Utc::now()).await;
        self.writer.write(account_id, &reading).await?;
        Ok(reading)
    }

    /// Sync-cadence observability record; best effort, never fails the
    /// attempt itself.
    async fn record_status(&self, account_id: &str, state: &str, detail: Option<&str>) {
        let status = json!({
            "state": state,
            "detail": detail,
            "at": Utc::now().timestamp_millis(),
        });
        if let Err(e) = self.store.put(&keys::sync_status(account_id), status).await {
            tracing::warn!("Failed to record sync status: {}", e);
        }
    }
}
