//! Denormalized store writer: fans one reading out to the three locations
//! of the account keyspace, in a fixed order.

use std::sync::Arc;

use serde_json::Value;

use crate::models::health_data::Reading;
use crate::store::{keys, KeyedStore, StoreError};

pub struct HealthWriter {
    store: Arc<dyn KeyedStore>,
}

impl HealthWriter {
    pub fn new(store: Arc<dyn KeyedStore>) -> Self {
        Self { store }
    }

    /// Writes `current`, then `daily/{date}`, then `history/{timestamp}`.
    /// Each write is a full overwrite of the target key. On failure the
    /// already-completed writes are NOT rolled back; the caller retries the
    /// whole attempt and the overwrite semantics converge the store.
    pub async fn write(&self, account_id: &str, reading: &Reading) -> Result<(), StoreError> {
        let document = to_document(reading);

        self.store
            .put(&keys::current(account_id), document.clone())
            .await?;
        tracing::info!("✅ Current data updated: health_data/{}/current", account_id);

        let date = reading.daily_key();
        self.store
            .put(&keys::daily(account_id, &date), document.clone())
            .await?;
        tracing::info!(
            "✅ Daily summary updated: health_data/{}/daily/{}",
            account_id,
            date
        );

        self.store
            .put(&keys::history(account_id, reading.timestamp), document)
            .await?;
        tracing::info!(
            "✅ History entry created: health_data/{}/history/{}",
            account_id,
            reading.timestamp
        );

        Ok(())
    }
}

fn to_document(reading: &Reading) -> Value {
    // Reading serialization skips absent metrics, so the document never
    // contains explicit nulls.
    serde_json::to_value(reading).expect("Reading is always serializable")
}
