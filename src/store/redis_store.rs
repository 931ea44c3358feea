//! Redis-backed implementation of the keyed store.
//!
//! Documents are stored as JSON strings under the keys of
//! [`crate::store::keys`]. Every mutation is also published on a single
//! pub/sub channel so read-side subscribers see changes without polling.

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::StreamExt;
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;

use super::{KeyedStore, StoreError, StoreEvent, StoreSubscription};

const EVENTS_CHANNEL: &str = "store:events";

#[derive(Clone)]
pub struct RedisStore {
    client: Arc<redis::Client>,
}

#[derive(Serialize, Deserialize)]
struct WireEvent {
    key: String,
    value: Option<Value>,
}

impl RedisStore {
    pub fn new(client: Arc<redis::Client>) -> Self {
        Self { client }
    }

    async fn connection(&self) -> Result<redis::aio::Connection, StoreError> {
        Ok(self.client.get_async_connection().await?)
    }

    async fn publish_event(&self, key: &str, value: Option<Value>) -> Result<(), StoreError> {
        let payload = serde_json::to_string(&WireEvent {
            key: key.to_string(),
            value,
        })
        .map_err(|e| StoreError::Backend(e.to_string()))?;
        let mut con = self.connection().await?;
        let _: () = con.publish(EVENTS_CHANNEL, payload).await?;
        Ok(())
    }
}

#[async_trait]
impl KeyedStore for RedisStore {
    async fn put(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let payload = value.to_string();
        let mut con = self.connection().await?;
        let _: () = con.set(key, payload).await?;
        self.publish_event(key, Some(value)).await
    }

    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let mut con = self.connection().await?;
        let raw: Option<String> = con.get(key).await?;
        match raw {
            None => Ok(None),
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|source| StoreError::Corrupt {
                    key: key.to_string(),
                    source,
                }),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut con = self.connection().await?;
        let _: () = con.del(key).await?;
        self.publish_event(key, None).await
    }

    async fn list(&self, prefix: &str) -> Result<Vec<(String, Value)>, StoreError> {
        let mut con = self.connection().await?;
        // KEYS is acceptable at the per-account cardinalities this keyspace
        // sees; swap for SCAN before pointing this at a shared instance.
        let mut keys: Vec<String> = con.keys(format!("{}*", prefix)).await?;
        keys.sort();
        let mut entries = Vec::with_capacity(keys.len());
        for key in keys {
            let raw: Option<String> = con.get(&key).await?;
            if let Some(raw) = raw {
                let value =
                    serde_json::from_str(&raw).map_err(|source| StoreError::Corrupt {
                        key: key.clone(),
                        source,
                    })?;
                entries.push((key, value));
            }
        }
        Ok(entries)
    }

    async fn subscribe(&self, prefix: &str) -> Result<StoreSubscription, StoreError> {
        let con = self.client.get_async_connection().await?;
        let mut pubsub = con.into_pubsub();
        pubsub.subscribe(EVENTS_CHANNEL).await?;

        let prefix = prefix.to_string();
        let (tx, rx) = mpsc::channel(64);
        let handle = tokio::spawn(async move {
            let mut stream = pubsub.on_message();
            while let Some(msg) = stream.next().await {
                let payload: String = match msg.get_payload() {
                    Ok(payload) => payload,
                    Err(e) => {
                        tracing::warn!("dropping malformed store event: {}", e);
                        continue;
                    }
                };
                let event: WireEvent = match serde_json::from_str(&payload) {
                    Ok(event) => event,
                    Err(e) => {
                        tracing::warn!("dropping undecodable store event: {}", e);
                        continue;
                    }
                };
                if event.key.starts_with(&prefix) {
                    let forwarded = StoreEvent {
                        key: event.key,
                        value: event.value,
                    };
                    if tx.send(forwarded).await.is_err() {
                        break;
                    }
                }
            }
        });
        Ok(StoreSubscription::new(rx, handle))
    }
}
