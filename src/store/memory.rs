//! In-memory store used by the test suite and local experiments. Shares the
//! change-notification contract with the Redis implementation via a
//! broadcast channel.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{broadcast, mpsc, RwLock};

use super::{KeyedStore, StoreError, StoreEvent, StoreSubscription};

pub struct MemoryStore {
    data: Arc<RwLock<BTreeMap<String, Value>>>,
    events: broadcast::Sender<StoreEvent>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(256);
        Self {
            data: Arc::new(RwLock::new(BTreeMap::new())),
            events,
        }
    }

    fn notify(&self, key: &str, value: Option<Value>) {
        // No receivers is fine; nobody is watching.
        let _ = self.events.send(StoreEvent {
            key: key.to_string(),
            value,
        });
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyedStore for MemoryStore {
    async fn put(&self, key: &str, value: Value) -> Result<(), StoreError> {
        self.data
            .write()
            .await
            .insert(key.to_string(), value.clone());
        self.notify(key, Some(value));
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.data.read().await.get(key).cloned())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.data.write().await.remove(key);
        self.notify(key, None);
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<(String, Value)>, StoreError> {
        let data = self.data.read().await;
        Ok(data
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    async fn subscribe(&self, prefix: &str) -> Result<StoreSubscription, StoreError> {
        let mut events = self.events.subscribe();
        let prefix = prefix.to_string();
        let (tx, rx) = mpsc::channel(64);
        let handle = tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => {
                        if event.key.starts_with(&prefix) && tx.send(event).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!("store subscription lagged, skipped {} events", skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
        Ok(StoreSubscription::new(rx, handle))
    }
}
