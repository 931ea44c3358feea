//! Keyed document store backing the whole denormalized data model.
//!
//! Every component talks to the store through [`KeyedStore`] so tests can
//! substitute the in-memory implementation for the Redis one. Values are
//! plain JSON documents; writes are full overwrites of the target key.

pub mod keys;
pub mod memory;
pub mod redis_store;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub use memory::MemoryStore;
pub use redis_store::RedisStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store backend unavailable: {0}")]
    Backend(String),
    #[error("stored value at {key} is not valid JSON: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

impl From<redis::RedisError> for StoreError {
    fn from(e: redis::RedisError) -> Self {
        StoreError::Backend(e.to_string())
    }
}

/// Change notification delivered to subscribers. `value` is `None` for a
/// deletion.
#[derive(Debug, Clone)]
pub struct StoreEvent {
    pub key: String,
    pub value: Option<Value>,
}

/// Live subscription to a key prefix. Dropping the handle cancels the
/// forwarding task.
pub struct StoreSubscription {
    rx: mpsc::Receiver<StoreEvent>,
    handle: JoinHandle<()>,
}

impl StoreSubscription {
    pub fn new(rx: mpsc::Receiver<StoreEvent>, handle: JoinHandle<()>) -> Self {
        Self { rx, handle }
    }

    pub async fn next(&mut self) -> Option<StoreEvent> {
        self.rx.recv().await
    }
}

impl Drop for StoreSubscription {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[async_trait]
pub trait KeyedStore: Send + Sync {
    /// Full overwrite of `key` with `value`.
    async fn put(&self, key: &str, value: Value) -> Result<(), StoreError>;

    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    async fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// All entries whose key starts with `prefix`, in ascending key order.
    async fn list(&self, prefix: &str) -> Result<Vec<(String, Value)>, StoreError>;

    /// Subscribe to changes of all keys under `prefix`.
    async fn subscribe(&self, prefix: &str) -> Result<StoreSubscription, StoreError>;
}
