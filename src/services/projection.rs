//! Read-side projector: reshapes store snapshots into the small set of
//! view-ready records. The projection functions are pure; the service
//! wires them to store reads and subscriptions.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::models::health_data::Reading;
use crate::store::{keys, KeyedStore, StoreError, StoreSubscription};

pub const PAGE_SIZE: usize = 25;

/// One history row with the workout payload flattened to total minutes for
/// tabular display.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub key: String,
    pub workout_minutes: f64,
    #[serde(flatten)]
    pub reading: Reading,
}

#[derive(Debug, Serialize)]
pub struct HistoryPage {
    pub entries: Vec<HistoryEntry>,
    pub page: usize,
    pub total_pages: usize,
    pub total_entries: usize,
}

#[derive(Debug, Serialize)]
pub struct CurrentView {
    /// `None` renders as the "waiting for data" state.
    pub reading: Option<Reading>,
}

/// Decode and order raw history entries most-recent first.
pub fn project_history(raw: Vec<(String, Value)>) -> Vec<HistoryEntry> {
    let mut entries: Vec<HistoryEntry> = raw
        .into_iter()
        .filter_map(|(key, value)| match serde_json::from_value::<Reading>(value) {
            Ok(reading) => Some(HistoryEntry {
                key: keys::history_entry_id(&key).to_string(),
                workout_minutes: reading.workout_minutes(),
                reading,
            }),
            Err(e) => {
                tracing::warn!("Skipping undecodable history entry {}: {}", key, e);
                None
            }
        })
        .collect();
    entries.sort_by_key(|e| std::cmp::Reverse(e.reading.timestamp));
    entries
}

/// Page `page` (1-based) of the reverse-chronological sequence: entries
/// [(page-1)*25, page*25).
pub fn paginate(entries: &[HistoryEntry], page: usize) -> HistoryPage {
    let page = page.max(1);
    let total_entries = entries.len();
    let total_pages = total_entries.div_ceil(PAGE_SIZE).max(1);
    // `page` is caller-supplied; an offset that does not fit in usize is
    // just a page past the end
    let start = page
        .checked_sub(1)
        .and_then(|p| p.checked_mul(PAGE_SIZE))
        .unwrap_or(usize::MAX);
    let page_entries = if start >= total_entries {
        Vec::new()
    } else {
        entries[start..(start + PAGE_SIZE).min(total_entries)].to_vec()
    };
    HistoryPage {
        entries: page_entries,
        page,
        total_pages,
        total_entries,
    }
}

pub fn project_current(value: Option<Value>) -> CurrentView {
    let reading = value.and_then(|v| match serde_json::from_value::<Reading>(v) {
        Ok(reading) => Some(reading),
        Err(e) => {
            tracing::warn!("Current slot holds an undecodable reading: {}", e);
            None
        }
    });
    CurrentView { reading }
}

pub struct ProjectionService {
    store: Arc<dyn KeyedStore>,
}

impl ProjectionService {
    pub fn new(store: Arc<dyn KeyedStore>) -> Self {
        Self { store }
    }

    pub async fn current(&self, account_id: &str) -> Result<CurrentView, StoreError> {
        let value = self.store.get(&keys::current(account_id)).await?;
        Ok(project_current(value))
    }

    /// Live view of the current slot. Each store event maps to a fresh
    /// [`CurrentView`]; the caller decides how to render it.
    pub async fn watch_current(&self, account_id: &str) -> Result<CurrentWatch, StoreError> {
        let subscription = self.store.subscribe(&keys::current(account_id)).await?;
        Ok(CurrentWatch { subscription })
    }

    pub async fn daily(&self, account_id: &str, date: &str) -> Result<CurrentView, StoreError> {
        let value = self.store.get(&keys::daily(account_id, date)).await?;
        Ok(project_current(value))
    }

    pub async fn history_page(
        &self,
        account_id: &str,
        page: usize,
    ) -> Result<HistoryPage, StoreError> {
        let raw = self.store.list(&keys::history_prefix(account_id)).await?;
        let entries = project_history(raw);
        Ok(paginate(&entries, page))
    }
}

pub struct CurrentWatch {
    subscription: StoreSubscription,
}

impl CurrentWatch {
    /// Next update of the current slot; `None` when the subscription ends.
    pub async fn next(&mut self) -> Option<CurrentView> {
        let event = self.subscription.next().await?;
        Some(project_current(event.value))
    }
}
