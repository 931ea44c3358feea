//! Rule engine: fixed-threshold classification of readings into alerts and
//! a coarse headline risk level.
//!
//! Alerts are derived, never stored. Only the read flag is persisted, keyed
//! by the deterministic alert id, so acknowledgements survive recomputation.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::{json, Value};

use crate::models::alert::{AlertRecord, RiskLevel, Severity};
use crate::models::health_data::Reading;
use crate::store::{keys, KeyedStore, StoreError};

/// Deterministic id for a (history entry, rule) pair. Rule names keep their
/// display spelling; spaces become underscores.
pub fn alert_id(entry_key: &str, rule: &str) -> String {
    format!("{}_{}", entry_key, rule.replace(' ', "_"))
}

/// Evaluate one history entry. At most one rule fires per metric family, so
/// an entry produces zero to three alerts.
pub fn evaluate_entry(entry_key: &str, reading: &Reading) -> Vec<AlertRecord> {
    let mut alerts = Vec::new();
    let ts = reading.timestamp;

    let mut push = |rule: &str, category: &str, message: String, severity: Severity| {
        alerts.push(AlertRecord {
            id: alert_id(entry_key, rule),
            category: category.to_string(),
            message,
            severity,
            timestamp: ts,
        });
    };

    // Heart rate: exclusive chain, one branch per entry
    if let Some(hr) = reading.heart_rate {
        if hr > 120 {
            push(
                "Heart Rate High",
                "Heart Rate",
                format!("High heart rate: {} BPM", hr),
                Severity::High,
            );
        } else if hr < 50 {
            push(
                "Heart Rate VeryLow",
                "Heart Rate",
                format!("Very low heart rate: {} BPM", hr),
                Severity::High,
            );
        } else if hr < 60 {
            push(
                "Heart Rate Low",
                "Heart Rate",
                format!("Low heart rate: {} BPM", hr),
                Severity::Moderate,
            );
        }
    }

    if let Some(steps) = reading.steps {
        if steps < 1000 {
            push(
                "Activity VeryLow",
                "Activity",
                format!("Very low activity: {} steps", steps),
                Severity::High,
            );
        } else if steps < 3000 {
            push(
                "Activity Low",
                "Activity",
                format!("Low activity: {} steps", steps),
                Severity::Moderate,
            );
        }
    }

    // A zero/absent sleep figure means "not reported", not "no sleep"
    if let Some(sleep) = reading.sleep_hours {
        if sleep > 0.0 && sleep < 4.0 {
            push(
                "Sleep Severe",
                "Sleep",
                format!("Severe sleep deprivation: {:.1} hours", sleep),
                Severity::High,
            );
        } else if sleep > 0.0 && sleep < 6.0 {
            push(
                "Sleep Insufficient",
                "Sleep",
                format!("Insufficient sleep: {:.1} hours", sleep),
                Severity::Moderate,
            );
        } else if sleep > 10.0 {
            push(
                "Sleep Excessive",
                "Sleep",
                format!("Excessive sleep: {:.1} hours", sleep),
                Severity::Moderate,
            );
        }
    }

    alerts
}

/// Derive the alert list from history entries given in ascending key order;
/// the result is newest first.
pub fn derive_alerts(entries: &[(String, Reading)]) -> Vec<AlertRecord> {
    let mut alerts: Vec<AlertRecord> = entries
        .iter()
        .flat_map(|(key, reading)| evaluate_entry(keys::history_entry_id(key), reading))
        .collect();
    alerts.reverse();
    alerts
}

pub fn unread_count(alerts: &[AlertRecord], read_ids: &HashSet<String>) -> usize {
    alerts.iter().filter(|a| !read_ids.contains(&a.id)).count()
}

/// Coarse three-level classification of the latest reading, used for the
/// headline badge. Absent metrics never fire.
pub fn risk_level(reading: &Reading) -> RiskLevel {
    let hr = reading.heart_rate;
    let steps = reading.steps;
    let sleep = reading.sleep_hours;

    let high = hr.map_or(false, |hr| hr > 120 || hr < 50)
        || steps.map_or(false, |s| s < 1000)
        || sleep.map_or(false, |s| s > 0.0 && s < 4.0);
    if high {
        return RiskLevel::High;
    }

    let moderate = hr.map_or(false, |hr| hr < 60)
        || steps.map_or(false, |s| s < 3000)
        || sleep.map_or(false, |s| (s > 0.0 && s < 6.0) || s > 10.0);
    if moderate {
        return RiskLevel::Moderate;
    }

    RiskLevel::Low
}

/// Store-coupled side of the rule engine: history loading and read flags.
pub struct AlertService {
    store: Arc<dyn KeyedStore>,
}

impl AlertService {
    pub fn new(store: Arc<dyn KeyedStore>) -> Self {
        Self { store }
    }

    pub async fn alerts_for(&self, account_id: &str) -> Result<Vec<AlertRecord>, StoreError> {
        let raw = self.store.list(&keys::history_prefix(account_id)).await?;
        let mut entries: Vec<(String, Reading)> = Vec::with_capacity(raw.len());
        for (key, value) in raw {
            match serde_json::from_value::<Reading>(value) {
                Ok(reading) => entries.push((key, reading)),
                Err(e) => tracing::warn!("Skipping undecodable history entry {}: {}", key, e),
            }
        }
        // Keys sort lexicographically; order by the actual sync timestamp
        entries.sort_by_key(|(_, r)| r.timestamp);
        Ok(derive_alerts(&entries))
    }

    pub async fn read_ids(&self, account_id: &str) -> Result<HashSet<String>, StoreError> {
        let prefix = keys::notifications_read_prefix(account_id);
        let entries = self.store.list(&prefix).await?;
        Ok(entries
            .into_iter()
            .filter(|(_, v)| *v == Value::Bool(true))
            .map(|(k, _)| k.trim_start_matches(&prefix).to_string())
            .collect())
    }

    pub async fn unread_count_for(&self, account_id: &str) -> Result<usize, StoreError> {
        let alerts = self.alerts_for(account_id).await?;
        let read = self.read_ids(account_id).await?;
        Ok(unread_count(&alerts, &read))
    }

    pub async fn mark_read(&self, account_id: &str, alert_id: &str) -> Result<(), StoreError> {
        self.store
            .put(&keys::notification_read(account_id, alert_id), json!(true))
            .await
    }

    pub async fn mark_all_read(&self, account_id: &str) -> Result<usize, StoreError> {
        let alerts = self.alerts_for(account_id).await?;
        let read = self.read_ids(account_id).await?;
        let mut marked = 0;
        for alert in &alerts {
            if !read.contains(&alert.id) {
                self.mark_read(account_id, &alert.id).await?;
                marked += 1;
            }
        }
        Ok(marked)
    }
}
