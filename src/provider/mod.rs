//! Device-data provider boundary.
//!
//! The provider exposes permission-gated, time-windowed queries per metric
//! category. Production wires in [`gateway::DeviceGatewayClient`]; tests use
//! a scripted double.

pub mod exercise_types;
pub mod gateway;

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use gateway::DeviceGatewayClient;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider request failed: {0}")]
    Request(String),
    #[error("provider returned an invalid payload: {0}")]
    InvalidPayload(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        ProviderError::Request(e.to_string())
    }
}

/// The six metric categories a sync needs read access to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricPermission {
    HeartRate,
    Steps,
    Calories,
    Distance,
    Sleep,
    Exercise,
}

impl MetricPermission {
    pub fn all() -> [MetricPermission; 6] {
        [
            MetricPermission::HeartRate,
            MetricPermission::Steps,
            MetricPermission::Calories,
            MetricPermission::Distance,
            MetricPermission::Sleep,
            MetricPermission::Exercise,
        ]
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HeartRateSample {
    pub bpm: i64,
    pub time: DateTime<Utc>,
    pub source: String,
}

/// A summed interval record: step counts, kilocalories, or meters depending
/// on the metric queried.
#[derive(Debug, Clone, Deserialize)]
pub struct IntervalRecord {
    pub value: f64,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub source: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SleepSession {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub source: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExerciseSession {
    /// Numeric category code as reported by the device API.
    pub exercise_type: i32,
    pub title: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub source: String,
}

#[async_trait]
pub trait DeviceDataProvider: Send + Sync {
    /// Reachability probe; a sync attempt is skipped (and retried later)
    /// while this is false.
    async fn is_available(&self) -> bool;

    async fn granted_permissions(&self) -> Result<HashSet<MetricPermission>, ProviderError>;

    async fn heart_rate_samples(&self, range: TimeRange)
        -> Result<Vec<HeartRateSample>, ProviderError>;

    async fn step_records(&self, range: TimeRange) -> Result<Vec<IntervalRecord>, ProviderError>;

    async fn calorie_records(&self, range: TimeRange)
        -> Result<Vec<IntervalRecord>, ProviderError>;

    /// Distances in meters.
    async fn distance_records(&self, range: TimeRange)
        -> Result<Vec<IntervalRecord>, ProviderError>;

    async fn sleep_sessions(&self, range: TimeRange) -> Result<Vec<SleepSession>, ProviderError>;

    async fn exercise_sessions(&self, range: TimeRange)
        -> Result<Vec<ExerciseSession>, ProviderError>;
}
