//! Health reading collector: one windowed provider query per metric,
//! aggregated into a single [`Reading`].
//!
//! A failed or empty metric query leaves that metric absent; collection
//! itself never fails. The excluded source is a fixed denylist entry for
//! the aggregator app that mirrors data from the real device apps, so
//! counting it would double every total.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::config::settings::SyncSettings;
use crate::models::health_data::{Reading, WorkoutPayload, WorkoutSession};
use crate::provider::exercise_types::exercise_type_name;
use crate::provider::{DeviceDataProvider, IntervalRecord, TimeRange};

pub struct HealthCollector {
    provider: Arc<dyn DeviceDataProvider>,
    excluded_source: String,
    device_source: String,
}

impl HealthCollector {
    pub fn new(provider: Arc<dyn DeviceDataProvider>, settings: &SyncSettings) -> Self {
        Self {
            provider,
            excluded_source: settings.excluded_source.clone(),
            device_source: settings.device_source.clone(),
        }
    }

    /// Collect all six metrics for `now`. Individual metric failures are
    /// contained here and logged, never surfaced to the caller.
    pub async fn collect(&self, now: DateTime<Utc>) -> Reading {
        let mut reading = Reading::empty(now.timestamp_millis(), &self.device_source);
        reading.readable_time = Some(now.format("%d/%m/%Y %H:%M:%S").to_string());

        reading.heart_rate = self.heart_rate(now).await;
        reading.steps = self.steps(now).await;
        reading.calories = self.calories(now).await;
        reading.distance_km = self.distance_km(now).await;
        reading.sleep_hours = self.sleep_hours(now).await;
        reading.workouts = self.workouts(now).await;

        tracing::info!(
            "📊 Collected reading: hr={:?} steps={:?} calories={:?} distance={:?} sleep={:?}",
            reading.heart_rate,
            reading.steps,
            reading.calories,
            reading.distance_km,
            reading.sleep_hours,
        );

        reading
    }

    /// Most recent sample (by sample time, not an average) within the last
    /// six hours. If filtering out the excluded source leaves nothing, the
    /// unfiltered set is used instead.
    async fn heart_rate(&self, now: DateTime<Utc>) -> Option<i64> {
        let range = TimeRange::new(now - Duration::hours(6), now);
        let samples = match self.provider.heart_rate_samples(range).await {
            Ok(samples) => samples,
            Err(e) => {
                tracing::warn!("Heart rate query failed: {}", e);
                return None;
            }
        };
        if samples.is_empty() {
            return None;
        }

        let filtered: Vec<_> = samples
            .iter()
            .filter(|s| s.source != self.excluded_source)
            .collect();
        let candidates: Vec<_> = if filtered.is_empty() {
            samples.iter().collect()
        } else {
            filtered
        };

        candidates.into_iter().max_by_key(|s| s.time).map(|s| s.bpm)
    }

    async fn steps(&self, now: DateTime<Utc>) -> Option<i64> {
        let records = match self.provider.step_records(self.today_range(now)).await {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!("Steps query failed: {}", e);
                return None;
            }
        };
        self.sum_excluding_duplicates(&records)
            .map(|total| total.round() as i64)
    }

    async fn calories(&self, now: DateTime<Utc>) -> Option<f64> {
        let records = match self.provider.calorie_records(self.today_range(now)).await {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!("Calories query failed: {}", e);
                return None;
            }
        };
        self.sum_excluding_duplicates(&records)
    }

    async fn distance_km(&self, now: DateTime<Utc>) -> Option<f64> {
        let records = match self.provider.distance_records(self.today_range(now)).await {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!("Distance query failed: {}", e);
                return None;
            }
        };
        // Records report meters
        self.sum_excluding_duplicates(&records)
            .map(|meters| meters / 1000.0)
    }

    /// Trailing 24 hours across ALL sources; the provider deduplicates
    /// sleep sessions itself.
    async fn sleep_hours(&self, now: DateTime<Utc>) -> Option<f64> {
        let range = TimeRange::new(now - Duration::days(1), now);
        let sessions = match self.provider.sleep_sessions(range).await {
            Ok(sessions) => sessions,
            Err(e) => {
                tracing::warn!("Sleep query failed: {}", e);
                return None;
            }
        };
        if sessions.is_empty() {
            return None;
        }
        let total_minutes: i64 = sessions
            .iter()
            .map(|s| (s.end - s.start).num_minutes())
            .sum();
        Some(total_minutes as f64 / 60.0)
    }

    async fn workouts(&self, now: DateTime<Utc>) -> Option<WorkoutPayload> {
        let sessions = match self.provider.exercise_sessions(self.today_range(now)).await {
            Ok(sessions) => sessions,
            Err(e) => {
                tracing::warn!("Workout query failed: {}", e);
                return None;
            }
        };
        let translated: Vec<WorkoutSession> = sessions
            .iter()
            .filter(|s| s.source != self.excluded_source)
            .map(|s| {
                let label = exercise_type_name(s.exercise_type);
                WorkoutSession {
                    duration_minutes: (s.end - s.start).num_minutes(),
                    title: Some(s.title.clone().unwrap_or_else(|| label.clone())),
                    exercise_type: label,
                    start_time: Some(s.start.to_rfc3339()),
                    end_time: Some(s.end.to_rfc3339()),
                }
            })
            .collect();
        if translated.is_empty() {
            None
        } else {
            Some(WorkoutPayload::Many(translated))
        }
    }

    fn today_range(&self, now: DateTime<Utc>) -> TimeRange {
        let start_of_today = now
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .expect("midnight is always a valid time")
            .and_utc();
        TimeRange::new(start_of_today, now)
    }

    /// Sum of record values with the excluded duplicate source filtered
    /// out. An empty result (before or after filtering) is absent, not
    /// zero; the same policy for all four same-day metrics.
    fn sum_excluding_duplicates(&self, records: &[IntervalRecord]) -> Option<f64> {
        let filtered: Vec<_> = records
            .iter()
            .filter(|r| r.source != self.excluded_source)
            .collect();
        if filtered.is_empty() {
            return None;
        }
        Some(filtered.iter().map(|r| r.value).sum())
    }
}
