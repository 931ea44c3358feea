//! Scripted device-data provider for tests.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use healthsync_backend::provider::{
    DeviceDataProvider, ExerciseSession, HeartRateSample, IntervalRecord, MetricPermission,
    ProviderError, SleepSession, TimeRange,
};

/// Provider double that serves whatever the test scripted, ignoring the
/// query window. Metrics listed in `failing` return an error instead.
pub struct MockProvider {
    pub available: bool,
    pub granted: HashSet<MetricPermission>,
    pub heart_rate: Vec<HeartRateSample>,
    pub steps: Vec<IntervalRecord>,
    pub calories: Vec<IntervalRecord>,
    pub distance: Vec<IntervalRecord>,
    pub sleep: Vec<SleepSession>,
    pub exercise: Vec<ExerciseSession>,
    pub failing: HashSet<MetricPermission>,
}

impl MockProvider {
    /// Available, all permissions granted, no data.
    pub fn granted_all() -> Self {
        Self {
            available: true,
            granted: MetricPermission::all().into_iter().collect(),
            heart_rate: Vec::new(),
            steps: Vec::new(),
            calories: Vec::new(),
            distance: Vec::new(),
            sleep: Vec::new(),
            exercise: Vec::new(),
            failing: HashSet::new(),
        }
    }

    fn check(&self, metric: MetricPermission) -> Result<(), ProviderError> {
        if self.failing.contains(&metric) {
            Err(ProviderError::Request("scripted failure".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl DeviceDataProvider for MockProvider {
    async fn is_available(&self) -> bool {
        self.available
    }

    async fn granted_permissions(&self) -> Result<HashSet<MetricPermission>, ProviderError> {
        Ok(self.granted.clone())
    }

    async fn heart_rate_samples(
        &self,
        _range: TimeRange,
    ) -> Result<Vec<HeartRateSample>, ProviderError> {
        self.check(MetricPermission::HeartRate)?;
        Ok(self.heart_rate.clone())
    }

    async fn step_records(&self, _range: TimeRange) -> Result<Vec<IntervalRecord>, ProviderError> {
        self.check(MetricPermission::Steps)?;
        Ok(self.steps.clone())
    }

    async fn calorie_records(
        &self,
        _range: TimeRange,
    ) -> Result<Vec<IntervalRecord>, ProviderError> {
        self.check(MetricPermission::Calories)?;
        Ok(self.calories.clone())
    }

    async fn distance_records(
        &self,
        _range: TimeRange,
    ) -> Result<Vec<IntervalRecord>, ProviderError> {
        self.check(MetricPermission::Distance)?;
        Ok(self.distance.clone())
    }

    async fn sleep_sessions(&self, _range: TimeRange) -> Result<Vec<SleepSession>, ProviderError> {
        self.check(MetricPermission::Sleep)?;
        Ok(self.sleep.clone())
    }

    async fn exercise_sessions(
        &self,
        _range: TimeRange,
    ) -> Result<Vec<ExerciseSession>, ProviderError> {
        self.check(MetricPermission::Exercise)?;
        Ok(self.exercise.clone())
    }
}

pub fn hr_sample(bpm: i64, time: DateTime<Utc>, source: &str) -> HeartRateSample {
    HeartRateSample {
        bpm,
        time,
        source: source.to_string(),
    }
}

pub fn interval(
    value: f64,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    source: &str,
) -> IntervalRecord {
    IntervalRecord {
        value,
        start,
        end,
        source: source.to_string(),
    }
}

pub fn sleep_session(start: DateTime<Utc>, end: DateTime<Utc>, source: &str) -> SleepSession {
    SleepSession {
        start,
        end,
        source: source.to_string(),
    }
}

pub fn exercise(
    exercise_type: i32,
    title: Option<&str>,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    source: &str,
) -> ExerciseSession {
    ExerciseSession {
        exercise_type,
        title: title.map(str::to_string),
        start,
        end,
        source: source.to_string(),
    }
}
