use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// One translated exercise session as it is persisted in the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSession {
    pub exercise_type: String,
    pub duration_minutes: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
}

/// The workout field of a stored reading arrives in three historical shapes:
/// a bare total-minutes number (old simulator payloads), a single session
/// object, or a list of sessions (real watch data). The boundary keeps the
/// shape as a tagged variant and everything downstream goes through
/// [`WorkoutPayload::sessions`] or [`WorkoutPayload::total_minutes`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WorkoutPayload {
    Minutes(f64),
    Single(WorkoutSession),
    Many(Vec<WorkoutSession>),
}

impl WorkoutPayload {
    /// Canonical view: a (possibly empty) list of sessions.
    pub fn sessions(&self) -> Vec<WorkoutSession> {
        match self {
            WorkoutPayload::Minutes(minutes) => vec![WorkoutSession {
                exercise_type: "Workout".to_string(),
                duration_minutes: minutes.round() as i64,
                title: None,
                start_time: None,
                end_time: None,
            }],
            WorkoutPayload::Single(session) => vec![session.clone()],
            WorkoutPayload::Many(sessions) => sessions.clone(),
        }
    }

    /// Single total-minutes figure used by the history table and the
    /// prediction payload.
    pub fn total_minutes(&self) -> f64 {
        match self {
            WorkoutPayload::Minutes(minutes) => *minutes,
            WorkoutPayload::Single(session) => session.duration_minutes as f64,
            WorkoutPayload::Many(sessions) => {
                sessions.iter().map(|s| s.duration_minutes as f64).sum()
            }
        }
    }
}

/// One snapshot of the six tracked health metrics.
///
/// Any metric the device did not report is absent, not null: serialization
/// skips `None` fields so the persisted record only carries what was
/// actually measured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reading {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heart_rate: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calories: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "distance")]
    pub distance_km: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sleep_hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "workout")]
    pub workouts: Option<WorkoutPayload>,
    /// Sync time in epoch milliseconds. Doubles as the history key.
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readable_time: Option<String>,
    pub source: String,
}

impl Reading {
    pub fn empty(timestamp: i64, source: &str) -> Self {
        Self {
            heart_rate: None,
            steps: None,
            calories: None,
            distance_km: None,
            sleep_hours: None,
            workouts: None,
            timestamp,
            readable_time: None,
            source: source.to_string(),
        }
    }

    pub fn recorded_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.timestamp).single()
    }

    /// Calendar date used as the daily-slot key (YYYY-MM-DD, UTC).
    pub fn daily_key(&self) -> String {
        match self.recorded_at() {
            Some(at) => at.format("%Y-%m-%d").to_string(),
            None => "1970-01-01".to_string(),
        }
    }

    pub fn workout_minutes(&self) -> f64 {
        self.workouts
            .as_ref()
            .map(|w| w.total_minutes())
            .unwrap_or(0.0)
    }
}

#[derive(Debug, Serialize)]
pub struct SyncResponse {
    pub success: bool,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reading: Option<Reading>,
}
